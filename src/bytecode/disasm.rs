use crate::bytecode::object_file::ObjectFile;
use crate::bytecode::op::{Op, Operands};
use crate::bytecode::symbols::DebugSymbols;

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub adr: usize,
    pub op: Option<Op>,
    pub text: String,
    /// Absolute target of a jump or call.
    pub target: Option<i32>,
}

fn byte(code: &[u8], at: usize) -> Option<i32> {
    code.get(at).map(|&b| b as i8 as i32)
}

fn short(code: &[u8], at: usize) -> Option<i32> {
    Some(i16::from_be_bytes([*code.get(at)?, *code.get(at + 1)?]) as i32)
}

fn word(code: &[u8], at: usize) -> Option<i32> {
    let b = code.get(at..at + 4)?;
    Some(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

/// Decodes the instruction at `adr`; returns it and the address of the next one.
pub fn decode_at(code: &[u8], adr: usize) -> (Decoded, usize) {
    let Some(op) = code.get(adr).and_then(|&b| Op::from_byte(b)) else {
        let decoded = Decoded {
            adr,
            op: None,
            text: "--error, unknown opcode--".to_string(),
            target: None,
        };
        return (decoded, adr + 1);
    };

    let at = adr + 1;
    let name = op.mnemonic();
    let mut target = None;
    let text = match op.operands() {
        Operands::None => Some(name.to_string()),
        Operands::Byte => byte(code, at).map(|b| format!("{} {}", name, b)),
        Operands::Short => short(code, at).map(|s| format!("{} {}", name, s)),
        Operands::Word => word(code, at).map(|w| format!("{} {}", name, w)),
        Operands::BytePair => byte(code, at)
            .zip(byte(code, at + 1))
            .map(|(a, b)| format!("{} {}, {}", name, a, b)),
        Operands::Jump => short(code, at).map(|dist| {
            let pos = adr as i32 + dist;
            target = Some(pos);
            format!("{} {} (={})", name, dist, pos)
        }),
    };

    let decoded = Decoded {
        adr,
        op: Some(op),
        text: text.unwrap_or_else(|| format!("{} --error, truncated operand--", name)),
        target,
    };
    (decoded, adr + op.size())
}

/// Decodes a whole code area.
pub fn decode_all(code: &[u8]) -> Vec<Decoded> {
    let mut out = Vec::new();
    let mut adr = 0;
    while adr < code.len() {
        let (decoded, next) = decode_at(code, adr);
        out.push(decoded);
        adr = next;
    }
    out
}

/// `addr: mnemonic operands`, one instruction per line.
pub fn decode(code: &[u8]) -> String {
    let mut out = String::new();
    for d in decode_all(code) {
        out.push_str(&format!("{}: {}\n", d.adr, d.text));
    }
    out
}

/// Listing with header, method labels and jump-target markers.
pub fn listing(obj: &ObjectFile, symbols: Option<&DebugSymbols>) -> String {
    let instructions = decode_all(&obj.code);
    let mut targets: Vec<i32> = instructions.iter().filter_map(|d| d.target).collect();
    targets.sort_unstable();
    targets.dedup();

    let mut out = String::new();
    if let Some(syms) = symbols {
        out.push_str(&format!("program {}\n", syms.program));
    }
    out.push_str(&format!("codesize = {}\n", obj.code.len()));
    out.push_str(&format!("datasize = {}\n", obj.data_size));
    out.push_str(&format!("startPC  = {}\n", obj.main_pc));

    for d in &instructions {
        let adr = d.adr as i32;
        if let Some(name) = symbols.and_then(|s| s.method_at(adr)) {
            out.push_str(&format!("\n{}:\n", name));
        }
        let marker = if targets.binary_search(&adr).is_ok() { "►" } else { " " };
        out.push_str(&format!("{:>5} {} {}", adr, marker, d.text));

        if let (Some(Op::Call), Some(target), Some(syms)) = (d.op, d.target, symbols)
            && let Some(callee) = syms.method_at(target)
        {
            out.push_str(&format!("    ; {}", callee));
        }
        out.push('\n');
    }
    out
}

pub fn print_listing(obj: &ObjectFile, symbols: Option<&DebugSymbols>) {
    print!("{}", listing(obj, symbols));
}
