// =============================================================================
// OP - Bytecode instructions
// =============================================================================

/// One-byte opcodes. The numeric values are part of the object file format.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    // locals
    Load = 1,
    Load0 = 2,
    Load1 = 3,
    Load2 = 4,
    Load3 = 5,
    Store = 6,
    Store0 = 7,
    Store1 = 8,
    Store2 = 9,
    Store3 = 10,

    // globals and fields
    GetStatic = 11,
    PutStatic = 12,
    GetField = 13,
    PutField = 14,

    // constants
    Const0 = 15,
    Const1 = 16,
    Const2 = 17,
    Const3 = 18,
    Const4 = 19,
    Const5 = 20,
    ConstM1 = 21,
    Const = 22,

    // arithmetic
    Add = 23,
    Sub = 24,
    Mul = 25,
    Div = 26,
    Rem = 27,
    Neg = 28,
    Shl = 29,
    Shr = 30,
    Inc = 31,

    // heap
    New = 32,
    NewArray = 33,
    ALoad = 34,
    AStore = 35,
    BALoad = 36,
    BAStore = 37,
    ArrayLength = 38,

    // stack
    Pop = 39,
    Dup = 40,
    Dup2 = 41,

    // control flow
    Jmp = 42,
    Jeq = 43,
    Jne = 44,
    Jlt = 45,
    Jle = 46,
    Jgt = 47,
    Jge = 48,
    Call = 49,
    Return = 50,
    Enter = 51,
    Exit = 52,

    // I/O
    Read = 53,
    Print = 54,
    BRead = 55,
    BPrint = 56,

    Trap = 57,
    Nop = 58,
}

/// Shape of the operand bytes that follow an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    None,
    /// One signed byte.
    Byte,
    /// Two bytes, big-endian.
    Short,
    /// Four bytes, big-endian.
    Word,
    /// Two independent one-byte fields.
    BytePair,
    /// Signed two-byte distance relative to the opcode address.
    Jump,
}

impl Operands {
    pub fn len(self) -> usize {
        match self {
            Operands::None => 0,
            Operands::Byte => 1,
            Operands::Short | Operands::BytePair | Operands::Jump => 2,
            Operands::Word => 4,
        }
    }
}

impl Op {
    const ALL: [Op; 58] = [
        Op::Load, Op::Load0, Op::Load1, Op::Load2, Op::Load3,
        Op::Store, Op::Store0, Op::Store1, Op::Store2, Op::Store3,
        Op::GetStatic, Op::PutStatic, Op::GetField, Op::PutField,
        Op::Const0, Op::Const1, Op::Const2, Op::Const3, Op::Const4, Op::Const5, Op::ConstM1, Op::Const,
        Op::Add, Op::Sub, Op::Mul, Op::Div, Op::Rem, Op::Neg, Op::Shl, Op::Shr, Op::Inc,
        Op::New, Op::NewArray, Op::ALoad, Op::AStore, Op::BALoad, Op::BAStore, Op::ArrayLength,
        Op::Pop, Op::Dup, Op::Dup2,
        Op::Jmp, Op::Jeq, Op::Jne, Op::Jlt, Op::Jle, Op::Jgt, Op::Jge,
        Op::Call, Op::Return, Op::Enter, Op::Exit,
        Op::Read, Op::Print, Op::BRead, Op::BPrint,
        Op::Trap, Op::Nop,
    ];

    pub fn from_byte(byte: u8) -> Option<Op> {
        let index = (byte as usize).checked_sub(1)?;
        Self::ALL.get(index).copied()
    }

    pub fn byte(self) -> u8 {
        self as u8
    }

    pub fn operands(self) -> Operands {
        use Op::*;
        match self {
            Load | Store | NewArray | Trap => Operands::Byte,
            GetStatic | PutStatic | GetField | PutField | New => Operands::Short,
            Const => Operands::Word,
            Inc | Enter => Operands::BytePair,
            Jmp | Jeq | Jne | Jlt | Jle | Jgt | Jge | Call => Operands::Jump,
            _ => Operands::None,
        }
    }

    /// Total encoded size, opcode byte included.
    pub fn size(self) -> usize {
        1 + self.operands().len()
    }

    pub fn mnemonic(self) -> &'static str {
        use Op::*;
        match self {
            Load => "load",
            Load0 => "load_0",
            Load1 => "load_1",
            Load2 => "load_2",
            Load3 => "load_3",
            Store => "store",
            Store0 => "store_0",
            Store1 => "store_1",
            Store2 => "store_2",
            Store3 => "store_3",
            GetStatic => "getstatic",
            PutStatic => "putstatic",
            GetField => "getfield",
            PutField => "putfield",
            Const0 => "const_0",
            Const1 => "const_1",
            Const2 => "const_2",
            Const3 => "const_3",
            Const4 => "const_4",
            Const5 => "const_5",
            ConstM1 => "const_m1",
            Const => "const",
            Add => "add",
            Sub => "sub",
            Mul => "mul",
            Div => "div",
            Rem => "rem",
            Neg => "neg",
            Shl => "shl",
            Shr => "shr",
            Inc => "inc",
            New => "new",
            NewArray => "newarray",
            ALoad => "aload",
            AStore => "astore",
            BALoad => "baload",
            BAStore => "bastore",
            ArrayLength => "arraylength",
            Pop => "pop",
            Dup => "dup",
            Dup2 => "dup2",
            Jmp => "jmp",
            Jeq => "jeq",
            Jne => "jne",
            Jlt => "jlt",
            Jle => "jle",
            Jgt => "jgt",
            Jge => "jge",
            Call => "call",
            Return => "return",
            Enter => "enter",
            Exit => "exit",
            Read => "read",
            Print => "print",
            BRead => "bread",
            BPrint => "bprint",
            Trap => "trap",
            Nop => "nop",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

// =============================================================================
// COMPARISONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompOp {
    /// The comparison that holds exactly when `self` does not.
    pub fn invert(self) -> CompOp {
        match self {
            CompOp::Eq => CompOp::Ne,
            CompOp::Ne => CompOp::Eq,
            CompOp::Lt => CompOp::Ge,
            CompOp::Ge => CompOp::Lt,
            CompOp::Le => CompOp::Gt,
            CompOp::Gt => CompOp::Le,
        }
    }

    /// Conditional jump taken when the comparison holds.
    pub fn jump(self) -> Op {
        match self {
            CompOp::Eq => Op::Jeq,
            CompOp::Ne => Op::Jne,
            CompOp::Lt => Op::Jlt,
            CompOp::Le => Op::Jle,
            CompOp::Gt => Op::Jgt,
            CompOp::Ge => Op::Jge,
        }
    }
}
