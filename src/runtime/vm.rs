use crate::bytecode::object_file::ObjectFile;
use crate::bytecode::op::Op;
use crate::bytecode::symbols::DebugSymbols;
use crate::runtime::io::{Input, Output};
use crate::runtime::runtime_error::{RuntimeError, Trap};
// `Op::Trap` shadows `Trap` inside `execute`.
use crate::runtime::runtime_error::Trap as Fault;

/// Memory limits of one VM instance.
#[derive(Debug, Clone)]
pub struct VmConfig {
    pub heap_words: usize,
    pub method_stack_words: usize,
    pub expr_stack_words: usize,
    /// Abort after this many executed instructions.
    pub max_steps: Option<u64>,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            heap_words: 100_000,
            method_stack_words: 4000,
            expr_stack_words: 30,
            max_steps: None,
        }
    }
}

/// Interpreter for MicroJava object files.
///
/// Memory is four fixed-size word arrays: global data, the method stack
/// (return addresses, saved frame pointers and locals), the heap, and the
/// expression stack. Heap address 0 is never allocated and serves as `null`.
pub struct Vm {
    code: Vec<u8>,
    main_pc: i32,
    data: Vec<i32>,
    heap: Vec<i32>,
    stack: Vec<i32>,
    local: Vec<i32>,
    pc: usize,
    /// Address of the instruction being executed.
    op_pc: usize,
    fp: usize,
    sp: usize,
    esp: usize,
    /// Next free heap word.
    free: usize,
    steps: u64,
    config: VmConfig,
    symbols: Option<DebugSymbols>,
}

type Step = Result<(), Trap>;

impl Vm {
    pub fn new(obj: &ObjectFile) -> Self {
        Self::with_config(obj, VmConfig::default())
    }

    pub fn with_config(obj: &ObjectFile, config: VmConfig) -> Self {
        Vm {
            code: obj.code.clone(),
            main_pc: obj.main_pc,
            data: vec![0; obj.data_size.max(0) as usize],
            heap: vec![0; config.heap_words],
            stack: vec![0; config.expr_stack_words],
            local: vec![0; config.method_stack_words],
            pc: 0,
            op_pc: 0,
            fp: 0,
            sp: 0,
            esp: 0,
            free: 1,
            steps: 0,
            config,
            symbols: None,
        }
    }

    /// Method names for the execution trace.
    pub fn with_symbols(mut self, symbols: DebugSymbols) -> Self {
        self.symbols = Some(symbols);
        self
    }

    /// Global data segment.
    pub fn data(&self) -> &[i32] {
        &self.data
    }

    /// Current contents of the expression stack, bottom first.
    pub fn expr_stack(&self) -> &[i32] {
        &self.stack[..self.esp]
    }

    /// Runs from the entry point until `main` returns or a trap occurs.
    ///
    /// Output written before a trap stays written; `io` is flushed either way.
    pub fn run<IO: Input + Output>(&mut self, io: &mut IO) -> Result<(), RuntimeError> {
        self.fp = 0;
        self.sp = 0;
        self.esp = 0;
        self.free = 1;
        self.steps = 0;

        let result = self.start(io);
        io.flush();

        result.map_err(|trap| {
            tracing::error!(pc = self.op_pc, %trap, "trap");
            RuntimeError {
                trap,
                pc: self.op_pc,
                call_stack: self.return_addresses(),
            }
        })
    }

    fn start<IO: Input + Output>(&mut self, io: &mut IO) -> Step {
        self.pc = usize::try_from(self.main_pc).map_err(|_| Trap::PcOutOfCode)?;
        if let Some(main) = self.symbols.as_ref().and_then(|s| s.method_at(self.main_pc)) {
            tracing::debug!(entry = self.pc, method = main, "start");
        }

        loop {
            self.op_pc = self.pc;
            self.steps += 1;
            if let Some(max) = self.config.max_steps
                && self.steps > max
            {
                return Err(Trap::StepLimit(max));
            }

            let byte = self.next()? as u8;
            let op = Op::from_byte(byte).ok_or(Trap::WrongOpcode(byte))?;
            tracing::trace!(pc = self.op_pc, %op, stack = ?self.expr_stack(), "exec");

            if !self.execute(op, io)? {
                return Ok(());
            }
        }
    }

    /// Walks the saved frame pointers; each frame entered by `call` has its
    /// return address just below the saved frame pointer.
    fn return_addresses(&self) -> Vec<i32> {
        let mut out = Vec::new();
        let mut fp = self.fp;
        while fp >= 2 && fp <= self.sp {
            out.push(self.local[fp - 2]);
            let Ok(outer) = usize::try_from(self.local[fp - 1]) else {
                break;
            };
            if outer >= fp {
                break;
            }
            fp = outer;
        }
        out.reverse();
        out
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    fn next(&mut self) -> Result<i32, Trap> {
        let b = *self.code.get(self.pc).ok_or(Trap::PcOutOfCode)?;
        self.pc += 1;
        Ok(b as i8 as i32)
    }

    fn next2(&mut self) -> Result<i32, Trap> {
        let hi = self.next()?;
        let lo = self.next()?;
        Ok(((hi << 8) | (lo & 0xff)) as i16 as i32)
    }

    fn next4(&mut self) -> Result<i32, Trap> {
        let hi = self.next2()?;
        let lo = self.next2()?;
        Ok((hi << 16) | (lo & 0xffff))
    }

    fn jump_to(&mut self, dist: i32) -> Step {
        let target = self.op_pc as i64 + dist as i64;
        if target < 0 || target as usize >= self.code.len() {
            return Err(Trap::PcOutOfCode);
        }
        self.pc = target as usize;
        Ok(())
    }

    // =========================================================================
    // Stacks and memory
    // =========================================================================

    fn push(&mut self, val: i32) -> Step {
        if self.esp == self.stack.len() {
            return Err(Trap::ExprStackOverflow);
        }
        self.stack[self.esp] = val;
        self.esp += 1;
        Ok(())
    }

    fn pop(&mut self) -> Result<i32, Trap> {
        if self.esp == 0 {
            return Err(Trap::ExprStackUnderflow);
        }
        self.esp -= 1;
        Ok(self.stack[self.esp])
    }

    fn push_frame(&mut self, val: i32) -> Step {
        if self.sp == self.local.len() {
            return Err(Trap::MethodStackOverflow);
        }
        self.local[self.sp] = val;
        self.sp += 1;
        Ok(())
    }

    fn pop_frame(&mut self) -> Result<i32, Trap> {
        if self.sp == 0 {
            return Err(Trap::MethodStackUnderflow);
        }
        self.sp -= 1;
        Ok(self.local[self.sp])
    }

    fn local_slot(&self, n: i32) -> Result<usize, Trap> {
        let slot = self.fp as i64 + n as i64;
        if slot < 0 || slot as usize >= self.local.len() {
            return Err(Trap::LocalOutOfRange);
        }
        Ok(slot as usize)
    }

    fn global_slot(&self, n: i32) -> Result<usize, Trap> {
        usize::try_from(n)
            .ok()
            .filter(|&i| i < self.data.len())
            .ok_or(Trap::GlobalOutOfRange)
    }

    fn heap_slot(&self, adr: i64) -> Result<usize, Trap> {
        if adr < 0 || adr as usize >= self.heap.len() {
            return Err(Trap::HeapOutOfRange);
        }
        Ok(adr as usize)
    }

    fn non_null(adr: i32) -> Result<i32, Trap> {
        if adr == 0 { Err(Trap::NullReference) } else { Ok(adr) }
    }

    /// Reserves `size` bytes, rounded up to whole words.
    fn alloc(&mut self, size: i32) -> Result<i32, Trap> {
        let words = ((size as i64 + 3) >> 2).max(0) as usize;
        let adr = self.free;
        if adr + words > self.heap.len() {
            return Err(Trap::HeapOverflow);
        }
        self.free += words;
        Ok(adr as i32)
    }

    /// Heap slot of element `idx` of the array at `adr` after bounds checks.
    /// `per_word` is 4 for byte arrays.
    fn element(&self, adr: i32, idx: i32, per_word: i32) -> Result<usize, Trap> {
        let adr = Self::non_null(adr)?;
        let len = self.heap[self.heap_slot(adr as i64 - 1)?];
        if idx < 0 || idx >= len {
            return Err(Trap::IndexOutOfBounds);
        }
        self.heap_slot(adr as i64 + (idx / per_word) as i64)
    }

    fn get_byte(word: i32, n: i32) -> i32 {
        (word << (8 * n) >> 24) as i8 as i32
    }

    fn set_byte(word: i32, n: i32, b: i32) -> i32 {
        let shift = (3 - n) * 8;
        let mask = !(0xff << shift);
        (word & mask) | ((b & 0xff) << shift)
    }

    // =========================================================================
    // I/O helpers
    // =========================================================================

    /// Skips to the first digit; a `-` right before it negates the number.
    /// Exhausted input yields 0.
    fn read_int(io: &mut impl Input) -> i32 {
        let mut prev = ' ';
        let mut ch = io.read();
        while !ch.is_ascii_digit() {
            if ch == '\0' {
                return 0;
            }
            prev = ch;
            ch = io.read();
        }
        let mut val: i32 = 0;
        while let Some(d) = ch.to_digit(10) {
            val = val.wrapping_mul(10).wrapping_add(d as i32);
            ch = io.read();
        }
        if prev == '-' { val.wrapping_neg() } else { val }
    }

    fn write_padded(io: &mut impl Output, text: &str, pad: i32) {
        for _ in 0..pad.max(0) {
            io.write(' ');
        }
        for ch in text.chars() {
            io.write(ch);
        }
    }

    // =========================================================================
    // Execute
    // =========================================================================

    /// Executes one instruction; `false` once the outermost method returned.
    fn execute<IO: Input + Output>(&mut self, op: Op, io: &mut IO) -> Result<bool, Trap> {
        use Op::*;
        match op {
            Load => {
                let n = self.next()?;
                let slot = self.local_slot(n)?;
                self.push(self.local[slot])?;
            }
            Load0 | Load1 | Load2 | Load3 => {
                let slot = self.local_slot((op.byte() - Load0.byte()) as i32)?;
                self.push(self.local[slot])?;
            }
            Store => {
                let n = self.next()?;
                let slot = self.local_slot(n)?;
                self.local[slot] = self.pop()?;
            }
            Store0 | Store1 | Store2 | Store3 => {
                let slot = self.local_slot((op.byte() - Store0.byte()) as i32)?;
                self.local[slot] = self.pop()?;
            }

            GetStatic => {
                let n = self.next2()?;
                let slot = self.global_slot(n)?;
                self.push(self.data[slot])?;
            }
            PutStatic => {
                let n = self.next2()?;
                let slot = self.global_slot(n)?;
                self.data[slot] = self.pop()?;
            }
            GetField => {
                let off = self.next2()?;
                let adr = Self::non_null(self.pop()?)?;
                let slot = self.heap_slot(adr as i64 + off as i64)?;
                self.push(self.heap[slot])?;
            }
            PutField => {
                let off = self.next2()?;
                let val = self.pop()?;
                let adr = Self::non_null(self.pop()?)?;
                let slot = self.heap_slot(adr as i64 + off as i64)?;
                self.heap[slot] = val;
            }

            Const0 | Const1 | Const2 | Const3 | Const4 | Const5 => {
                self.push((op.byte() - Const0.byte()) as i32)?;
            }
            ConstM1 => self.push(-1)?,
            Const => {
                let val = self.next4()?;
                self.push(val)?;
            }

            Add => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.push(a.wrapping_add(b))?;
            }
            Sub => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.push(a.wrapping_sub(b))?;
            }
            Mul => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.push(a.wrapping_mul(b))?;
            }
            Div | Rem => {
                let b = self.pop()?;
                if b == 0 {
                    return Err(Fault::DivisionByZero);
                }
                let a = self.pop()?;
                self.push(if op == Div { a.wrapping_div(b) } else { a.wrapping_rem(b) })?;
            }
            Neg => {
                let a = self.pop()?;
                self.push(a.wrapping_neg())?;
            }
            Shl => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.push(a.wrapping_shl(b as u32))?;
            }
            Shr => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.push(a.wrapping_shr(b as u32))?;
            }
            Inc => {
                let n = self.next()?;
                let delta = self.next()?;
                let slot = self.local_slot(n)?;
                self.local[slot] = self.local[slot].wrapping_add(delta);
            }

            New => {
                let n_fields = self.next2()?;
                let adr = self.alloc(n_fields * 4)?;
                self.push(adr)?;
            }
            NewArray => {
                let kind = self.next()?;
                let len = self.pop()?;
                if len < 0 {
                    return Err(Fault::NegativeArraySize(len));
                }
                let bytes = if kind == 0 { len as i64 + 4 } else { len as i64 * 4 + 4 };
                let adr = self.alloc(bytes.clamp(i32::MIN as i64, i32::MAX as i64) as i32)?;
                let slot = self.heap_slot(adr as i64)?;
                self.heap[slot] = len;
                self.push(adr + 1)?;
            }
            ALoad => {
                let idx = self.pop()?;
                let adr = self.pop()?;
                let slot = self.element(adr, idx, 1)?;
                self.push(self.heap[slot])?;
            }
            AStore => {
                let val = self.pop()?;
                let idx = self.pop()?;
                let adr = self.pop()?;
                let slot = self.element(adr, idx, 1)?;
                self.heap[slot] = val;
            }
            BALoad => {
                let idx = self.pop()?;
                let adr = self.pop()?;
                let slot = self.element(adr, idx, 4)?;
                self.push(Self::get_byte(self.heap[slot], idx % 4))?;
            }
            BAStore => {
                let val = self.pop()?;
                let idx = self.pop()?;
                let adr = self.pop()?;
                let slot = self.element(adr, idx, 4)?;
                self.heap[slot] = Self::set_byte(self.heap[slot], idx % 4, val);
            }
            ArrayLength => {
                let adr = Self::non_null(self.pop()?)?;
                let slot = self.heap_slot(adr as i64 - 1)?;
                self.push(self.heap[slot])?;
            }

            Pop => {
                self.pop()?;
            }
            Dup => {
                let a = self.pop()?;
                self.push(a)?;
                self.push(a)?;
            }
            Dup2 => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.push(a)?;
                self.push(b)?;
                self.push(a)?;
                self.push(b)?;
            }

            Jmp => {
                let dist = self.next2()?;
                self.jump_to(dist)?;
            }
            Jeq | Jne | Jlt | Jle | Jgt | Jge => {
                let dist = self.next2()?;
                let b = self.pop()?;
                let a = self.pop()?;
                let taken = match op {
                    Jeq => a == b,
                    Jne => a != b,
                    Jlt => a < b,
                    Jle => a <= b,
                    Jgt => a > b,
                    _ => a >= b,
                };
                if taken {
                    self.jump_to(dist)?;
                }
            }
            Call => {
                let dist = self.next2()?;
                self.push_frame(self.pc as i32)?;
                self.jump_to(dist)?;
                if let Some(name) = self.symbols.as_ref().and_then(|s| s.method_at(self.pc as i32)) {
                    tracing::trace!(method = name, entry = self.pc, "call");
                }
            }
            Return => {
                if self.sp == 0 {
                    return Ok(false);
                }
                let ret = self.pop_frame()?;
                self.pc = usize::try_from(ret).map_err(|_| Fault::PcOutOfCode)?;
            }
            Enter => {
                let n_pars = self.next()?;
                let n_locals = self.next()?;
                self.push_frame(self.fp as i32)?;
                self.fp = self.sp;
                for _ in 0..n_locals.max(0) {
                    self.push_frame(0)?;
                }
                for i in (0..n_pars.max(0)).rev() {
                    let slot = self.local_slot(i)?;
                    self.local[slot] = self.pop()?;
                }
            }
            Exit => {
                self.sp = self.fp;
                let fp = self.pop_frame()?;
                self.fp = usize::try_from(fp).map_err(|_| Fault::LocalOutOfRange)?;
            }

            Read => {
                io.flush();
                let val = Self::read_int(io);
                self.push(val)?;
            }
            Print => {
                let width = self.pop()?;
                let val = self.pop()?;
                let text = val.to_string();
                Self::write_padded(io, &text, width - text.len() as i32);
            }
            BRead => {
                io.flush();
                let ch = io.read();
                self.push(ch as i32)?;
            }
            BPrint => {
                let width = self.pop()?;
                let val = self.pop()?;
                let ch = char::from_u32(val as u16 as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
                Self::write_padded(io, &ch.to_string(), width - 1);
            }

            Trap => {
                let code = self.next()?;
                return Err(Fault::Explicit(code));
            }
            Nop => {}
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::io::BufferIo;

    fn b(op: Op) -> u8 {
        op.byte()
    }

    fn object(code: Vec<u8>, data_size: i32) -> ObjectFile {
        ObjectFile {
            code,
            data_size,
            main_pc: 0,
        }
    }

    /// Runs `body` wrapped in `enter 0, locals` .. `exit return`.
    fn run_body(locals: u8, body: &[u8], input: &str) -> (Result<(), RuntimeError>, String, Vm) {
        let mut code = vec![b(Op::Enter), 0, locals];
        code.extend_from_slice(body);
        code.extend_from_slice(&[b(Op::Exit), b(Op::Return)]);
        let mut vm = Vm::new(&object(code, 4));
        let mut io = BufferIo::new(input);
        let result = vm.run(&mut io);
        (result, io.into_output(), vm)
    }

    fn assert_trap(body: &[u8], trap: Trap) {
        let (result, _, _) = run_body(2, body, "");
        match result {
            Ok(()) => panic!("expected trap {:?}, program finished", trap),
            Err(e) => assert_eq!(e.trap, trap),
        }
    }

    #[test]
    fn test_arithmetic() {
        let (result, _, vm) = run_body(
            0,
            &[
                b(Op::Const),
                0,
                0,
                0,
                7,
                b(Op::Const2),
                b(Op::Sub),
                b(Op::Const3),
                b(Op::Mul),
                b(Op::ConstM1),
                b(Op::Div),
                b(Op::PutStatic),
                0,
                0,
            ],
            "",
        );
        result.unwrap();
        assert_eq!(vm.data()[0], -15);
    }

    #[test]
    fn test_wrapping_division() {
        let mut body = vec![b(Op::Const)];
        body.extend_from_slice(&i32::MIN.to_be_bytes());
        body.extend_from_slice(&[b(Op::ConstM1), b(Op::Div), b(Op::PutStatic), 0, 1]);
        let (result, _, vm) = run_body(0, &body, "");
        result.unwrap();
        assert_eq!(vm.data()[1], i32::MIN);
    }

    #[test]
    fn test_division_by_zero() {
        assert_trap(&[b(Op::Const1), b(Op::Const0), b(Op::Rem)], Trap::DivisionByZero);
    }

    #[test]
    fn test_print_pads_to_width() {
        let (result, out, _) = run_body(
            0,
            &[
                b(Op::Const),
                0,
                0,
                0,
                42,
                b(Op::Const5),
                b(Op::Print),
                b(Op::Const),
                0,
                0,
                0,
                b'x',
                b(Op::Const3),
                b(Op::BPrint),
                b(Op::ConstM1),
                b(Op::Const0),
                b(Op::Print),
            ],
            "",
        );
        result.unwrap();
        assert_eq!(out, "   42  x-1");
    }

    #[test]
    fn test_read_int() {
        let body = [
            b(Op::Read),
            b(Op::PutStatic),
            0,
            0,
            b(Op::Read),
            b(Op::PutStatic),
            0,
            1,
            b(Op::BRead),
            b(Op::PutStatic),
            0,
            2,
            b(Op::Read),
            b(Op::PutStatic),
            0,
            3,
        ];
        // The character after a number is consumed with it.
        let (result, _, vm) = run_body(0, &body, "  abc-17 x42;z");
        result.unwrap();
        assert_eq!(vm.data(), &[-17, 42, 'z' as i32, 0]);
    }

    #[test]
    fn test_byte_array() {
        // a = new char[5]; a[4] = 'z'; a[1] = -2; g0 = a[4]; g1 = a[1]; g2 = len(a)
        let body = [
            b(Op::Const5),
            b(Op::NewArray),
            0,
            b(Op::Store0),
            b(Op::Load0),
            b(Op::Const4),
            b(Op::Const),
            0,
            0,
            0,
            b'z',
            b(Op::BAStore),
            b(Op::Load0),
            b(Op::Const1),
            b(Op::Const),
            0xff,
            0xff,
            0xff,
            0xfe,
            b(Op::BAStore),
            b(Op::Load0),
            b(Op::Const4),
            b(Op::BALoad),
            b(Op::PutStatic),
            0,
            0,
            b(Op::Load0),
            b(Op::Const1),
            b(Op::BALoad),
            b(Op::PutStatic),
            0,
            1,
            b(Op::Load0),
            b(Op::ArrayLength),
            b(Op::PutStatic),
            0,
            2,
        ];
        let (result, _, vm) = run_body(1, &body, "");
        result.unwrap();
        assert_eq!(&vm.data()[..3], &['z' as i32, -2, 5]);
    }

    #[test]
    fn test_index_out_of_bounds() {
        assert_trap(
            &[b(Op::Const2), b(Op::NewArray), 1, b(Op::Const2), b(Op::ALoad)],
            Trap::IndexOutOfBounds,
        );
        assert_trap(
            &[b(Op::Const2), b(Op::NewArray), 0, b(Op::ConstM1), b(Op::Const0), b(Op::BAStore)],
            Trap::IndexOutOfBounds,
        );
    }

    #[test]
    fn test_negative_array_size() {
        assert_trap(
            &[b(Op::ConstM1), b(Op::NewArray), 1],
            Trap::NegativeArraySize(-1),
        );
    }

    #[test]
    fn test_null_reference() {
        assert_trap(&[b(Op::Const0), b(Op::GetField), 0, 0], Trap::NullReference);
        assert_trap(&[b(Op::Const0), b(Op::ArrayLength)], Trap::NullReference);
    }

    #[test]
    fn test_heap_overflow() {
        let config = VmConfig {
            heap_words: 10,
            ..VmConfig::default()
        };
        let code = vec![b(Op::New), 0, 20, b(Op::Return)];
        let mut vm = Vm::with_config(&object(code, 0), config);
        let err = vm.run(&mut BufferIo::new("")).unwrap_err();
        assert_eq!(err.trap, Trap::HeapOverflow);
        assert_eq!(err.pc, 0);
    }

    #[test]
    fn test_expression_stack_limits() {
        assert_trap(&[b(Op::Pop)], Trap::ExprStackUnderflow);

        let body = vec![b(Op::Const1); 31];
        assert_trap(&body, Trap::ExprStackOverflow);
    }

    #[test]
    fn test_call_and_return() {
        // 0: enter 0 0; call 8; exit; return
        // 8: enter 1 1 (arg from stack); load_0; putstatic 0; exit; return
        let code = vec![
            b(Op::Enter),
            0,
            0,
            b(Op::Const4),
            b(Op::Call),
            0,
            5,
            b(Op::Exit),
            b(Op::Return),
            b(Op::Enter),
            1,
            1,
            b(Op::Load0),
            b(Op::PutStatic),
            0,
            0,
            b(Op::Exit),
            b(Op::Return),
        ];
        let mut vm = Vm::new(&object(code, 1));
        vm.run(&mut BufferIo::new("")).unwrap();
        assert_eq!(vm.data(), &[4]);
    }

    #[test]
    fn test_trap_reports_call_stack() {
        let code = vec![
            b(Op::Enter),
            0,
            0,
            b(Op::Call),
            0,
            5,
            b(Op::Exit),
            b(Op::Return),
            b(Op::Enter),
            0,
            0,
            b(Op::Trap),
            1,
        ];
        let mut vm = Vm::new(&object(code, 0));
        let err = vm.run(&mut BufferIo::new("")).unwrap_err();
        assert_eq!(err.trap, Trap::Explicit(1));
        assert_eq!(err.pc, 11);
        assert_eq!(err.call_stack, vec![6]);
    }

    #[test]
    fn test_backward_jump_and_step_limit() {
        let code = vec![b(Op::Nop), b(Op::Jmp), 0xff, 0xff];
        let config = VmConfig {
            max_steps: Some(100),
            ..VmConfig::default()
        };
        let mut vm = Vm::with_config(&object(code, 0), config);
        let err = vm.run(&mut BufferIo::new("")).unwrap_err();
        assert_eq!(err.trap, Trap::StepLimit(100));
    }

    #[test]
    fn test_wrong_opcode_and_range_checks() {
        assert_trap(&[0], Trap::WrongOpcode(0));
        assert_trap(&[b(Op::GetStatic), 0, 9], Trap::GlobalOutOfRange);
        assert_trap(&[b(Op::Jmp), 0x7f, 0], Trap::PcOutOfCode);
        assert_trap(&[b(Op::Load), 0x80], Trap::LocalOutOfRange);
    }

    #[test]
    fn test_running_off_the_end() {
        let mut vm = Vm::new(&object(vec![b(Op::Nop)], 0));
        let err = vm.run(&mut BufferIo::new("")).unwrap_err();
        assert_eq!(err.trap, Trap::PcOutOfCode);
    }
}
