use crate::bytecode::label::{Label, LabelId};
use crate::bytecode::object_file::ObjectFile;
use crate::bytecode::op::{CompOp, Op};
use crate::bytecode::operand::{Operand, OperandKind};
use crate::frontend::diagnostic::Message;
use crate::symtab::Tab;
use crate::symtab::structure::CHAR_TYPE;

const INITIAL_CAPACITY: usize = 100;

/// Growable code buffer plus the instruction selection built on top of it.
pub struct Code {
    buf: Vec<u8>,
    /// Next free byte.
    pub pc: usize,
    /// Entry point, set once `main` is declared.
    pub main_pc: Option<usize>,
    /// Number of global data words.
    pub data_size: usize,
    pub(crate) labels: Vec<Label>,
    /// Set when a jump or call distance did not fit in two bytes.
    far_jump: bool,
}

impl Default for Code {
    fn default() -> Self {
        Self::new()
    }
}

impl Code {
    pub fn new() -> Self {
        Code {
            buf: vec![0; INITIAL_CAPACITY],
            pc: 0,
            main_pc: None,
            data_size: 0,
            labels: Vec::new(),
            far_jump: false,
        }
    }

    // =========================================================================
    // Raw emission
    // =========================================================================

    pub fn put(&mut self, byte: i32) {
        if self.pc == self.buf.len() {
            self.buf.resize(self.buf.len() * 2, 0);
        }
        self.buf[self.pc] = byte as u8;
        self.pc += 1;
    }

    pub fn put_op(&mut self, op: Op) {
        self.put(op.byte() as i32);
    }

    pub fn put2(&mut self, x: i32) {
        self.put(x >> 8);
        self.put(x);
    }

    /// Notes distances that do not fit the two-byte jump operand.
    pub(crate) fn check_distance(&mut self, dist: i32) {
        if i16::try_from(dist).is_err() {
            self.far_jump = true;
        }
    }

    pub(crate) fn put_distance(&mut self, dist: i32) {
        self.check_distance(dist);
        self.put2(dist);
    }

    /// Whether a distance was truncated since the last call.
    pub fn take_far_jump(&mut self) -> bool {
        std::mem::take(&mut self.far_jump)
    }

    pub fn put4(&mut self, x: i32) {
        self.put2(x >> 16);
        self.put2(x);
    }

    /// Overwrites two bytes at `pos` without moving `pc`.
    pub fn put2_at(&mut self, pos: usize, x: i32) {
        let pc = self.pc;
        self.pc = pos;
        self.put2(x);
        self.pc = pc;
    }

    /// The bytes emitted so far.
    pub fn bytes(&self) -> &[u8] {
        &self.buf[..self.pc]
    }

    pub fn into_object_file(self) -> ObjectFile {
        ObjectFile {
            data_size: self.data_size as i32,
            main_pc: self.main_pc.map_or(-1, |pc| pc as i32),
            code: self.buf[..self.pc].to_vec(),
        }
    }

    // =========================================================================
    // Loads and stores
    // =========================================================================

    pub fn load_const(&mut self, n: i32) {
        match n {
            -1 => self.put_op(Op::ConstM1),
            0 => self.put_op(Op::Const0),
            1 => self.put_op(Op::Const1),
            2 => self.put_op(Op::Const2),
            3 => self.put_op(Op::Const3),
            4 => self.put_op(Op::Const4),
            5 => self.put_op(Op::Const5),
            _ => {
                self.put_op(Op::Const);
                self.put4(n);
            }
        }
    }

    /// Pushes the value of `x` unless it is already on the stack.
    /// `x` is a stack operand afterwards, even when it could not be loaded.
    pub fn load(&mut self, x: &mut Operand) -> Result<(), Message> {
        let result = match x.kind {
            OperandKind::Con(val) => {
                self.load_const(val);
                Ok(())
            }
            OperandKind::Local(adr) => {
                match adr {
                    0 => self.put_op(Op::Load0),
                    1 => self.put_op(Op::Load1),
                    2 => self.put_op(Op::Load2),
                    3 => self.put_op(Op::Load3),
                    _ => {
                        self.put_op(Op::Load);
                        self.put(adr);
                    }
                }
                Ok(())
            }
            OperandKind::Static(adr) => {
                self.put_op(Op::GetStatic);
                self.put2(adr);
                Ok(())
            }
            OperandKind::Stack => Ok(()),
            OperandKind::Fld(adr) => {
                self.put_op(Op::GetField);
                self.put2(adr);
                Ok(())
            }
            OperandKind::Elem => {
                self.put_op(Self::elem_load(x));
                Ok(())
            }
            OperandKind::Meth(_) | OperandKind::None => Err(Message::CannotLoadOperand),
        };
        x.kind = OperandKind::Stack;
        result
    }

    fn elem_load(x: &Operand) -> Op {
        if x.ty == CHAR_TYPE { Op::BALoad } else { Op::ALoad }
    }

    fn elem_store(x: &Operand) -> Op {
        if x.ty == CHAR_TYPE { Op::BAStore } else { Op::AStore }
    }

    /// Emits the store half of an assignment; the value is on the stack.
    fn store(&mut self, x: &Operand) -> Result<(), Message> {
        match x.kind {
            OperandKind::Local(adr) => match adr {
                0 => self.put_op(Op::Store0),
                1 => self.put_op(Op::Store1),
                2 => self.put_op(Op::Store2),
                3 => self.put_op(Op::Store3),
                _ => {
                    self.put_op(Op::Store);
                    self.put(adr);
                }
            },
            OperandKind::Static(adr) => {
                self.put_op(Op::PutStatic);
                self.put2(adr);
            }
            OperandKind::Fld(adr) => {
                self.put_op(Op::PutField);
                self.put2(adr);
            }
            OperandKind::Elem => self.put_op(Self::elem_store(x)),
            kind => return Err(Message::CannotStoreToReadonly(kind.name().to_string())),
        }
        Ok(())
    }

    /// `x = y`.
    pub fn assign(&mut self, x: &Operand, y: &mut Operand) -> Result<(), Message> {
        self.load(y)?;
        self.store(x)
    }

    /// `x += n` without re-evaluating the designator's base.
    pub fn inc(&mut self, x: &Operand, n: i32) -> Result<(), Message> {
        match x.kind {
            OperandKind::Local(adr) => {
                self.put_op(Op::Inc);
                self.put(adr);
                self.put(n);
            }
            OperandKind::Static(adr) => {
                self.put_op(Op::GetStatic);
                self.put2(adr);
                self.load_const(n);
                self.put_op(Op::Add);
                self.put_op(Op::PutStatic);
                self.put2(adr);
            }
            OperandKind::Fld(adr) => {
                self.put_op(Op::Dup);
                self.put_op(Op::GetField);
                self.put2(adr);
                self.load_const(n);
                self.put_op(Op::Add);
                self.put_op(Op::PutField);
                self.put2(adr);
            }
            OperandKind::Elem => {
                self.put_op(Op::Dup2);
                self.put_op(Self::elem_load(x));
                self.load_const(n);
                self.put_op(Op::Add);
                self.put_op(Self::elem_store(x));
            }
            kind => return Err(Message::CannotStoreToReadonly(kind.name().to_string())),
        }
        Ok(())
    }

    /// Loads the current value of a compound-assignment target while keeping
    /// its base address on the stack for the later store. `x` keeps its kind.
    pub fn prepare_lhs(&mut self, x: &Operand) -> Result<(), Message> {
        match x.kind {
            OperandKind::Elem => self.put_op(Op::Dup2),
            OperandKind::Fld(_) => self.put_op(Op::Dup),
            _ => {}
        }
        let mut value = *x;
        self.load(&mut value)
    }

    // =========================================================================
    // Calls and jumps
    // =========================================================================

    /// `ord` and `chr` are no-ops, `len` is `arraylength`, everything else a
    /// relative `call`.
    pub fn method_call(&mut self, tab: &Tab, x: &Operand) {
        let OperandKind::Meth(meth) = x.kind else {
            return;
        };
        if meth == tab.ord_obj || meth == tab.chr_obj {
            return;
        }
        if meth == tab.len_obj {
            self.put_op(Op::ArrayLength);
            return;
        }
        self.put_op(Op::Call);
        let opcode_at = self.pc as i32 - 1;
        self.put_distance(tab.obj(meth).adr - opcode_at);
    }

    pub fn jump(&mut self, label: LabelId) {
        self.put_op(Op::Jmp);
        self.put_label(label);
    }

    /// Jumps to `label` if `op` holds.
    pub fn t_jump(&mut self, op: CompOp, label: LabelId) {
        self.put_op(op.jump());
        self.put_label(label);
    }

    /// Jumps to `label` if `op` does not hold.
    pub fn f_jump(&mut self, op: CompOp, label: LabelId) {
        self.put_op(op.invert().jump());
        self.put_label(label);
    }
}
