use crate::bytecode::code::Code;

/// Handle to a jump target owned by a [`Code`] buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelId(usize);

#[derive(Debug, Clone)]
pub(crate) enum Label {
    /// Positions of two-byte placeholders awaiting the target address.
    Pending(Vec<usize>),
    Defined(usize),
}

impl Code {
    pub fn new_label(&mut self) -> LabelId {
        self.labels.push(Label::Pending(Vec::new()));
        LabelId(self.labels.len() - 1)
    }

    /// Emits the distance operand of a jump whose opcode byte was just put.
    /// Unknown targets get a placeholder that [`Code::here`] patches.
    pub fn put_label(&mut self, label: LabelId) {
        let opcode_at = self.pc as i32 - 1;
        if let Some(adr) = self.label_address(label) {
            self.put_distance(adr as i32 - opcode_at);
            return;
        }
        let pc = self.pc;
        if let Label::Pending(fixups) = &mut self.labels[label.0] {
            fixups.push(pc);
        }
        self.put2(0);
    }

    /// Binds `label` to the current pc and patches every pending jump.
    ///
    /// # Panics
    /// If the label was already defined.
    pub fn here(&mut self, label: LabelId) {
        let pc = self.pc;
        let previous = std::mem::replace(&mut self.labels[label.0], Label::Defined(pc));
        let Label::Pending(fixups) = previous else {
            panic!("label defined twice");
        };
        for pos in fixups {
            let dist = pc as i32 - (pos as i32 - 1);
            self.check_distance(dist);
            self.put2_at(pos, dist);
        }
    }

    pub fn label_address(&self, label: LabelId) -> Option<usize> {
        match &self.labels[label.0] {
            Label::Defined(adr) => Some(*adr),
            Label::Pending(_) => None,
        }
    }
}
