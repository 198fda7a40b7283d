/// Conditions that abort a VM run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Trap {
    #[error("expression stack overflow")]
    ExprStackOverflow,
    #[error("expression stack underflow")]
    ExprStackUnderflow,
    #[error("method stack overflow")]
    MethodStackOverflow,
    #[error("method stack underflow")]
    MethodStackUnderflow,
    #[error("heap overflow")]
    HeapOverflow,
    #[error("null reference used")]
    NullReference,
    #[error("division by zero")]
    DivisionByZero,
    #[error("index out of bounds")]
    IndexOutOfBounds,
    #[error("negative array size {0}")]
    NegativeArraySize(i32),
    /// Raised by the `trap` instruction, e.g. when a function ends without
    /// returning a value.
    #[error("trap({0})")]
    Explicit(i32),
    #[error("wrong opcode {0}")]
    WrongOpcode(u8),
    #[error("global data address out of range")]
    GlobalOutOfRange,
    #[error("local slot out of range")]
    LocalOutOfRange,
    #[error("heap address out of range")]
    HeapOutOfRange,
    #[error("pc out of code area")]
    PcOutOfCode,
    #[error("execution step limit exceeded ({0})")]
    StepLimit(u64),
}

/// A trap together with where it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub trap: Trap,
    /// Address of the faulting instruction.
    pub pc: usize,
    /// Return addresses, innermost last.
    pub call_stack: Vec<i32>,
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "runtime error at pc {}: {}", self.pc, self.trap)?;

        if !self.call_stack.is_empty() {
            write!(f, "\n  call stack:")?;

            for (i, ret) in self.call_stack.iter().rev().enumerate() {
                write!(f, "\n    {}: return to {}", i, ret)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.trap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trap_messages() {
        assert_eq!(Trap::Explicit(1).to_string(), "trap(1)");
        assert_eq!(Trap::WrongOpcode(0).to_string(), "wrong opcode 0");
        assert_eq!(Trap::NegativeArraySize(-3).to_string(), "negative array size -3");
        assert_eq!(Trap::StepLimit(10).to_string(), "execution step limit exceeded (10)");
    }

    #[test]
    fn test_display_with_call_stack() {
        let err = RuntimeError {
            trap: Trap::DivisionByZero,
            pc: 17,
            call_stack: vec![40, 12],
        };
        assert_eq!(
            err.to_string(),
            "runtime error at pc 17: division by zero\n  call stack:\n    0: return to 12\n    1: return to 40"
        );
    }
}
