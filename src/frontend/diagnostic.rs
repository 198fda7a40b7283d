use crate::frontend::token::TokenKind;

/// Every diagnostic the compiler can emit.
///
/// Lexical messages come first, then syntax, recovery and semantic ones.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Message {
    // Lexer
    #[error("empty character constant")]
    EmptyCharConst,
    #[error("undefined escape character sequence '\\{0}'")]
    UndefinedEscape(char),
    #[error("missing ' at end of character constant")]
    MissingQuote,
    #[error("invalid character {0}")]
    InvalidChar(char),
    #[error("{0} too big for integer constant")]
    BigNum(String),
    #[error("unexpected end of file in comment")]
    EofInComment,
    #[error("unexpected end of file in char")]
    EofInChar,
    #[error("illegal line end in character constant")]
    IllegalLineEnd,

    // Syntax
    #[error("unexpected token. + or - expected")]
    InvalidAddOp,
    #[error("unexpected token. =, +=, -=, *=, /=, %= expected")]
    InvalidAssignOp,
    #[error("unexpected token. *, /, % expected")]
    InvalidMulOp,
    #[error("invalid start of method decl: type name or void expected")]
    InvalidMethodDecl,
    #[error("unexpected token. identifier, if, while, break, return, read, print, '{{' or ; expected")]
    InvalidStatement,
    #[error(
        "unexpected token. assignment token (=, +=, -=, *=, /=, %=), method call (\"(\"), increment (++) or decrement (--) expected"
    )]
    InvalidDesignatorStatement,
    #[error("number or character constant expected")]
    InvalidConstType,
    #[error("unexpected token. identifier, number, character constant, new or \"(\" expected")]
    InvalidFactor,
    #[error("unexpected token. ==, !=, >, >=, <, <= expected")]
    InvalidRelOp,
    #[error("{0} expected")]
    TokenExpected(TokenKind),

    // Recovery
    #[error("start or follow of declaration expected")]
    DeclarationRecovery,
    #[error("start or follow of method declaration expected")]
    MethodDeclRecovery,
    #[error("start or follow of statement expected")]
    StatementRecovery,

    // Symbol table
    #[error("incompatible types")]
    IncompatibleTypes,
    #[error("{0} already declared in current scope")]
    DuplicateNameInScope(String),
    #[error("main method must not have any parameters")]
    MainWithParams,
    #[error("main method must return void")]
    MainNotVoid,
    #[error("{0} is not a field")]
    FieldNotFound(String),
    #[error("type expected")]
    TypeExpected,
    #[error("{0} not found")]
    NameNotFound(String),
    #[error("too many fields")]
    TooManyFields,
    #[error("too many global variables")]
    TooManyGlobals,
    #[error("too many local variables")]
    TooManyLocals,
    #[error("can only instantiate new object for a class")]
    ClassTypeExpected,

    // Code generation
    #[error("array index must be an integer")]
    ArrayIndexExpectsInt,
    #[error("array size must be an integer")]
    ArraySizeExpectsInt,
    #[error("cannot store to readonly operand of kind {0}")]
    CannotStoreToReadonly(String),
    #[error("cannot use void method as part of expression")]
    VoidCallInExpression,
    #[error("main method not found")]
    MainNotFound,
    #[error("indexed object is not an array")]
    IndexedAccessToNonArray,
    #[error("accessed object is not of kind class")]
    FieldAccessToNonClass,
    #[error("cannot create operand symbol table object of type {0}")]
    IllegalOperandKind(String),
    #[error(
        "already loaded (stack) or loadable operand (const, local, static, field, array element) expected"
    )]
    CannotLoadOperand,
    #[error("can only print int or char values")]
    IllegalPrintArgument,
    #[error("can only read int or char values")]
    IllegalReadArgument,
    #[error("increment and decrement only allowed for int")]
    IncDecExpectsInt,
    #[error("unary minus only allowed for int")]
    UnaryMinusExpectsInt,
    #[error("only equality and unequality checks are allowed for reference types")]
    IllegalReferenceComparison,
    #[error("methods may only return int or char")]
    IllegalMethodReturnType,
    #[error("number of arguments and formal parameters does not match")]
    WrongArgumentCount,
    #[error("break is not within a loop")]
    BreakOutsideLoop,
    #[error("called object is not a method")]
    CallToNonMethod,
    #[error("argument type does not match formal parameter type")]
    ArgumentTypeMismatch,
    #[error("return expression required in non-void method")]
    MissingReturnValue,
    #[error("no return expression allowed in void method")]
    UnexpectedReturnValue,
    #[error("return type must match method type")]
    ReturnTypeMismatch,
    #[error("jump distance too large")]
    JumpTooFar,
}

/// A message anchored at a source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub col: usize,
    pub message: Message,
}

impl std::fmt::Display for Diagnostic {
    /// Formats as `-- line L col C: message`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "-- line {} col {}: {}", self.line, self.col, self.message)
    }
}

/// Ordered collection of every diagnostic recorded during one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, line: usize, col: usize, message: Message) {
        tracing::debug!(line, col, %message, "diagnostic");
        self.entries.push(Diagnostic { line, col, message });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn messages(&self) -> Vec<&Message> {
        self.entries.iter().map(|d| &d.message).collect()
    }

    /// One diagnostic per line, each terminated by a newline.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for d in &self.entries {
            out.push_str(&d.to_string());
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.dump())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_format() {
        let d = Diagnostic {
            line: 3,
            col: 14,
            message: Message::TokenExpected(TokenKind::RPar),
        };
        assert_eq!(d.to_string(), "-- line 3 col 14: ) expected");
    }

    #[test]
    fn test_parameterized_messages() {
        assert_eq!(
            Message::UndefinedEscape('t').to_string(),
            "undefined escape character sequence '\\t'"
        );
        assert_eq!(Message::InvalidChar('$').to_string(), "invalid character $");
        assert_eq!(
            Message::BigNum("2147483648".into()).to_string(),
            "2147483648 too big for integer constant"
        );
        assert_eq!(
            Message::DuplicateNameInScope("x".into()).to_string(),
            "x already declared in current scope"
        );
        assert_eq!(
            Message::TokenExpected(TokenKind::Eof).to_string(),
            "end of file expected"
        );
    }

    #[test]
    fn test_braces_are_escaped() {
        assert!(Message::InvalidStatement.to_string().contains("'{' or ;"));
    }

    #[test]
    fn test_dump_keeps_order() {
        let mut diags = Diagnostics::new();
        diags.report(1, 1, Message::TypeExpected);
        diags.report(2, 5, Message::MainNotFound);

        assert_eq!(diags.len(), 2);
        assert_eq!(
            diags.dump(),
            "-- line 1 col 1: type expected\n-- line 2 col 5: main method not found\n"
        );
    }
}
