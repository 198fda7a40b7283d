/// Token classes produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    None,
    Ident,
    Number,
    CharConst,

    // Arithmetic
    Plus,
    Minus,
    Times,
    Slash,
    Rem,

    // Comparison
    Eql,
    Neq,
    Lss,
    Leq,
    Gtr,
    Geq,

    // Logic
    And,
    Or,

    // Assignment
    Assign,
    PlusAs,
    MinusAs,
    TimesAs,
    SlashAs,
    RemAs,
    PPlus,
    MMinus,

    // Delimiters
    Semicolon,
    Comma,
    Period,
    LPar,
    RPar,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Tilde,

    // Keywords
    Break,
    Class,
    Else,
    Final,
    If,
    New,
    Print,
    Program,
    Read,
    Return,
    Void,
    While,

    Eof,
}

impl TokenKind {
    /// Human-readable label, used in `"... expected"` diagnostics.
    pub fn label(self) -> &'static str {
        use TokenKind::*;
        match self {
            None => "none",
            Ident => "identifier",
            Number => "number",
            CharConst => "character constant",
            Plus => "+",
            Minus => "-",
            Times => "*",
            Slash => "/",
            Rem => "%",
            Eql => "==",
            Neq => "!=",
            Lss => "<",
            Leq => "<=",
            Gtr => ">",
            Geq => ">=",
            And => "&&",
            Or => "||",
            Assign => "=",
            PlusAs => "+=",
            MinusAs => "-=",
            TimesAs => "*=",
            SlashAs => "/=",
            RemAs => "%=",
            PPlus => "++",
            MMinus => "--",
            Semicolon => ";",
            Comma => ",",
            Period => ".",
            LPar => "(",
            RPar => ")",
            LBrack => "[",
            RBrack => "]",
            LBrace => "{",
            RBrace => "}",
            Tilde => "~",
            Break => "break",
            Class => "class",
            Else => "else",
            Final => "final",
            If => "if",
            New => "new",
            Print => "print",
            Program => "program",
            Read => "read",
            Return => "return",
            Void => "void",
            While => "while",
            Eof => "end of file",
        }
    }

    pub fn keyword(word: &str) -> Option<TokenKind> {
        use TokenKind::*;
        let kind = match word {
            "break" => Break,
            "class" => Class,
            "else" => Else,
            "final" => Final,
            "if" => If,
            "new" => New,
            "print" => Print,
            "program" => Program,
            "read" => Read,
            "return" => Return,
            "void" => Void,
            "while" => While,
            _ => return Option::None,
        };
        Some(kind)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub col: usize,
    /// Source text (identifier name, digits, keyword/operator label).
    /// `None` for tokens that carried a lexical error.
    pub text: Option<String>,
    /// Numeric value of number and character constants, 0 otherwise.
    pub value: i32,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, col: usize) -> Self {
        Token {
            kind,
            line,
            col,
            text: None,
            value: 0,
        }
    }

    /// Identifier name or empty string when the token carried no text.
    pub fn name(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}
