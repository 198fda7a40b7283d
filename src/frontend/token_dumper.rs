use crate::frontend::token::{Token, TokenKind};

pub struct TokenDumper {
    pub color: bool,
    pub show_debug_repr: bool, // if false, prints the source text of each token
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_debug_repr: true,
        }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const RED: &'static str = "\x1b[31m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.show_debug_repr = false;
        self
    }

    pub fn dump(&self, tokens: &[Token]) {
        for t in tokens {
            println!("{}", self.render(t));
        }
    }

    pub fn render(&self, t: &Token) -> String {
        let group = self.group(t.kind);
        let colr = if self.color { self.color(t.kind) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        if self.show_debug_repr {
            format!(
                "[{:02}:{:02}] {}{:<8} {:?} {:?} {}{}",
                t.line, t.col, colr, group, t.kind, t.text, t.value, reset
            )
        } else {
            match t.kind {
                TokenKind::Number | TokenKind::CharConst => format!(
                    "[{:02}:{:02}] {}{:<8} {}{}",
                    t.line, t.col, colr, group, t.value, reset
                ),
                _ => format!(
                    "[{:02}:{:02}] {}{:<8} {}{}",
                    t.line,
                    t.col,
                    colr,
                    group,
                    t.text.as_deref().unwrap_or("<error>"),
                    reset
                ),
            }
        }
    }

    fn group(&self, kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            None => "ERROR",
            Eof => "EOF",

            Number => "NUMBER",
            CharConst => "CHAR",
            Ident => "IDENT",

            LPar | RPar | LBrack | RBrack | LBrace | RBrace => "BRACKET",
            Semicolon | Comma | Period | Tilde => "PUNCT",

            Plus | Minus | Times | Slash | Rem | And | Or => "OP",
            Eql | Neq | Lss | Leq | Gtr | Geq => "CMP",
            Assign | PlusAs | MinusAs | TimesAs | SlashAs | RemAs | PPlus | MMinus => "ASSIGN",

            Break | Class | Else | Final | If | New | Print | Program | Read | Return | Void
            | While => "KEYWORD",
        }
    }

    fn color(&self, kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            None => Self::RED,
            Eof | Semicolon | Comma | Period => Self::DIM,
            Number | CharConst => Self::CYN,
            Ident => Self::YEL,
            Plus | Minus | Times | Slash | Rem | And | Or => Self::MAG,
            Eql | Neq | Lss | Leq | Gtr | Geq => Self::MAG,
            _ => Self::RESET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;

    #[test]
    fn test_pretty_rendering() {
        let (tokens, _) = Lexer::tokenize("x = 'a';");
        let dumper = TokenDumper::new().no_color().pretty();

        assert_eq!(dumper.render(&tokens[0]), "[01:01] IDENT    x");
        assert_eq!(dumper.render(&tokens[1]), "[01:03] ASSIGN   =");
        assert_eq!(dumper.render(&tokens[2]), "[01:05] CHAR     97");
        assert_eq!(dumper.render(&tokens[3]), "[01:08] PUNCT    ;");
    }

    #[test]
    fn test_error_tokens_are_marked() {
        let (tokens, _) = Lexer::tokenize("$");
        let dumper = TokenDumper::new().no_color().pretty();
        assert_eq!(dumper.render(&tokens[0]), "[01:01] ERROR    <error>");
    }

    #[test]
    fn test_color_wraps_output() {
        let (tokens, _) = Lexer::tokenize("42");
        let line = TokenDumper::new().render(&tokens[0]);
        assert!(line.contains("\x1b[36m"));
        assert!(line.ends_with("\x1b[0m"));
    }
}
