use crate::frontend::diagnostic::{Diagnostics, Message};
use crate::frontend::token::{Token, TokenKind};

const CR: char = '\r';
const LF: char = '\n';

/// On-demand scanner. Each call to [`Lexer::next_token`] yields one token;
/// lexical errors are recorded and scanning always continues.
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    /// Lookahead character, `None` at end of input.
    ch: Option<char>,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        let mut lexer = Lexer {
            source: source.chars().collect(),
            pos: 0,
            ch: None,
            line: 1,
            col: 0,
        };
        // first character lands on column 1
        lexer.next_ch();
        lexer
    }

    /// Scans the whole input, including the trailing `Eof` token.
    pub fn tokenize(source: &str) -> (Vec<Token>, Diagnostics) {
        let mut lexer = Lexer::new(source);
        let mut diagnostics = Diagnostics::new();
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token(&mut diagnostics);
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return (tokens, diagnostics);
            }
        }
    }

    fn next_ch(&mut self) {
        self.ch = self.source.get(self.pos).copied();
        if self.ch.is_some() {
            self.pos += 1;
        }
        self.col += 1;
        // a bare CR is ordinary whitespace; only LF starts a new line
        if self.ch == Some(LF) {
            self.line += 1;
            self.col = 0;
        }
    }

    fn error(&self, token: &mut Token, diagnostics: &mut Diagnostics, message: Message) {
        diagnostics.report(token.line, token.col, message);
        token.text = None;
        token.value = 0;
    }

    fn set(token: &mut Token, kind: TokenKind) {
        token.kind = kind;
        token.text = Some(kind.label().to_string());
    }

    /// Returns the next token, skipping whitespace and comments.
    pub fn next_token(&mut self, diagnostics: &mut Diagnostics) -> Token {
        loop {
            while self.ch.is_some_and(char::is_whitespace) {
                self.next_ch();
            }

            let mut t = Token::new(TokenKind::None, self.line, self.col);

            let Some(ch) = self.ch else {
                Self::set(&mut t, TokenKind::Eof);
                return t;
            };

            if is_letter(ch) {
                self.read_name(&mut t);
                return t;
            }
            if ch.is_ascii_digit() {
                self.read_number(&mut t, diagnostics);
                return t;
            }

            self.next_ch();
            match ch {
                '\'' => self.read_char_const(&mut t, diagnostics),
                '+' => self.one_of(&mut t, TokenKind::Plus, &[('=', TokenKind::PlusAs), ('+', TokenKind::PPlus)]),
                '-' => self.one_of(&mut t, TokenKind::Minus, &[('=', TokenKind::MinusAs), ('-', TokenKind::MMinus)]),
                '*' => self.one_of(&mut t, TokenKind::Times, &[('=', TokenKind::TimesAs)]),
                '/' => {
                    if self.ch == Some('*') {
                        self.next_ch();
                        self.skip_comment(&mut t, diagnostics);
                        continue;
                    }
                    self.one_of(&mut t, TokenKind::Slash, &[('=', TokenKind::SlashAs)]);
                }
                '%' => self.one_of(&mut t, TokenKind::Rem, &[('=', TokenKind::RemAs)]),
                '=' => self.one_of(&mut t, TokenKind::Assign, &[('=', TokenKind::Eql)]),
                '<' => self.one_of(&mut t, TokenKind::Lss, &[('=', TokenKind::Leq)]),
                '>' => self.one_of(&mut t, TokenKind::Gtr, &[('=', TokenKind::Geq)]),
                '!' => self.pair(&mut t, diagnostics, '!', '=', TokenKind::Neq),
                '&' => self.pair(&mut t, diagnostics, '&', '&', TokenKind::And),
                '|' => self.pair(&mut t, diagnostics, '|', '|', TokenKind::Or),
                ';' => Self::set(&mut t, TokenKind::Semicolon),
                ',' => Self::set(&mut t, TokenKind::Comma),
                '.' => Self::set(&mut t, TokenKind::Period),
                '(' => Self::set(&mut t, TokenKind::LPar),
                ')' => Self::set(&mut t, TokenKind::RPar),
                '[' => Self::set(&mut t, TokenKind::LBrack),
                ']' => Self::set(&mut t, TokenKind::RBrack),
                '{' => Self::set(&mut t, TokenKind::LBrace),
                '}' => Self::set(&mut t, TokenKind::RBrace),
                '~' => Self::set(&mut t, TokenKind::Tilde),
                other => self.error(&mut t, diagnostics, Message::InvalidChar(other)),
            }
            return t;
        }
    }

    /// Resolves an operator that may be extended by one following character.
    /// The lookahead is consumed only when it extends the operator.
    fn one_of(&mut self, t: &mut Token, single: TokenKind, longer: &[(char, TokenKind)]) {
        for &(next, kind) in longer {
            if self.ch == Some(next) {
                Self::set(t, kind);
                self.next_ch();
                return;
            }
        }
        Self::set(t, single);
    }

    /// Two-character operators whose first character is invalid on its own.
    fn pair(
        &mut self,
        t: &mut Token,
        diagnostics: &mut Diagnostics,
        first: char,
        second: char,
        kind: TokenKind,
    ) {
        if self.ch == Some(second) {
            Self::set(t, kind);
            self.next_ch();
        } else {
            self.error(t, diagnostics, Message::InvalidChar(first));
        }
    }

    fn read_name(&mut self, t: &mut Token) {
        let mut name = String::new();
        while let Some(ch) = self.ch {
            if is_letter(ch) || ch.is_ascii_digit() || ch == '_' {
                name.push(ch);
                self.next_ch();
            } else {
                break;
            }
        }

        match TokenKind::keyword(&name) {
            Some(kind) => Self::set(t, kind),
            None => {
                t.kind = TokenKind::Ident;
                t.text = Some(name);
            }
        }
    }

    fn read_number(&mut self, t: &mut Token, diagnostics: &mut Diagnostics) {
        t.kind = TokenKind::Number;
        let mut digits = String::new();
        while let Some(ch) = self.ch.filter(char::is_ascii_digit) {
            digits.push(ch);
            self.next_ch();
        }

        // 19 digits may already overflow i64
        let parsed = if digits.len() >= 19 {
            None
        } else {
            digits
                .parse::<i64>()
                .ok()
                .and_then(|n| i32::try_from(n).ok())
        };

        match parsed {
            Some(value) => {
                t.value = value;
                t.text = Some(digits);
            }
            None => self.error(t, diagnostics, Message::BigNum(digits)),
        }
    }

    /// Called with the opening quote already consumed.
    fn read_char_const(&mut self, t: &mut Token, diagnostics: &mut Diagnostics) {
        t.kind = TokenKind::CharConst;

        let first = match self.ch {
            None => {
                self.error(t, diagnostics, Message::EofInChar);
                return;
            }
            Some('\'') => {
                self.error(t, diagnostics, Message::EmptyCharConst);
                self.next_ch();
                return;
            }
            Some(CR) => {
                self.next_ch();
                if self.ch == Some(LF) {
                    self.next_ch();
                }
                self.error(t, diagnostics, Message::IllegalLineEnd);
                return;
            }
            Some(LF) => {
                self.error(t, diagnostics, Message::IllegalLineEnd);
                self.next_ch();
                return;
            }
            Some(ch) => ch,
        };

        self.next_ch();
        let Some(second) = self.ch else {
            self.error(t, diagnostics, Message::MissingQuote);
            return;
        };

        if first == '\\' {
            let value = match second {
                '\\' => Some('\\'),
                'n' => Some('\n'),
                'r' => Some('\r'),
                '\'' => Some('\''),
                _ => None,
            };
            match value {
                Some(c) => {
                    t.value = c as i32;
                    t.text = Some(c.to_string());
                }
                None => self.error(t, diagnostics, Message::UndefinedEscape(second)),
            }

            self.next_ch();
            if self.ch == Some('\'') {
                self.next_ch();
            } else {
                self.error(t, diagnostics, Message::MissingQuote);
            }
        } else if second == '\'' {
            t.value = first as i32;
            t.text = Some(first.to_string());
            self.next_ch();
        } else {
            self.error(t, diagnostics, Message::MissingQuote);
        }
    }

    /// Skips a (possibly nested) block comment whose opening `/*` is consumed.
    fn skip_comment(&mut self, t: &mut Token, diagnostics: &mut Diagnostics) {
        let mut depth = 1;
        while depth > 0 {
            match self.ch {
                Some('/') => {
                    self.next_ch();
                    if self.ch == Some('*') {
                        depth += 1;
                        self.next_ch();
                    }
                }
                Some('*') => {
                    self.next_ch();
                    if self.ch == Some('/') {
                        depth -= 1;
                        self.next_ch();
                    }
                }
                None => {
                    Self::set(t, TokenKind::Eof);
                    self.error(t, diagnostics, Message::EofInComment);
                    return;
                }
                Some(_) => self.next_ch(),
            }
        }
    }
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}
