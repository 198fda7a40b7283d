use std::io::{BufWriter, Read, Stdout, Write};

/// Character source for `read` and `bread`.
pub trait Input {
    /// Next character, `'\0'` once the input is exhausted.
    fn read(&mut self) -> char;
}

/// Character sink for `print` and `bprint`.
pub trait Output {
    fn write(&mut self, ch: char);

    fn flush(&mut self) {}
}

/// In-memory input and output, used by tests and embedders.
#[derive(Debug, Clone, Default)]
pub struct BufferIo {
    input: Vec<char>,
    pos: usize,
    output: String,
}

impl BufferIo {
    pub fn new(input: &str) -> Self {
        BufferIo {
            input: input.chars().collect(),
            pos: 0,
            output: String::new(),
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }
}

impl Input for BufferIo {
    fn read(&mut self) -> char {
        match self.input.get(self.pos) {
            Some(&ch) => {
                self.pos += 1;
                ch
            }
            None => '\0',
        }
    }
}

impl Output for BufferIo {
    fn write(&mut self, ch: char) {
        self.output.push(ch);
    }
}

/// Standard input and buffered standard output.
pub struct ConsoleIo {
    out: BufWriter<Stdout>,
}

impl Default for ConsoleIo {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleIo {
    pub fn new() -> Self {
        ConsoleIo {
            out: BufWriter::new(std::io::stdout()),
        }
    }
}

impl Input for ConsoleIo {
    /// Reads a single byte; read errors count as end of input.
    fn read(&mut self) -> char {
        let mut byte = [0u8; 1];
        match std::io::stdin().read(&mut byte) {
            Ok(1) => byte[0] as char,
            _ => '\0',
        }
    }
}

impl Output for ConsoleIo {
    fn write(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        if let Err(err) = self.out.write_all(ch.encode_utf8(&mut buf).as_bytes()) {
            tracing::warn!(%err, "stdout write failed");
        }
    }

    fn flush(&mut self) {
        if let Err(err) = self.out.flush() {
            tracing::warn!(%err, "stdout flush failed");
        }
    }
}
