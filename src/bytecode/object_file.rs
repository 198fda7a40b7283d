//! `.obj` container: `"MJ"`, code size, data size, entry pc (all big-endian
//! `i32`), then the code bytes.

use std::io::Write;

const MAGIC: [u8; 2] = *b"MJ";
const HEADER_LEN: usize = 2 + 3 * 4;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectFileError {
    /// The file does not start with `MJ`.
    #[error("wrong marker")]
    WrongMarker,

    /// Header or code area cut short.
    #[error("truncated object file: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("codeSize <= 0")]
    EmptyCode,

    #[error("dataSize < 0")]
    NegativeDataSize,

    #[error("startPC not in code area")]
    StartOutsideCode,
}

/// A loadable program image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectFile {
    pub code: Vec<u8>,
    /// Global data words.
    pub data_size: i32,
    /// Entry address, `-1` when the program has no `main`.
    pub main_pc: i32,
}

impl ObjectFile {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.code.len());
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&(self.code.len() as i32).to_be_bytes());
        out.extend_from_slice(&self.data_size.to_be_bytes());
        out.extend_from_slice(&self.main_pc.to_be_bytes());
        out.extend_from_slice(&self.code);
        out
    }

    pub fn write_to(&self, w: &mut impl Write) -> std::io::Result<()> {
        w.write_all(&self.to_bytes())
    }

    /// Decodes and validates an image. Trailing bytes after the code area
    /// are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ObjectFileError> {
        if bytes.len() < HEADER_LEN {
            if !bytes.is_empty() && !MAGIC.starts_with(&bytes[..bytes.len().min(2)]) {
                return Err(ObjectFileError::WrongMarker);
            }
            return Err(ObjectFileError::Truncated {
                expected: HEADER_LEN,
                found: bytes.len(),
            });
        }
        if bytes[..2] != MAGIC {
            return Err(ObjectFileError::WrongMarker);
        }

        let word = |at: usize| i32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
        let code_size = word(2);
        let data_size = word(6);
        let main_pc = word(10);

        if code_size <= 0 {
            return Err(ObjectFileError::EmptyCode);
        }
        if data_size < 0 {
            return Err(ObjectFileError::NegativeDataSize);
        }
        if main_pc < 0 || main_pc >= code_size {
            return Err(ObjectFileError::StartOutsideCode);
        }

        let end = HEADER_LEN + code_size as usize;
        if bytes.len() < end {
            return Err(ObjectFileError::Truncated {
                expected: end,
                found: bytes.len(),
            });
        }

        Ok(ObjectFile {
            code: bytes[HEADER_LEN..end].to_vec(),
            data_size,
            main_pc,
        })
    }
}
