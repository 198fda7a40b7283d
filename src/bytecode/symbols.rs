use serde::{Deserialize, Serialize};

/// Names for code addresses and global slots, written next to an object file
/// so that the disassembler and the VM trace can print them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugSymbols {
    pub program: String,
    /// `(name, entry address)` in declaration order.
    pub methods: Vec<(String, i32)>,
    /// Global variable names indexed by data address.
    pub globals: Vec<String>,
}

impl DebugSymbols {
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }

    /// Method whose entry point is exactly `pc`.
    pub fn method_at(&self, pc: i32) -> Option<&str> {
        self.methods
            .iter()
            .find(|(_, adr)| *adr == pc)
            .map(|(name, _)| name.as_str())
    }

    /// Method whose body contains `pc`, assuming methods are laid out in
    /// declaration order.
    pub fn method_containing(&self, pc: i32) -> Option<&str> {
        self.methods
            .iter()
            .filter(|(_, adr)| *adr <= pc)
            .max_by_key(|(_, adr)| *adr)
            .map(|(name, _)| name.as_str())
    }

    pub fn global(&self, adr: i32) -> Option<&str> {
        usize::try_from(adr)
            .ok()
            .and_then(|i| self.globals.get(i))
            .map(String::as_str)
    }
}
