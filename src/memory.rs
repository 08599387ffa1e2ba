use serde::{Deserialize, Serialize};

use crate::alu::Word;

/// Memory size in words; addresses wrap modulo this.
pub const RAM_WORDS: usize = 0x10000;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("image length {0} is not a whole number of words")]
    OddLength(usize),
    #[error("image of {words} words does not fit in {RAM_WORDS} words of memory")]
    TooLarge { words: usize },
}

/// Word-addressed memory as seen by the CPU.
pub trait Bus {
    fn read(&self, addr: Word) -> Word;
    fn write(&mut self, addr: Word, val: Word);
}

/// Flat 64K-word RAM. Every 16-bit address is valid, so effective-address
/// arithmetic only needs to wrap in 16 bits.
#[derive(Clone, Serialize, Deserialize)]
pub struct LinearMemory {
    pub mem: Vec<Word>,
}

impl Default for LinearMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearMemory {
    pub fn new() -> Self {
        Self { mem: vec![0; RAM_WORDS] }
    }

    /// Fresh memory with `words` placed at address 0.
    pub fn with_image(words: &[Word]) -> Result<Self, LoadError> {
        let mut m = Self::new();
        m.load(words)?;
        Ok(m)
    }

    /// Copy an image to address 0; the rest of memory is left as is.
    pub fn load(&mut self, words: &[Word]) -> Result<(), LoadError> {
        if words.len() > RAM_WORDS {
            return Err(LoadError::TooLarge { words: words.len() });
        }
        self.mem[..words.len()].copy_from_slice(words);
        tracing::debug!(words = words.len(), "image loaded");
        Ok(())
    }
}

impl std::fmt::Debug for LinearMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.mem.iter().rposition(|&w| w != 0).map_or(0, |i| i + 1);
        f.debug_struct("LinearMemory").field("used", &used).finish()
    }
}

impl Bus for LinearMemory {
    fn read(&self, addr: Word) -> Word {
        self.mem[addr as usize]
    }
    fn write(&mut self, addr: Word, val: Word) {
        self.mem[addr as usize] = val;
    }
}

/// Decode a big-endian byte image into words.
pub fn words_from_be_bytes(bytes: &[u8]) -> Result<Vec<Word>, LoadError> {
    if bytes.len() % 2 != 0 {
        return Err(LoadError::OddLength(bytes.len()));
    }
    let words = bytes.len() / 2;
    if words > RAM_WORDS {
        return Err(LoadError::TooLarge { words });
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect())
}

/// Encode words as a big-endian byte image.
pub fn words_to_be_bytes(words: &[Word]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}
