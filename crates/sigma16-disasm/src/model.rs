use anyhow::{Context, Result};
use std::path::Path;

use sigma16_rs::memory::words_from_be_bytes;
use sigma16_rs::symbols::ReverseSymbols;
use sigma16_rs::Word;

/// A raw big-endian image placed at `base`.
#[derive(Debug, Clone)]
pub struct Image {
    pub base: Word,
    pub words: Vec<Word>,
}

pub fn load_image(path: &Path, base: Word, skip_words: usize) -> Result<Image> {
    let file = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let mut words = words_from_be_bytes(&file).with_context(|| format!("loading {}", path.display()))?;
    anyhow::ensure!(skip_words <= words.len(), "--skip exceeds image size");
    words.drain(..skip_words);
    Ok(Image { base, words })
}

pub fn load_symbols(path: &Path) -> Result<ReverseSymbols> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(ReverseSymbols::parse(&text)?)
}

/// Address argument, hex with `0x` prefix or decimal.
pub fn parse_u16(s: &str) -> Result<Word> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(Word::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<Word>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_applies_base_and_skip() {
        let path = std::env::temp_dir().join("_sigma16_model_test.bin");
        std::fs::write(&path, [0x00u8, 0x01, 0xd0, 0x00, 0xf1, 0x23, 0x00, 0x10]).unwrap();
        let img = load_image(&path, 0x0100, 1).unwrap();
        assert_eq!(img.base, 0x0100);
        assert_eq!(img.words, vec![0xd000, 0xf123, 0x0010]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn odd_length_image_is_rejected() {
        let path = std::env::temp_dir().join("_sigma16_model_odd.bin");
        std::fs::write(&path, [0x00u8, 0x01, 0xd0]).unwrap();
        assert!(load_image(&path, 0, 0).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn parse_u16_hex_and_dec() {
        assert_eq!(parse_u16("0x10").unwrap(), 0x10);
        assert_eq!(parse_u16("16").unwrap(), 16);
        assert!(parse_u16("zz").is_err());
        assert!(parse_u16("70000").is_err());
    }
}
