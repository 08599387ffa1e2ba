use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::alu::Word;

/// Label name to address, filled during assembler pass 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymbolTable {
    map: HashMap<String, Word>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a label, returning the previous address if it was already defined.
    pub fn insert(&mut self, name: &str, addr: Word) -> Option<Word> {
        self.map.insert(name.to_string(), addr)
    }

    pub fn get(&self, name: &str) -> Option<Word> {
        self.map.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Entries ordered by address, then name.
    pub fn sorted(&self) -> Vec<(&str, Word)> {
        let mut v: Vec<(&str, Word)> = self.map.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        v.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
        v
    }

    /// Render as a symbol file: one `name:address` line per label, decimal.
    pub fn to_symbol_file(&self) -> String {
        self.sorted()
            .into_iter()
            .map(|(name, addr)| format!("{name}:{addr}\n"))
            .collect()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("symbol file line {line}: invalid entry {text:?}")]
pub struct SymbolFileError {
    pub line: usize,
    pub text: String,
}

/// Address to name, for display only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReverseSymbols {
    map: BTreeMap<Word, String>,
}

impl ReverseSymbols {
    pub fn get(&self, addr: Word) -> Option<&str> {
        self.map.get(&addr).map(String::as_str)
    }

    pub fn insert(&mut self, addr: Word, name: &str) {
        self.map.insert(addr, name.to_string());
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Parse `name:address` lines. Blank lines are skipped; when two names
    /// share an address the later line wins.
    pub fn parse(text: &str) -> Result<Self, SymbolFileError> {
        let mut rev = Self::default();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let bad = || SymbolFileError { line: i + 1, text: raw.to_string() };
            let (name, addr) = line.split_once(':').ok_or_else(bad)?;
            let addr: Word = addr.trim().parse().map_err(|_| bad())?;
            if name.is_empty() {
                return Err(bad());
            }
            rev.insert(addr, name);
        }
        Ok(rev)
    }
}

impl From<&SymbolTable> for ReverseSymbols {
    fn from(tab: &SymbolTable) -> Self {
        let mut rev = Self::default();
        for (name, addr) in tab.sorted() {
            rev.map.entry(addr).or_insert_with(|| name.to_string());
        }
        rev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_file_round_trip() {
        let mut tab = SymbolTable::new();
        tab.insert("loop", 4);
        tab.insert("start", 0);
        let text = tab.to_symbol_file();
        assert_eq!(text, "start:0\nloop:4\n");
        let rev = ReverseSymbols::parse(&text).unwrap();
        assert_eq!(rev.get(4), Some("loop"));
        assert_eq!(rev.get(0), Some("start"));
        assert_eq!(rev.get(2), None);
    }

    #[test]
    fn malformed_symbol_line() {
        let err = ReverseSymbols::parse("a:1\n\nbroken\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(ReverseSymbols::parse("x:70000").is_err());
    }
}
