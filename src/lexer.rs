use std::iter::Peekable;
use std::str::Chars;

use serde::Serialize;

/// A lexical token tagged with the 1-based line it started on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Ident(String),
    Register(u8),
    /// Integer or character constant
    Constant(i64),
    Str(String),
    /// One of `:` `,` `[` `]` or newline
    Punct(char),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct LexError {
    pub line: usize,
    pub kind: LexErrorKind,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("unexpected character {0:?}")]
    Unexpected(char),
    #[error("invalid numeric constant")]
    BadNumber,
    #[error("invalid escape sequence")]
    BadEscape,
    #[error("unterminated character constant")]
    UnterminatedChar,
    #[error("unterminated string literal")]
    UnterminatedStr,
}

/// Peekable walk over the source that keeps track of the current line.
struct Cursor<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { chars: input.chars().peekable(), line: 1 }
    }

    fn first(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn take_while(&mut self, mut pred: impl FnMut(char) -> bool) -> String {
        let mut s = String::new();
        while let Some(c) = self.first() {
            if !pred(c) {
                break;
            }
            s.push(c);
            self.bump();
        }
        s
    }

    fn err(&self, kind: LexErrorKind) -> LexError {
        LexError { line: self.line, kind }
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_ident(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Register number in `0..=15`, spelled without leading zeros.
fn register_number(digits: &str) -> Option<u8> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse::<u8>().ok().filter(|&n| n < 16)
}

/// Split off a radix prefix: `0x`, `0b`, `0o` or a legacy leading `0` (octal).
fn split_radix(body: &str) -> (u32, &str) {
    let lower = body.get(..2).map(str::to_ascii_lowercase);
    match lower.as_deref() {
        Some("0x") => (16, &body[2..]),
        Some("0b") => (2, &body[2..]),
        Some("0o") => (8, &body[2..]),
        _ if body.len() > 1 && body.starts_with('0') => (8, &body[1..]),
        _ => (10, body),
    }
}

impl Cursor<'_> {
    /// Numeric constant; the first digit has not been consumed yet.
    fn number(&mut self, negative: bool) -> Result<i64, LexError> {
        // Digits and letters are taken together so that `12ab` is rejected
        // rather than split into a constant and an identifier.
        let body = self.take_while(is_ident);
        let (radix, digits) = split_radix(&body);
        if digits.is_empty() {
            return Err(self.err(LexErrorKind::BadNumber));
        }
        let value = i64::from_str_radix(digits, radix)
            .map_err(|_| self.err(LexErrorKind::BadNumber))?;
        Ok(if negative { -value } else { value })
    }

    /// Escape sequence after the backslash has been consumed.
    fn escape(&mut self) -> Result<char, LexError> {
        let c = self.bump().ok_or_else(|| self.err(LexErrorKind::BadEscape))?;
        let ch = match c {
            'a' => '\x07',
            'b' => '\x08',
            'f' => '\x0c',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\x0b',
            '\\' | '\'' | '"' | '?' => c,
            'x' => {
                let hex = self.take_while(|c| c.is_ascii_hexdigit());
                let v = u32::from_str_radix(&hex, 16)
                    .map_err(|_| self.err(LexErrorKind::BadEscape))?;
                char::from_u32(v)
                    .filter(|_| v <= 0xFF)
                    .ok_or_else(|| self.err(LexErrorKind::BadEscape))?
            }
            '0'..='7' => {
                let mut v = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.first().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            v = v * 8 + d;
                            self.bump();
                        }
                        None => break,
                    }
                }
                char::from_u32(v)
                    .filter(|_| v <= 0xFF)
                    .ok_or_else(|| self.err(LexErrorKind::BadEscape))?
            }
            _ => return Err(self.err(LexErrorKind::BadEscape)),
        };
        Ok(ch)
    }

    fn char_constant(&mut self) -> Result<i64, LexError> {
        let ch = match self.bump() {
            Some('\\') => self.escape()?,
            Some('\n') | Some('\'') | None => {
                return Err(self.err(LexErrorKind::UnterminatedChar))
            }
            Some(c) => c,
        };
        match self.bump() {
            Some('\'') => Ok(ch as i64),
            _ => Err(self.err(LexErrorKind::UnterminatedChar)),
        }
    }

    fn string(&mut self) -> Result<String, LexError> {
        let mut s = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(s),
                Some('\\') => s.push(self.escape()?),
                Some('\n') | None => return Err(self.err(LexErrorKind::UnterminatedStr)),
                Some(c) => s.push(c),
            }
        }
    }
}

/// Convert source text into a token stream.
///
/// Whitespace, carriage returns and `;` comments are dropped. On failure the
/// error carries the line where scanning stopped and no tokens are returned.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut cur = Cursor::new(input);
    let mut toks = Vec::new();

    while let Some(c) = cur.first() {
        let line = cur.line;
        let kind = match c {
            ' ' | '\t' | '\r' | '\x0b' | '\x0c' => {
                cur.bump();
                continue;
            }
            ';' => {
                cur.take_while(|c| c != '\n');
                continue;
            }
            '\n' => {
                cur.bump();
                cur.line += 1;
                TokenKind::Punct('\n')
            }
            ':' | ',' | '[' | ']' => {
                cur.bump();
                TokenKind::Punct(c)
            }
            '\'' => {
                cur.bump();
                TokenKind::Constant(cur.char_constant()?)
            }
            '"' => {
                cur.bump();
                TokenKind::Str(cur.string()?)
            }
            '+' | '-' => {
                cur.bump();
                if !cur.first().is_some_and(|c| c.is_ascii_digit()) {
                    return Err(cur.err(LexErrorKind::Unexpected(c)));
                }
                TokenKind::Constant(cur.number(c == '-')?)
            }
            c if c.is_ascii_digit() => TokenKind::Constant(cur.number(false)?),
            c if is_ident_start(c) => {
                let word = cur.take_while(is_ident);
                let reg = word
                    .strip_prefix(['r', 'R'])
                    .and_then(register_number);
                match reg {
                    Some(n) => TokenKind::Register(n),
                    None => TokenKind::Ident(word),
                }
            }
            other => return Err(cur.err(LexErrorKind::Unexpected(other))),
        };
        toks.push(Token { kind, line });
    }

    Ok(toks)
}
