use std::collections::VecDeque;
use std::io::{self, Read, Write};

/// Byte stream behind the read and write traps.
pub trait Console {
    /// Next input byte, `None` at end of input. Blocks until one is available.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
    fn write_byte(&mut self, b: u8) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Process stdin/stdout.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match io::stdin().lock().read(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }

    fn write_byte(&mut self, b: u8) -> io::Result<()> {
        io::stdout().lock().write_all(&[b])
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().lock().flush()
    }
}

/// In-memory console: scripted input, captured output.
#[derive(Debug, Default, Clone)]
pub struct BufferConsole {
    pub input: VecDeque<u8>,
    pub output: Vec<u8>,
}

impl BufferConsole {
    pub fn new(input: &[u8]) -> Self {
        Self { input: input.iter().copied().collect(), output: Vec::new() }
    }

    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl Console for BufferConsole {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.input.pop_front())
    }

    fn write_byte(&mut self, b: u8) -> io::Result<()> {
        self.output.push(b);
        Ok(())
    }
}
