pub mod alu;
pub mod assembler;
pub mod console;
pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod exec;
pub mod instructions;
pub mod lexer;
pub mod memory;
pub mod parser;
pub mod symbols;

pub mod isa {
    pub mod sigma16;
}

pub use alu::{Flags, Word};
pub use assembler::{assemble, assemble_source, AsmError, Assembly};
pub use console::{BufferConsole, Console, StdConsole};
pub use cpu::{Cpu, CpuConfig, Fault, RunSummary, Status};
pub use memory::{Bus, LinearMemory, LoadError};
