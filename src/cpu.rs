use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::alu::{Word, FLAGS_REG};
use crate::decoder::{Decoded, Decoder, Format};
use crate::disasm::fmt_decoded;
use crate::exec::Executor;
use crate::memory::Bus;

/// Called with the CPU state and the decoded instruction just before it runs.
pub type TraceHook = Arc<dyn Fn(&Cpu, &Decoded) + Send + Sync>;

/// Execution configuration threaded through every step.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CpuConfig {
    #[serde(skip)]
    pub trace: Option<TraceHook>,
}

impl CpuConfig {
    pub fn with_trace(hook: impl Fn(&Cpu, &Decoded) + Send + Sync + 'static) -> Self {
        Self { trace: Some(Arc::new(hook)) }
    }
}

impl fmt::Debug for CpuConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CpuConfig").field("trace", &self.trace.is_some()).finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    pub pc: Word,
    /// Instruction register: the word last fetched at `pc`
    pub ir: Word,
    /// Address register: displacement of the last RX instruction
    pub adr: Word,
    pub reg: [Word; 16],
    pub cfg: CpuConfig,
}

/// Result of a single step that did not fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Running,
    /// Trap 0 executed
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub steps: u64,
    pub halted: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum Fault {
    #[error("Invalid instruction {word:#06x} at {pc:#06x}")]
    InvalidInstruction { pc: Word, word: Word },
    #[error("Division by zero at {pc:#06x}")]
    DivideByZero { pc: Word },
    #[error("Console I/O failed at {pc:#06x}: {source}")]
    Io { pc: Word, #[source] source: std::io::Error },
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new(CpuConfig::default())
    }
}

impl Cpu {
    pub fn new(cfg: CpuConfig) -> Self {
        Self {
            pc: 0,
            ir: 0,
            adr: 0,
            reg: [0; 16],
            cfg,
        }
    }

    pub fn reset(&mut self, reset_pc: Word) {
        self.pc = reset_pc;
        self.ir = 0;
        self.adr = 0;
        self.reg = [0; 16];
    }

    pub fn flags(&self) -> Word {
        self.reg[FLAGS_REG]
    }

    /// Fetch, decode and execute exactly one instruction.
    pub fn step<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        bus: &mut B,
        dec: &D,
        exec: &mut X,
    ) -> Result<Status, Fault> {
        let pc = self.pc;
        self.ir = bus.read(pc);
        self.pc = pc.wrapping_add(1);
        // RX words carry a displacement in the following word
        if Format::of(self.ir) == Format::Rx {
            self.adr = bus.read(self.pc);
            self.pc = self.pc.wrapping_add(1);
        }
        let d = dec
            .decode(self.ir, self.adr)
            .ok_or(Fault::InvalidInstruction { pc, word: self.ir })?;

        trace!("{pc:04x}: {:04x}  {}", self.ir, fmt_decoded(&d, None));
        if let Some(hook) = &self.cfg.trace {
            hook(&*self, &d);
        }

        let res = exec.exec(self, bus, d);
        // R0 reads as zero whatever was written to it
        self.reg[0] = 0;
        res
    }

    /// Step until halt or fault. With a budget, stop after that many
    /// instructions even if the program is still running.
    pub fn run<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        bus: &mut B,
        dec: &D,
        exec: &mut X,
        budget: Option<u64>,
    ) -> Result<RunSummary, Fault> {
        let mut steps = 0u64;
        while budget.map_or(true, |max| steps < max) {
            let status = self.step(bus, dec, exec)?;
            steps += 1;
            if status == Status::Halted {
                return Ok(RunSummary { steps, halted: true });
            }
        }
        Ok(RunSummary { steps, halted: false })
    }
}
