use tracing::warn;

use crate::alu::{self, Flags, Word, FLAGS_REG};
use crate::console::Console;
use crate::cpu::{Cpu, Fault, Status};
use crate::decoder::{Decoded, Op};
use crate::memory::{Bus, RAM_WORDS};

pub const TRAP_EXIT: Word = 0;
pub const TRAP_READ: Word = 1;
pub const TRAP_WRITE: Word = 2;

/// Stored for each word a trap read could not fill.
pub const EOF_WORD: Word = 0xFFFF;

pub trait Executor {
    fn exec<B: Bus>(&mut self, cpu: &mut Cpu, bus: &mut B, d: Decoded) -> Result<Status, Fault>;
}

/// Integer executor; traps read from and write to `console`.
#[derive(Debug, Default)]
pub struct IntExecutor<C> {
    pub console: C,
}

impl<C: Console> IntExecutor<C> {
    pub fn new(console: C) -> Self {
        Self { console }
    }
}

/// Run a flag-setting ALU op into `dst`. Flags are dropped when `dst` is the
/// flags register itself, so the result is what survives.
fn with_flags(cpu: &mut Cpu, dst: u8, op: impl FnOnce(&mut Flags) -> Word) {
    let mut flags = Flags::from_word(cpu.reg[FLAGS_REG]);
    cpu.reg[dst as usize] = op(&mut flags);
    if dst as usize != FLAGS_REG {
        cpu.reg[FLAGS_REG] = flags.bits();
    }
}

/// Trap requests that would run past the end of memory are dropped.
fn in_bounds(op: &str, start: Word, len: Word) -> bool {
    if start as usize + len as usize > RAM_WORDS {
        warn!(start, len, "out of bounds trap {op} ignored");
        return false;
    }
    true
}

impl<C: Console> IntExecutor<C> {
    fn trap_read<B: Bus>(&mut self, bus: &mut B, start: Word, len: Word, pc: Word) -> Result<(), Fault> {
        if !in_bounds("read", start, len) {
            return Ok(());
        }
        for i in 0..len {
            let b = self.console.read_byte().map_err(|source| Fault::Io { pc, source })?;
            bus.write(start.wrapping_add(i), b.map_or(EOF_WORD, Word::from));
        }
        Ok(())
    }

    fn trap_write<B: Bus>(&mut self, bus: &mut B, start: Word, len: Word, pc: Word) -> Result<(), Fault> {
        if !in_bounds("write", start, len) {
            return Ok(());
        }
        let io = |source| Fault::Io { pc, source };
        for i in 0..len {
            self.console.write_byte(bus.read(start.wrapping_add(i)) as u8).map_err(io)?;
        }
        self.console.flush().map_err(io)
    }
}

impl<C: Console> Executor for IntExecutor<C> {
    fn exec<B: Bus>(&mut self, cpu: &mut Cpu, bus: &mut B, d: Decoded) -> Result<Status, Fault> {
        let ra = cpu.reg[d.a as usize];
        let rb = cpu.reg[d.b as usize];
        // Effective address for RX; meaningless but harmless otherwise
        let ea = d.disp.wrapping_add(ra);
        let pc = cpu.pc.wrapping_sub(d.width as Word);

        match d.op {
            Op::Add => with_flags(cpu, d.d, |f| alu::add(f, ra, rb)),
            Op::Sub => with_flags(cpu, d.d, |f| alu::sub(f, ra, rb)),
            Op::Mul => with_flags(cpu, d.d, |f| alu::mul(f, ra, rb)),
            Op::Addc => with_flags(cpu, d.d, |f| alu::addc(f, ra, rb)),
            Op::Div => {
                let (q, r) = alu::div(ra, rb).ok_or(Fault::DivideByZero { pc })?;
                cpu.reg[d.d as usize] = q;
                // Remainder goes to R15 unless the quotient already did
                if d.d as usize != FLAGS_REG {
                    cpu.reg[FLAGS_REG] = r;
                }
            }
            Op::Cmp => {
                let mut flags = Flags::from_word(cpu.reg[FLAGS_REG]);
                alu::cmp(&mut flags, ra, rb);
                cpu.reg[FLAGS_REG] = flags.bits();
            }
            Op::Cmplt => cpu.reg[d.d as usize] = alu::cmplt(ra, rb),
            Op::Cmpeq => cpu.reg[d.d as usize] = (ra == rb) as Word,
            Op::Cmpgt => cpu.reg[d.d as usize] = alu::cmpgt(ra, rb),
            Op::Inv => cpu.reg[d.d as usize] = !ra,
            Op::And => cpu.reg[d.d as usize] = ra & rb,
            Op::Or => cpu.reg[d.d as usize] = ra | rb,
            Op::Xor => cpu.reg[d.d as usize] = ra ^ rb,
            Op::Trap => match cpu.reg[d.d as usize] {
                TRAP_EXIT => return Ok(Status::Halted),
                TRAP_READ => self.trap_read(bus, ra, rb, pc)?,
                TRAP_WRITE => self.trap_write(bus, ra, rb, pc)?,
                _ => {}
            },
            Op::Exp => {}
            Op::Lea => cpu.reg[d.d as usize] = ea,
            Op::Load => cpu.reg[d.d as usize] = bus.read(ea),
            Op::Store => bus.write(ea, cpu.reg[d.d as usize]),
            Op::Jump => cpu.pc = ea,
            Op::Jumpc0 => {
                if !Flags::test_bit(cpu.reg[FLAGS_REG], d.d) {
                    cpu.pc = ea;
                }
            }
            Op::Jumpc1 => {
                if Flags::test_bit(cpu.reg[FLAGS_REG], d.d) {
                    cpu.pc = ea;
                }
            }
            Op::Jumpf => {
                if cpu.reg[d.d as usize] == 0 {
                    cpu.pc = ea;
                }
            }
            Op::Jumpt => {
                if cpu.reg[d.d as usize] != 0 {
                    cpu.pc = ea;
                }
            }
            Op::Jal => {
                cpu.reg[d.d as usize] = cpu.pc;
                cpu.pc = ea;
            }
        }
        Ok(Status::Running)
    }
}
