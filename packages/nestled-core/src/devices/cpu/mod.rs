//! Interpreter for the MOS 6502 as found in the 2A03.
//!
//! There is no decimal mode on this part: the D flag round-trips through
//! pushes and pops but has no effect on arithmetic.
//!
//! Instructions are re-decoded from the bus on every fetch (decode is a
//! table lookup, and the CPU only runs at ~1.79 MHz), executed by a single
//! match on the mnemonic, and accounted for with a final cycle count.

mod decode;
mod disasm;
mod state;

pub use decode::{decode, OpcodeInfo};
pub use disasm::{disassemble, disassemble_listing, trace_line};
pub use state::{AddrMode, CpuState, Instruction, Mnemonic, Status, POWERON_CPU_STATE};

use tracing::debug;

use super::nes::CpuBus;

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

const STACK_PAGE: u16 = 0x0100;

fn bytes_to_addr(lo: u8, hi: u8) -> u16 {
    u16::from(lo) | (u16::from(hi) << 8)
}

fn page_crossed(a: u16, b: u16) -> bool {
    a & 0xFF00 != b & 0xFF00
}

/// Decode the instruction at `pc`, pulling bytes through `read`.
pub(crate) fn decode_at<F: FnMut(u16) -> u8>(pc: u16, mut read: F) -> Instruction {
    let opcode = read(pc);
    let info = decode(opcode);
    let length = info.mode.length();
    let operand = match length {
        2 => u16::from(read(pc.wrapping_add(1))),
        3 => bytes_to_addr(read(pc.wrapping_add(1)), read(pc.wrapping_add(2))),
        _ => 0,
    };
    Instruction {
        opcode,
        mnemonic: info.mnemonic,
        mode: info.mode,
        operand,
        length,
        base_cycles: info.base_cycles,
        unofficial: info.unofficial,
    }
}

/// The page-cross penalty only applies to instructions that merely read
/// their operand; stores and read-modify-writes pay the worst case in
/// their base cycles.
fn page_penalty_applies(mnemonic: Mnemonic, mode: AddrMode) -> bool {
    use Mnemonic::*;
    matches!(mode, AddrMode::AbsX | AddrMode::AbsY | AddrMode::IndY)
        && matches!(
            mnemonic,
            LDA | LDX | LDY | ADC | SBC | AND | ORA | EOR | CMP | NOP | LAX | LAS
        )
}

pub struct Cpu {
    pub state: CpuState,
    /// Latched NMI request, polled at the top of every `step`.
    nmi_pending: bool,
}

impl Default for Cpu {
    fn default() -> Self {
        Cpu::new()
    }
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu {
            state: POWERON_CPU_STATE,
            nmi_pending: false,
        }
    }

    /// Warm reset: SP drops by 3, interrupts are masked, and execution
    /// restarts from the RESET vector. Memory is left alone.
    pub fn reset(&mut self, bus: &mut CpuBus) {
        self.state.stack = self.state.stack.wrapping_sub(3);
        self.state.status.insert(Status::IRQ_DISABLE);
        let lo = bus.read(RESET_VECTOR);
        let hi = bus.read(RESET_VECTOR + 1);
        self.state.pc = bytes_to_addr(lo, hi);
    }

    /// Latch an NMI request. It will be serviced before the next decode.
    pub fn trigger_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Service a latched NMI, if any, and return the cycles it consumed.
    pub fn service_pending_nmi(&mut self, bus: &mut CpuBus) -> Option<u8> {
        if !self.nmi_pending {
            return None;
        }
        self.nmi_pending = false;
        debug!(pc = self.state.pc, "servicing NMI");
        let [lo, hi] = self.state.pc.to_le_bytes();
        self.push(bus, hi);
        self.push(bus, lo);
        let pushed = (self.state.status - Status::BREAK) | Status::UNUSED;
        self.push(bus, pushed.bits());
        self.state.status.insert(Status::IRQ_DISABLE);
        let lo = bus.read(NMI_VECTOR);
        let hi = bus.read(NMI_VECTOR + 1);
        self.state.pc = bytes_to_addr(lo, hi);
        self.state.tot_cycles += 7;
        Some(7)
    }

    /// Run one instruction (servicing a pending NMI first) and return the
    /// cycles consumed.
    pub fn step(&mut self, bus: &mut CpuBus) -> u8 {
        let interrupt_cycles = self.service_pending_nmi(bus).unwrap_or(0);
        let instr = self.fetch(bus);
        interrupt_cycles + self.execute(bus, &instr)
    }

    /// Fetch and decode the instruction at PC through normal bus reads.
    pub fn fetch(&mut self, bus: &mut CpuBus) -> Instruction {
        decode_at(self.state.pc, |addr| bus.read(addr))
    }

    /// Decode the instruction at PC without side effects, for tracing.
    pub fn peek_instruction(&self, bus: &CpuBus) -> Instruction {
        decode_at(self.state.pc, |addr| bus.peek(addr).unwrap_or(0))
    }

    /// Resolve the effective address for an instruction, returning the
    /// address and whether indexing crossed a page boundary.
    fn resolve(&self, bus: &mut CpuBus, instr: &Instruction, pc_after: u16) -> (u16, bool) {
        let CpuState { x, y, .. } = self.state;
        match instr.mode {
            AddrMode::Impl | AddrMode::Accum | AddrMode::Imm => (0, false),
            AddrMode::ZeroPage => (instr.operand & 0x00FF, false),
            AddrMode::ZeroPageX => (u16::from((instr.operand as u8).wrapping_add(x)), false),
            AddrMode::ZeroPageY => (u16::from((instr.operand as u8).wrapping_add(y)), false),
            AddrMode::Abs => (instr.operand, false),
            AddrMode::AbsX => {
                let addr = instr.operand.wrapping_add(u16::from(x));
                (addr, page_crossed(instr.operand, addr))
            }
            AddrMode::AbsY => {
                let addr = instr.operand.wrapping_add(u16::from(y));
                (addr, page_crossed(instr.operand, addr))
            }
            AddrMode::AbsInd => {
                // The 6502 carries the pointer's low byte without a carry
                // out, so ($xxFF) reads its high byte from $xx00.
                let ptr = instr.operand;
                let lo = bus.read(ptr);
                let hi = bus.read((ptr & 0xFF00) | u16::from((ptr as u8).wrapping_add(1)));
                (bytes_to_addr(lo, hi), false)
            }
            AddrMode::IndX => {
                let ptr = (instr.operand as u8).wrapping_add(x);
                let lo = bus.read(u16::from(ptr));
                let hi = bus.read(u16::from(ptr.wrapping_add(1)));
                (bytes_to_addr(lo, hi), false)
            }
            AddrMode::IndY => {
                let ptr = instr.operand as u8;
                let lo = bus.read(u16::from(ptr));
                let hi = bus.read(u16::from(ptr.wrapping_add(1)));
                let base = bytes_to_addr(lo, hi);
                let addr = base.wrapping_add(u16::from(y));
                (addr, page_crossed(base, addr))
            }
            AddrMode::Rel => {
                let target = pc_after.wrapping_add((instr.operand as u8 as i8) as u16);
                (target, page_crossed(pc_after, target))
            }
        }
    }

    fn read_operand(&self, bus: &mut CpuBus, instr: &Instruction, addr: u16) -> u8 {
        match instr.mode {
            AddrMode::Imm => instr.operand as u8,
            AddrMode::Accum => self.state.acc,
            _ => bus.read(addr),
        }
    }

    /// Execute a decoded instruction and return the cycles consumed.
    pub fn execute(&mut self, bus: &mut CpuBus, instr: &Instruction) -> u8 {
        use Mnemonic::*;

        let pc_after = self.state.pc.wrapping_add(u16::from(instr.length));
        let (addr, crossed) = self.resolve(bus, instr, pc_after);
        self.state.pc = pc_after;

        let mut cycles = instr.base_cycles;
        if crossed && page_penalty_applies(instr.mnemonic, instr.mode) {
            cycles += 1;
        }

        match instr.mnemonic {
            // Loads and stores
            LDA => {
                self.state.acc = self.read_operand(bus, instr, addr);
                self.set_zn(self.state.acc);
            }
            LDX => {
                self.state.x = self.read_operand(bus, instr, addr);
                self.set_zn(self.state.x);
            }
            LDY => {
                self.state.y = self.read_operand(bus, instr, addr);
                self.set_zn(self.state.y);
            }
            STA => bus.write(addr, self.state.acc),
            STX => bus.write(addr, self.state.x),
            STY => bus.write(addr, self.state.y),

            // Register transfers
            TAX => {
                self.state.x = self.state.acc;
                self.set_zn(self.state.x);
            }
            TAY => {
                self.state.y = self.state.acc;
                self.set_zn(self.state.y);
            }
            TSX => {
                self.state.x = self.state.stack;
                self.set_zn(self.state.x);
            }
            TXA => {
                self.state.acc = self.state.x;
                self.set_zn(self.state.acc);
            }
            TYA => {
                self.state.acc = self.state.y;
                self.set_zn(self.state.acc);
            }
            // TXS is the one transfer that touches no flags.
            TXS => self.state.stack = self.state.x,

            // Stack
            PHA => self.push(bus, self.state.acc),
            PHP => {
                let pushed = self.state.status | Status::BREAK | Status::UNUSED;
                self.push(bus, pushed.bits());
            }
            PLA => {
                self.state.acc = self.pop(bus);
                self.set_zn(self.state.acc);
            }
            PLP => {
                let popped = self.pop(bus);
                self.state.status =
                    (Status::from_bits_truncate(popped) - Status::BREAK) | Status::UNUSED;
            }

            // Arithmetic
            ADC => {
                let m = self.read_operand(bus, instr, addr);
                self.adc(m);
            }
            SBC => {
                let m = self.read_operand(bus, instr, addr);
                self.adc(!m);
            }
            INC => {
                let val = bus.read(addr).wrapping_add(1);
                bus.write(addr, val);
                self.set_zn(val);
            }
            DEC => {
                let val = bus.read(addr).wrapping_sub(1);
                bus.write(addr, val);
                self.set_zn(val);
            }
            INX => {
                self.state.x = self.state.x.wrapping_add(1);
                self.set_zn(self.state.x);
            }
            DEX => {
                self.state.x = self.state.x.wrapping_sub(1);
                self.set_zn(self.state.x);
            }
            INY => {
                self.state.y = self.state.y.wrapping_add(1);
                self.set_zn(self.state.y);
            }
            DEY => {
                self.state.y = self.state.y.wrapping_sub(1);
                self.set_zn(self.state.y);
            }

            // Logical
            AND => {
                self.state.acc &= self.read_operand(bus, instr, addr);
                self.set_zn(self.state.acc);
            }
            ORA => {
                self.state.acc |= self.read_operand(bus, instr, addr);
                self.set_zn(self.state.acc);
            }
            EOR => {
                self.state.acc ^= self.read_operand(bus, instr, addr);
                self.set_zn(self.state.acc);
            }
            BIT => {
                let m = self.read_operand(bus, instr, addr);
                self.state.status.set(Status::ZERO, self.state.acc & m == 0);
                self.state.status.set(Status::NEGATIVE, m & 0x80 != 0);
                self.state.status.set(Status::OVERFLOW, m & 0x40 != 0);
            }

            // Shifts and rotates
            ASL => self.modify(bus, instr, addr, Cpu::asl),
            LSR => self.modify(bus, instr, addr, Cpu::lsr),
            ROL => self.modify(bus, instr, addr, Cpu::rol),
            ROR => self.modify(bus, instr, addr, Cpu::ror),

            // Compares
            CMP => {
                let m = self.read_operand(bus, instr, addr);
                self.compare(self.state.acc, m);
            }
            CPX => {
                let m = self.read_operand(bus, instr, addr);
                self.compare(self.state.x, m);
            }
            CPY => {
                let m = self.read_operand(bus, instr, addr);
                self.compare(self.state.y, m);
            }

            // Branches
            BPL => cycles += self.branch(!self.state.status.contains(Status::NEGATIVE), addr, crossed),
            BMI => cycles += self.branch(self.state.status.contains(Status::NEGATIVE), addr, crossed),
            BVC => cycles += self.branch(!self.state.status.contains(Status::OVERFLOW), addr, crossed),
            BVS => cycles += self.branch(self.state.status.contains(Status::OVERFLOW), addr, crossed),
            BCC => cycles += self.branch(!self.state.status.contains(Status::CARRY), addr, crossed),
            BCS => cycles += self.branch(self.state.status.contains(Status::CARRY), addr, crossed),
            BNE => cycles += self.branch(!self.state.status.contains(Status::ZERO), addr, crossed),
            BEQ => cycles += self.branch(self.state.status.contains(Status::ZERO), addr, crossed),

            // Jumps and returns
            JMP => self.state.pc = addr,
            JSR => {
                // The pushed return address is the last byte of the JSR
                // itself; RTS compensates with its +1.
                let ret = pc_after.wrapping_sub(1);
                let [lo, hi] = ret.to_le_bytes();
                self.push(bus, hi);
                self.push(bus, lo);
                self.state.pc = addr;
            }
            RTS => {
                let lo = self.pop(bus);
                let hi = self.pop(bus);
                self.state.pc = bytes_to_addr(lo, hi).wrapping_add(1);
            }
            RTI => {
                let popped = self.pop(bus);
                self.state.status =
                    (Status::from_bits_truncate(popped) - Status::BREAK) | Status::UNUSED;
                let lo = self.pop(bus);
                let hi = self.pop(bus);
                self.state.pc = bytes_to_addr(lo, hi);
            }
            BRK => {
                let ret = pc_after.wrapping_add(1);
                let [lo, hi] = ret.to_le_bytes();
                self.push(bus, hi);
                self.push(bus, lo);
                let pushed = self.state.status | Status::BREAK | Status::UNUSED;
                self.push(bus, pushed.bits());
                self.state.status.insert(Status::IRQ_DISABLE);
                let lo = bus.read(IRQ_VECTOR);
                let hi = bus.read(IRQ_VECTOR + 1);
                self.state.pc = bytes_to_addr(lo, hi);
            }

            // Flag setters
            CLC => self.state.status.remove(Status::CARRY),
            SEC => self.state.status.insert(Status::CARRY),
            CLI => self.state.status.remove(Status::IRQ_DISABLE),
            SEI => self.state.status.insert(Status::IRQ_DISABLE),
            CLV => self.state.status.remove(Status::OVERFLOW),
            CLD => self.state.status.remove(Status::DECIMAL),
            SED => self.state.status.insert(Status::DECIMAL),

            // NOP still performs the operand read in its addressed forms,
            // which is why the unofficial variants pay the page penalty.
            NOP => {
                if !matches!(instr.mode, AddrMode::Impl | AddrMode::Accum) {
                    let _ = self.read_operand(bus, instr, addr);
                }
            }

            // Unofficial opcodes with real semantics
            LAX => {
                let m = self.read_operand(bus, instr, addr);
                self.state.acc = m;
                self.state.x = m;
                self.set_zn(m);
            }
            SAX => bus.write(addr, self.state.acc & self.state.x),
            DCP => {
                let val = bus.read(addr).wrapping_sub(1);
                bus.write(addr, val);
                self.compare(self.state.acc, val);
            }
            ISB => {
                let val = bus.read(addr).wrapping_add(1);
                bus.write(addr, val);
                self.adc(!val);
            }
            SLO => {
                let val = bus.read(addr);
                let shifted = self.asl(val);
                bus.write(addr, shifted);
                self.state.acc |= shifted;
                self.set_zn(self.state.acc);
            }
            RLA => {
                let val = bus.read(addr);
                let rotated = self.rol(val);
                bus.write(addr, rotated);
                self.state.acc &= rotated;
                self.set_zn(self.state.acc);
            }
            SRE => {
                let val = bus.read(addr);
                let shifted = self.lsr(val);
                bus.write(addr, shifted);
                self.state.acc ^= shifted;
                self.set_zn(self.state.acc);
            }
            RRA => {
                let val = bus.read(addr);
                let rotated = self.ror(val);
                bus.write(addr, rotated);
                self.adc(rotated);
            }

            // The remaining unofficial opcodes are stubs: documented shape
            // and cycles, operand read, no architectural effect.
            ANC | ALR | ARR | AXS | LXA | XAA | AHX | SHX | SHY | TAS | LAS => {
                if !matches!(instr.mode, AddrMode::Impl | AddrMode::Accum) {
                    let _ = self.read_operand(bus, instr, addr);
                }
            }
            KIL => {}
        }

        self.state.tot_cycles += u64::from(cycles);
        cycles
    }

    fn set_zn(&mut self, val: u8) {
        self.state.status.set(Status::ZERO, val == 0);
        self.state.status.set(Status::NEGATIVE, val & 0x80 != 0);
    }

    fn push(&mut self, bus: &mut CpuBus, val: u8) {
        bus.write(STACK_PAGE | u16::from(self.state.stack), val);
        self.state.stack = self.state.stack.wrapping_sub(1);
    }

    fn pop(&mut self, bus: &mut CpuBus) -> u8 {
        self.state.stack = self.state.stack.wrapping_add(1);
        bus.read(STACK_PAGE | u16::from(self.state.stack))
    }

    /// Shared add core: SBC and the unofficial composites feed it the
    /// complement of the operand.
    fn adc(&mut self, m: u8) {
        let acc = self.state.acc;
        let carry = u16::from(self.state.status.contains(Status::CARRY));
        let sum = u16::from(acc) + u16::from(m) + carry;
        let result = sum as u8;
        self.state.status.set(Status::CARRY, sum > 0xFF);
        self.state
            .status
            .set(Status::OVERFLOW, (acc ^ result) & (m ^ result) & 0x80 != 0);
        self.state.acc = result;
        self.set_zn(result);
    }

    fn compare(&mut self, reg: u8, m: u8) {
        let result = reg.wrapping_sub(m);
        self.state.status.set(Status::CARRY, reg >= m);
        self.set_zn(result);
    }

    fn asl(&mut self, val: u8) -> u8 {
        self.state.status.set(Status::CARRY, val & 0x80 != 0);
        let result = val << 1;
        self.set_zn(result);
        result
    }

    fn lsr(&mut self, val: u8) -> u8 {
        self.state.status.set(Status::CARRY, val & 0x01 != 0);
        let result = val >> 1;
        self.set_zn(result);
        result
    }

    fn rol(&mut self, val: u8) -> u8 {
        let carry_in = u8::from(self.state.status.contains(Status::CARRY));
        self.state.status.set(Status::CARRY, val & 0x80 != 0);
        let result = (val << 1) | carry_in;
        self.set_zn(result);
        result
    }

    fn ror(&mut self, val: u8) -> u8 {
        let carry_in = u8::from(self.state.status.contains(Status::CARRY)) << 7;
        self.state.status.set(Status::CARRY, val & 0x01 != 0);
        let result = (val >> 1) | carry_in;
        self.set_zn(result);
        result
    }

    /// Apply a shift/rotate to the accumulator or to memory, depending on
    /// the addressing mode.
    fn modify(
        &mut self,
        bus: &mut CpuBus,
        instr: &Instruction,
        addr: u16,
        f: fn(&mut Cpu, u8) -> u8,
    ) {
        if instr.mode == AddrMode::Accum {
            self.state.acc = f(self, self.state.acc);
        } else {
            let val = bus.read(addr);
            let result = f(self, val);
            bus.write(addr, result);
        }
    }

    /// Take a branch when `cond` holds: +1 cycle, +1 more on page cross.
    fn branch(&mut self, cond: bool, target: u16, crossed: bool) -> u8 {
        if !cond {
            return 0;
        }
        self.state.pc = target;
        1 + u8::from(crossed)
    }
}
