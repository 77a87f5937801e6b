//! Disassembly and the nestest-compatible execution trace.
//!
//! Everything here reads the bus through `peek` only, so a trace can be
//! produced without perturbing the machine being traced.

use super::state::{AddrMode, Instruction, Mnemonic};
use super::{decode_at, Cpu};
use crate::devices::nes::CpuBus;

/// Placeholder printed for values behind mutable-read ports.
const UNPEEKABLE: u8 = 0xFF;

/// Dots per scanline; the trace's CYC column is a dot counter.
const DOTS_PER_SCANLINE: u64 = 341;

/// Render one nestest-format trace line for the instruction at PC.
///
/// ```text
/// C000  4C F5 C5  JMP $C5F5                        A:00 X:00 Y:00 P:24 SP:FD CYC:  0
/// ```
///
/// Unofficial opcodes are marked with a `*` in place of the gap before the
/// mnemonic. The CYC column is the cumulative PPU dot, `(cycles * 3) % 341`.
pub fn trace_line(cpu: &Cpu, bus: &CpuBus) -> String {
    let state = &cpu.state;
    let instr = cpu.peek_instruction(bus);
    let bytes = match instr.length {
        1 => format!("{:02X}", instr.opcode),
        2 => format!("{:02X} {:02X}", instr.opcode, instr.operand as u8),
        _ => format!(
            "{:02X} {:02X} {:02X}",
            instr.opcode,
            instr.operand as u8,
            (instr.operand >> 8) as u8
        ),
    };
    let marker = if instr.unofficial { '*' } else { ' ' };
    let disasm = annotated(&instr, cpu, bus);
    let dot = (state.tot_cycles * 3) % DOTS_PER_SCANLINE;
    format!(
        "{:04X}  {:<8} {}{:<32}A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{:>3}",
        state.pc,
        bytes,
        marker,
        disasm,
        state.acc,
        state.x,
        state.y,
        state.status.bits(),
        state.stack,
        dot
    )
}

/// Disassembly with the effective-address and value annotations nestest
/// expects, e.g. `LDA ($80,X) @ 80 = 0200 = 5A`.
fn annotated(instr: &Instruction, cpu: &Cpu, bus: &CpuBus) -> String {
    let mnemonic = format!("{:?}", instr.mnemonic);
    let peek = |addr: u16| bus.peek(addr).unwrap_or(UNPEEKABLE);
    let operand8 = instr.operand as u8;
    let pc_after = cpu.state.pc.wrapping_add(u16::from(instr.length));
    let is_jump = matches!(instr.mnemonic, Mnemonic::JMP | Mnemonic::JSR);

    let args = match instr.mode {
        AddrMode::Impl => String::new(),
        AddrMode::Accum => "A".to_string(),
        AddrMode::Imm => format!("#${:02X}", operand8),
        AddrMode::ZeroPage => format!("${:02X} = {:02X}", operand8, peek(instr.operand & 0xFF)),
        AddrMode::ZeroPageX => {
            let addr = operand8.wrapping_add(cpu.state.x);
            format!(
                "${:02X},X @ {:02X} = {:02X}",
                operand8,
                addr,
                peek(u16::from(addr))
            )
        }
        AddrMode::ZeroPageY => {
            let addr = operand8.wrapping_add(cpu.state.y);
            format!(
                "${:02X},Y @ {:02X} = {:02X}",
                operand8,
                addr,
                peek(u16::from(addr))
            )
        }
        AddrMode::Abs => {
            if is_jump {
                format!("${:04X}", instr.operand)
            } else {
                format!("${:04X} = {:02X}", instr.operand, peek(instr.operand))
            }
        }
        AddrMode::AbsX => {
            let addr = instr.operand.wrapping_add(u16::from(cpu.state.x));
            format!("${:04X},X @ {:04X} = {:02X}", instr.operand, addr, peek(addr))
        }
        AddrMode::AbsY => {
            let addr = instr.operand.wrapping_add(u16::from(cpu.state.y));
            format!("${:04X},Y @ {:04X} = {:02X}", instr.operand, addr, peek(addr))
        }
        AddrMode::AbsInd => {
            let ptr = instr.operand;
            let lo = peek(ptr);
            let hi = peek((ptr & 0xFF00) | u16::from((ptr as u8).wrapping_add(1)));
            format!(
                "(${:04X}) = {:04X}",
                ptr,
                u16::from(lo) | (u16::from(hi) << 8)
            )
        }
        AddrMode::IndX => {
            let ptr = operand8.wrapping_add(cpu.state.x);
            let lo = peek(u16::from(ptr));
            let hi = peek(u16::from(ptr.wrapping_add(1)));
            let addr = u16::from(lo) | (u16::from(hi) << 8);
            format!(
                "(${:02X},X) @ {:02X} = {:04X} = {:02X}",
                operand8,
                ptr,
                addr,
                peek(addr)
            )
        }
        AddrMode::IndY => {
            let lo = peek(u16::from(operand8));
            let hi = peek(u16::from(operand8.wrapping_add(1)));
            let base = u16::from(lo) | (u16::from(hi) << 8);
            let addr = base.wrapping_add(u16::from(cpu.state.y));
            format!(
                "(${:02X}),Y = {:04X} @ {:04X} = {:02X}",
                operand8,
                base,
                addr,
                peek(addr)
            )
        }
        AddrMode::Rel => {
            let target = pc_after.wrapping_add((operand8 as i8) as u16);
            format!("${:04X}", target)
        }
    };

    if args.is_empty() {
        mnemonic
    } else {
        format!("{} {}", mnemonic, args)
    }
}

/// Plain one-instruction disassembly, without memory annotations.
///
/// `pc` is the address of the instruction itself; it is only needed to
/// compute branch targets.
pub fn disassemble(instr: &Instruction, pc: u16) -> String {
    let mnemonic = format!("{:?}", instr.mnemonic);
    let operand8 = instr.operand as u8;
    let args = match instr.mode {
        AddrMode::Impl => String::new(),
        AddrMode::Accum => "A".to_string(),
        AddrMode::Imm => format!("#${:02X}", operand8),
        AddrMode::ZeroPage => format!("${:02X}", operand8),
        AddrMode::ZeroPageX => format!("${:02X},X", operand8),
        AddrMode::ZeroPageY => format!("${:02X},Y", operand8),
        AddrMode::Abs => format!("${:04X}", instr.operand),
        AddrMode::AbsX => format!("${:04X},X", instr.operand),
        AddrMode::AbsY => format!("${:04X},Y", instr.operand),
        AddrMode::AbsInd => format!("(${:04X})", instr.operand),
        AddrMode::IndX => format!("(${:02X},X)", operand8),
        AddrMode::IndY => format!("(${:02X}),Y", operand8),
        AddrMode::Rel => {
            let target = pc
                .wrapping_add(u16::from(instr.length))
                .wrapping_add((operand8 as i8) as u16);
            format!("${:04X}", target)
        }
    };
    if args.is_empty() {
        mnemonic
    } else {
        format!("{} {}", mnemonic, args)
    }
}

/// Disassemble a PRG-ROM image into listing lines, one per instruction.
pub fn disassemble_listing(prg: &[u8], base: u16) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pos = 0usize;
    while pos < prg.len() {
        let pc = base.wrapping_add(pos as u16);
        let instr = decode_at(pc, |addr| {
            let idx = addr.wrapping_sub(base) as usize;
            prg.get(idx).copied().unwrap_or(0)
        });
        let marker = if instr.unofficial { '*' } else { ' ' };
        lines.push(format!("{:04X}: {}{}", pc, marker, disassemble(&instr, pc)));
        pos += instr.length as usize;
    }
    lines
}
