//! The 256-entry opcode table.
//!
//! Decode is pure and cheap, so instructions are re-decoded on every fetch
//! rather than cached; there is no decode cache to invalidate on writes.

use super::state::{AddrMode, Mnemonic};

/// Static per-opcode facts; the operand is filled in at fetch time.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct OpcodeInfo {
    pub mnemonic: Mnemonic,
    pub mode: AddrMode,
    pub base_cycles: u8,
    pub unofficial: bool,
}

const fn op(mnemonic: Mnemonic, mode: AddrMode, base_cycles: u8) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        mode,
        base_cycles,
        unofficial: false,
    }
}

const fn uop(mnemonic: Mnemonic, mode: AddrMode, base_cycles: u8) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        mode,
        base_cycles,
        unofficial: true,
    }
}

/// Look up the decode facts for one opcode byte.
///
/// Every byte value decodes to something: official opcodes, the unofficial
/// set nestest exercises, or defined-shape stubs. The KIL group is decoded
/// as a 1-byte, 2-cycle stub rather than jamming the machine.
#[rustfmt::skip]
pub fn decode(opcode: u8) -> OpcodeInfo {
    use AddrMode::*;
    use Mnemonic::*;
    match opcode {
        // 0x0_
        0x00 => op(BRK, Impl, 7),
        0x01 => op(ORA, IndX, 6),
        0x03 => uop(SLO, IndX, 8),
        0x04 => uop(NOP, ZeroPage, 3),
        0x05 => op(ORA, ZeroPage, 3),
        0x06 => op(ASL, ZeroPage, 5),
        0x07 => uop(SLO, ZeroPage, 5),
        0x08 => op(PHP, Impl, 3),
        0x09 => op(ORA, Imm, 2),
        0x0A => op(ASL, Accum, 2),
        0x0B => uop(ANC, Imm, 2),
        0x0C => uop(NOP, Abs, 4),
        0x0D => op(ORA, Abs, 4),
        0x0E => op(ASL, Abs, 6),
        0x0F => uop(SLO, Abs, 6),

        // 0x1_
        0x10 => op(BPL, Rel, 2),
        0x11 => op(ORA, IndY, 5),
        0x13 => uop(SLO, IndY, 8),
        0x14 => uop(NOP, ZeroPageX, 4),
        0x15 => op(ORA, ZeroPageX, 4),
        0x16 => op(ASL, ZeroPageX, 6),
        0x17 => uop(SLO, ZeroPageX, 6),
        0x18 => op(CLC, Impl, 2),
        0x19 => op(ORA, AbsY, 4),
        0x1A => uop(NOP, Impl, 2),
        0x1B => uop(SLO, AbsY, 7),
        0x1C => uop(NOP, AbsX, 4),
        0x1D => op(ORA, AbsX, 4),
        0x1E => op(ASL, AbsX, 7),
        0x1F => uop(SLO, AbsX, 7),

        // 0x2_
        0x20 => op(JSR, Abs, 6),
        0x21 => op(AND, IndX, 6),
        0x23 => uop(RLA, IndX, 8),
        0x24 => op(BIT, ZeroPage, 3),
        0x25 => op(AND, ZeroPage, 3),
        0x26 => op(ROL, ZeroPage, 5),
        0x27 => uop(RLA, ZeroPage, 5),
        0x28 => op(PLP, Impl, 4),
        0x29 => op(AND, Imm, 2),
        0x2A => op(ROL, Accum, 2),
        0x2B => uop(ANC, Imm, 2),
        0x2C => op(BIT, Abs, 4),
        0x2D => op(AND, Abs, 4),
        0x2E => op(ROL, Abs, 6),
        0x2F => uop(RLA, Abs, 6),

        // 0x3_
        0x30 => op(BMI, Rel, 2),
        0x31 => op(AND, IndY, 5),
        0x33 => uop(RLA, IndY, 8),
        0x34 => uop(NOP, ZeroPageX, 4),
        0x35 => op(AND, ZeroPageX, 4),
        0x36 => op(ROL, ZeroPageX, 6),
        0x37 => uop(RLA, ZeroPageX, 6),
        0x38 => op(SEC, Impl, 2),
        0x39 => op(AND, AbsY, 4),
        0x3A => uop(NOP, Impl, 2),
        0x3B => uop(RLA, AbsY, 7),
        0x3C => uop(NOP, AbsX, 4),
        0x3D => op(AND, AbsX, 4),
        0x3E => op(ROL, AbsX, 7),
        0x3F => uop(RLA, AbsX, 7),

        // 0x4_
        0x40 => op(RTI, Impl, 6),
        0x41 => op(EOR, IndX, 6),
        0x43 => uop(SRE, IndX, 8),
        0x44 => uop(NOP, ZeroPage, 3),
        0x45 => op(EOR, ZeroPage, 3),
        0x46 => op(LSR, ZeroPage, 5),
        0x47 => uop(SRE, ZeroPage, 5),
        0x48 => op(PHA, Impl, 3),
        0x49 => op(EOR, Imm, 2),
        0x4A => op(LSR, Accum, 2),
        0x4B => uop(ALR, Imm, 2),
        0x4C => op(JMP, Abs, 3),
        0x4D => op(EOR, Abs, 4),
        0x4E => op(LSR, Abs, 6),
        0x4F => uop(SRE, Abs, 6),

        // 0x5_
        0x50 => op(BVC, Rel, 2),
        0x51 => op(EOR, IndY, 5),
        0x53 => uop(SRE, IndY, 8),
        0x54 => uop(NOP, ZeroPageX, 4),
        0x55 => op(EOR, ZeroPageX, 4),
        0x56 => op(LSR, ZeroPageX, 6),
        0x57 => uop(SRE, ZeroPageX, 6),
        0x58 => op(CLI, Impl, 2),
        0x59 => op(EOR, AbsY, 4),
        0x5A => uop(NOP, Impl, 2),
        0x5B => uop(SRE, AbsY, 7),
        0x5C => uop(NOP, AbsX, 4),
        0x5D => op(EOR, AbsX, 4),
        0x5E => op(LSR, AbsX, 7),
        0x5F => uop(SRE, AbsX, 7),

        // 0x6_
        0x60 => op(RTS, Impl, 6),
        0x61 => op(ADC, IndX, 6),
        0x63 => uop(RRA, IndX, 8),
        0x64 => uop(NOP, ZeroPage, 3),
        0x65 => op(ADC, ZeroPage, 3),
        0x66 => op(ROR, ZeroPage, 5),
        0x67 => uop(RRA, ZeroPage, 5),
        0x68 => op(PLA, Impl, 4),
        0x69 => op(ADC, Imm, 2),
        0x6A => op(ROR, Accum, 2),
        0x6B => uop(ARR, Imm, 2),
        0x6C => op(JMP, AbsInd, 5),
        0x6D => op(ADC, Abs, 4),
        0x6E => op(ROR, Abs, 6),
        0x6F => uop(RRA, Abs, 6),

        // 0x7_
        0x70 => op(BVS, Rel, 2),
        0x71 => op(ADC, IndY, 5),
        0x73 => uop(RRA, IndY, 8),
        0x74 => uop(NOP, ZeroPageX, 4),
        0x75 => op(ADC, ZeroPageX, 4),
        0x76 => op(ROR, ZeroPageX, 6),
        0x77 => uop(RRA, ZeroPageX, 6),
        0x78 => op(SEI, Impl, 2),
        0x79 => op(ADC, AbsY, 4),
        0x7A => uop(NOP, Impl, 2),
        0x7B => uop(RRA, AbsY, 7),
        0x7C => uop(NOP, AbsX, 4),
        0x7D => op(ADC, AbsX, 4),
        0x7E => op(ROR, AbsX, 7),
        0x7F => uop(RRA, AbsX, 7),

        // 0x8_
        0x80 => uop(NOP, Imm, 2),
        0x81 => op(STA, IndX, 6),
        0x82 => uop(NOP, Imm, 2),
        0x83 => uop(SAX, IndX, 6),
        0x84 => op(STY, ZeroPage, 3),
        0x85 => op(STA, ZeroPage, 3),
        0x86 => op(STX, ZeroPage, 3),
        0x87 => uop(SAX, ZeroPage, 3),
        0x88 => op(DEY, Impl, 2),
        0x89 => uop(NOP, Imm, 2),
        0x8A => op(TXA, Impl, 2),
        0x8B => uop(XAA, Imm, 2),
        0x8C => op(STY, Abs, 4),
        0x8D => op(STA, Abs, 4),
        0x8E => op(STX, Abs, 4),
        0x8F => uop(SAX, Abs, 4),

        // 0x9_
        0x90 => op(BCC, Rel, 2),
        0x91 => op(STA, IndY, 6),
        0x93 => uop(AHX, IndY, 6),
        0x94 => op(STY, ZeroPageX, 4),
        0x95 => op(STA, ZeroPageX, 4),
        0x96 => op(STX, ZeroPageY, 4),
        0x97 => uop(SAX, ZeroPageY, 4),
        0x98 => op(TYA, Impl, 2),
        0x99 => op(STA, AbsY, 5),
        0x9A => op(TXS, Impl, 2),
        0x9B => uop(TAS, AbsY, 5),
        0x9C => uop(SHY, AbsX, 5),
        0x9D => op(STA, AbsX, 5),
        0x9E => uop(SHX, AbsY, 5),
        0x9F => uop(AHX, AbsY, 5),

        // 0xA_
        0xA0 => op(LDY, Imm, 2),
        0xA1 => op(LDA, IndX, 6),
        0xA2 => op(LDX, Imm, 2),
        0xA3 => uop(LAX, IndX, 6),
        0xA4 => op(LDY, ZeroPage, 3),
        0xA5 => op(LDA, ZeroPage, 3),
        0xA6 => op(LDX, ZeroPage, 3),
        0xA7 => uop(LAX, ZeroPage, 3),
        0xA8 => op(TAY, Impl, 2),
        0xA9 => op(LDA, Imm, 2),
        0xAA => op(TAX, Impl, 2),
        0xAB => uop(LXA, Imm, 2),
        0xAC => op(LDY, Abs, 4),
        0xAD => op(LDA, Abs, 4),
        0xAE => op(LDX, Abs, 4),
        0xAF => uop(LAX, Abs, 4),

        // 0xB_
        0xB0 => op(BCS, Rel, 2),
        0xB1 => op(LDA, IndY, 5),
        0xB3 => uop(LAX, IndY, 5),
        0xB4 => op(LDY, ZeroPageX, 4),
        0xB5 => op(LDA, ZeroPageX, 4),
        0xB6 => op(LDX, ZeroPageY, 4),
        0xB7 => uop(LAX, ZeroPageY, 4),
        0xB8 => op(CLV, Impl, 2),
        0xB9 => op(LDA, AbsY, 4),
        0xBA => op(TSX, Impl, 2),
        0xBB => uop(LAS, AbsY, 4),
        0xBC => op(LDY, AbsX, 4),
        0xBD => op(LDA, AbsX, 4),
        0xBE => op(LDX, AbsY, 4),
        0xBF => uop(LAX, AbsY, 4),

        // 0xC_
        0xC0 => op(CPY, Imm, 2),
        0xC1 => op(CMP, IndX, 6),
        0xC2 => uop(NOP, Imm, 2),
        0xC3 => uop(DCP, IndX, 8),
        0xC4 => op(CPY, ZeroPage, 3),
        0xC5 => op(CMP, ZeroPage, 3),
        0xC6 => op(DEC, ZeroPage, 5),
        0xC7 => uop(DCP, ZeroPage, 5),
        0xC8 => op(INY, Impl, 2),
        0xC9 => op(CMP, Imm, 2),
        0xCA => op(DEX, Impl, 2),
        0xCB => uop(AXS, Imm, 2),
        0xCC => op(CPY, Abs, 4),
        0xCD => op(CMP, Abs, 4),
        0xCE => op(DEC, Abs, 6),
        0xCF => uop(DCP, Abs, 6),

        // 0xD_
        0xD0 => op(BNE, Rel, 2),
        0xD1 => op(CMP, IndY, 5),
        0xD3 => uop(DCP, IndY, 8),
        0xD4 => uop(NOP, ZeroPageX, 4),
        0xD5 => op(CMP, ZeroPageX, 4),
        0xD6 => op(DEC, ZeroPageX, 6),
        0xD7 => uop(DCP, ZeroPageX, 6),
        0xD8 => op(CLD, Impl, 2),
        0xD9 => op(CMP, AbsY, 4),
        0xDA => uop(NOP, Impl, 2),
        0xDB => uop(DCP, AbsY, 7),
        0xDC => uop(NOP, AbsX, 4),
        0xDD => op(CMP, AbsX, 4),
        0xDE => op(DEC, AbsX, 7),
        0xDF => uop(DCP, AbsX, 7),

        // 0xE_
        0xE0 => op(CPX, Imm, 2),
        0xE1 => op(SBC, IndX, 6),
        0xE2 => uop(NOP, Imm, 2),
        0xE3 => uop(ISB, IndX, 8),
        0xE4 => op(CPX, ZeroPage, 3),
        0xE5 => op(SBC, ZeroPage, 3),
        0xE6 => op(INC, ZeroPage, 5),
        0xE7 => uop(ISB, ZeroPage, 5),
        0xE8 => op(INX, Impl, 2),
        0xE9 => op(SBC, Imm, 2),
        0xEA => op(NOP, Impl, 2),
        0xEB => uop(SBC, Imm, 2),
        0xEC => op(CPX, Abs, 4),
        0xED => op(SBC, Abs, 4),
        0xEE => op(INC, Abs, 6),
        0xEF => uop(ISB, Abs, 6),

        // 0xF_
        0xF0 => op(BEQ, Rel, 2),
        0xF1 => op(SBC, IndY, 5),
        0xF3 => uop(ISB, IndY, 8),
        0xF4 => uop(NOP, ZeroPageX, 4),
        0xF5 => op(SBC, ZeroPageX, 4),
        0xF6 => op(INC, ZeroPageX, 6),
        0xF7 => uop(ISB, ZeroPageX, 6),
        0xF8 => op(SED, Impl, 2),
        0xF9 => op(SBC, AbsY, 4),
        0xFA => uop(NOP, Impl, 2),
        0xFB => uop(ISB, AbsY, 7),
        0xFC => uop(NOP, AbsX, 4),
        0xFD => op(SBC, AbsX, 4),
        0xFE => op(INC, AbsX, 7),
        0xFF => uop(ISB, AbsX, 7),

        // The KIL group ($02, $12, ... $F2), which doubles as the
        // defensive path: a 1-byte stub that cannot crash the interpreter.
        _ => uop(KIL, Impl, 2),
    }
}
