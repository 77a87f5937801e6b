//! Register file, status flags, and the decoded instruction record.

bitflags! {
    pub struct Status: u8 {
        const CARRY = 0x01;
        const ZERO = 0x02;
        const IRQ_DISABLE = 0x04;
        const DECIMAL = 0x08;
        /// Only exists in pushed copies of P; never holds in the live flags.
        const BREAK = 0x10;
        /// Bit 5 reads as 1 whenever P is observed.
        const UNUSED = 0x20;
        const OVERFLOW = 0x40;
        const NEGATIVE = 0x80;
    }
}

/// The 6502 register file.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct CpuState {
    pub acc: u8,
    pub x: u8,
    pub y: u8,
    /// Stack pointer into page 1 ($0100-$01FF). Pushes decrement after the
    /// write, pops increment before the read; it wraps within the page.
    pub stack: u8,
    pub pc: u16,
    pub status: Status,
    /// Cumulative CPU cycles, used by the trace and for DMA parity.
    pub tot_cycles: u64,
}

/// Power-up register values, per the NES power-up state.
pub const POWERON_CPU_STATE: CpuState = CpuState {
    acc: 0,
    x: 0,
    y: 0,
    stack: 0xFD,
    pc: 0,
    status: Status::from_bits_truncate(0x24),
    tot_cycles: 0,
};

/// The thirteen addressing modes.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum AddrMode {
    /// No operand.
    Impl,
    /// Operate on the accumulator.
    Accum,
    /// The operand byte is the value.
    Imm,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Abs,
    AbsX,
    AbsY,
    /// JMP-only indirection, with the page-wrap hardware bug.
    AbsInd,
    /// ($nn,X): pointer fetched from the zero page after adding X.
    IndX,
    /// ($nn),Y: pointer fetched from the zero page, then Y added.
    IndY,
    /// Signed 8-bit branch displacement.
    Rel,
}

impl AddrMode {
    /// Instruction length in bytes, opcode included.
    pub const fn length(self) -> u8 {
        match self {
            AddrMode::Impl | AddrMode::Accum => 1,
            AddrMode::Imm
            | AddrMode::ZeroPage
            | AddrMode::ZeroPageX
            | AddrMode::ZeroPageY
            | AddrMode::IndX
            | AddrMode::IndY
            | AddrMode::Rel => 2,
            AddrMode::Abs | AddrMode::AbsX | AddrMode::AbsY | AddrMode::AbsInd => 3,
        }
    }
}

/// Instruction mnemonics: the 56 official ones plus the unofficial set.
///
/// The unofficial opcodes that nestest exercises get real implementations;
/// the rest decode to their documented shape and execute as reading NOPs.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[allow(clippy::upper_case_acronyms)]
pub enum Mnemonic {
    ADC, AND, ASL, BCC, BCS, BEQ, BIT, BMI, BNE, BPL, BRK, BVC, BVS, CLC,
    CLD, CLI, CLV, CMP, CPX, CPY, DEC, DEX, DEY, EOR, INC, INX, INY, JMP,
    JSR, LDA, LDX, LDY, LSR, NOP, ORA, PHA, PHP, PLA, PLP, ROL, ROR, RTI,
    RTS, SBC, SEC, SED, SEI, STA, STX, STY, TAX, TAY, TSX, TXA, TXS, TYA,
    // Unofficial opcodes with real semantics.
    LAX, SAX, DCP, ISB, SLO, RLA, SRE, RRA,
    // Unofficial opcodes stubbed as reading NOPs.
    ANC, ALR, ARR, AXS, LXA, XAA, AHX, SHX, SHY, TAS, LAS, KIL,
}

/// A decoded instruction, produced fresh on every fetch.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct Instruction {
    pub opcode: u8,
    pub mnemonic: Mnemonic,
    pub mode: AddrMode,
    /// Raw operand bytes, little-endian; 0 when the mode carries none.
    pub operand: u16,
    /// 1, 2 or 3 bytes.
    pub length: u8,
    pub base_cycles: u8,
    /// True for every opcode outside the official 151.
    pub unofficial: bool,
}
