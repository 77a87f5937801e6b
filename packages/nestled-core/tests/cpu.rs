//! Instruction-level behavior checks: documented flag arithmetic, the famous
//! addressing edge cases, and the cycle costs that nestest trips over.

mod util;

use nestled_core::devices::cpu::Status;
use util::{nes_with_program, prg_page, rom_from_page, step_n};

use nestled_core::devices::nes::Nes;

#[test]
fn adc_immediate_sequence() {
    // LDA #$05; ADC #$03; BRK (the BRK is never reached)
    let mut nes = nes_with_program(&[0xA9, 0x05, 0x69, 0x03, 0x00]);
    step_n(&mut nes, 2);
    assert_eq!(nes.cpu.state.acc, 0x08);
    let p = nes.cpu.state.status;
    assert!(!p.contains(Status::CARRY));
    assert!(!p.contains(Status::OVERFLOW));
    assert!(!p.contains(Status::ZERO));
    assert!(!p.contains(Status::NEGATIVE));
    assert_eq!(nes.cpu.state.pc, 0x8004);
}

#[test]
fn dex_wraps_and_sets_negative() {
    // LDX #$FF; DEX
    let mut nes = nes_with_program(&[0xA2, 0xFF, 0xCA]);
    step_n(&mut nes, 2);
    assert_eq!(nes.cpu.state.x, 0xFE);
    assert!(nes.cpu.state.status.contains(Status::NEGATIVE));
    assert!(!nes.cpu.state.status.contains(Status::ZERO));
}

#[test]
fn asl_shifts_top_bit_into_carry() {
    // LDA #$80; ASL A
    let mut nes = nes_with_program(&[0xA9, 0x80, 0x0A]);
    step_n(&mut nes, 2);
    assert_eq!(nes.cpu.state.acc, 0x00);
    let p = nes.cpu.state.status;
    assert!(p.contains(Status::CARRY));
    assert!(p.contains(Status::ZERO));
    assert!(!p.contains(Status::NEGATIVE));
}

#[test]
fn plp_clears_break_and_forces_bit5() {
    // LDA #$FF; PHA; LDA #$00; PLP: the popped $FF must come back with
    // B cleared and bit 5 set.
    let mut nes = nes_with_program(&[0xA9, 0xFF, 0x48, 0xA9, 0x00, 0x28]);
    step_n(&mut nes, 4);
    assert_eq!(nes.cpu.state.status.bits(), 0xEF);
}

#[test]
fn plp_of_zero_still_observes_bit5() {
    // LDA #$00; PHA; LDA #$FF; PLP
    let mut nes = nes_with_program(&[0xA9, 0x00, 0x48, 0xA9, 0xFF, 0x28]);
    step_n(&mut nes, 4);
    assert_eq!(nes.cpu.state.status.bits(), 0x20);
}

#[test]
fn php_plp_round_trips_live_flags() {
    // SEC; SED; PHP; CLC; CLD; PLP
    let mut nes = nes_with_program(&[0x38, 0xF8, 0x08, 0x18, 0xD8, 0x28]);
    step_n(&mut nes, 2);
    let before = nes.cpu.state.status;
    step_n(&mut nes, 4);
    let after = nes.cpu.state.status;
    assert_eq!(after, (before - Status::BREAK) | Status::UNUSED);
}

#[test]
fn indirect_jmp_wraps_within_the_page() {
    // JMP ($02FF) with $02FF = $34 and $0200 = $12 lands at $1234, not
    // $xx34 from $0300.
    let mut nes = nes_with_program(&[0x6C, 0xFF, 0x02]);
    nes.bus.write(0x02FF, 0x34);
    nes.bus.write(0x0200, 0x12);
    nes.bus.write(0x0300, 0x99);
    step_n(&mut nes, 1);
    assert_eq!(nes.cpu.state.pc, 0x1234);
}

#[test]
fn indirect_x_pointer_wraps_in_zero_page() {
    // LDA ($FF,X) with X=0: pointer bytes come from $FF and $00.
    let mut nes = nes_with_program(&[0xA1, 0xFF]);
    nes.bus.write(0x00FF, 0x00);
    nes.bus.write(0x0000, 0x02);
    nes.bus.write(0x0200, 0x5A);
    step_n(&mut nes, 1);
    assert_eq!(nes.cpu.state.acc, 0x5A);
}

#[test]
fn indirect_y_pointer_wraps_in_zero_page() {
    // LDY #$01; LDA ($FF),Y with pointer at $FF/$00.
    let mut nes = nes_with_program(&[0xA0, 0x01, 0xB1, 0xFF]);
    nes.bus.write(0x00FF, 0x00);
    nes.bus.write(0x0000, 0x02);
    nes.bus.write(0x0201, 0x77);
    step_n(&mut nes, 2);
    assert_eq!(nes.cpu.state.acc, 0x77);
}

#[test]
fn taken_branch_across_a_page_costs_four_cycles() {
    // BNE +$10 at $80F0 branches to $8102: 2 base + 1 taken + 1 cross.
    let mut page = prg_page(&[], 0x80F0);
    page[0xF0] = 0xD0;
    page[0xF1] = 0x10;
    let mut nes = Nes::from_ines_buf(&rom_from_page(&page)).unwrap();
    assert!(!nes.cpu.state.status.contains(Status::ZERO));
    let cycles = nes.step_instruction();
    assert_eq!(cycles, 4);
    assert_eq!(nes.cpu.state.pc, 0x8102);
}

#[test]
fn taken_branch_same_page_costs_three_cycles() {
    // BNE +$02 at $8000
    let mut nes = nes_with_program(&[0xD0, 0x02]);
    let cycles = nes.step_instruction();
    assert_eq!(cycles, 3);
    assert_eq!(nes.cpu.state.pc, 0x8004);
}

#[test]
fn untaken_branch_costs_two_cycles() {
    // BEQ with Z clear falls through.
    let mut nes = nes_with_program(&[0xF0, 0x10]);
    let cycles = nes.step_instruction();
    assert_eq!(cycles, 2);
    assert_eq!(nes.cpu.state.pc, 0x8002);
}

#[test]
fn pha_at_stack_bottom_wraps_to_top() {
    let mut nes = nes_with_program(&[0x48]);
    nes.cpu.state.stack = 0x00;
    nes.cpu.state.acc = 0xAB;
    step_n(&mut nes, 1);
    assert_eq!(nes.bus.peek(0x0100), Some(0xAB));
    assert_eq!(nes.cpu.state.stack, 0xFF);
}

#[test]
fn jsr_rts_returns_to_the_following_instruction() {
    // $8000: JSR $8004; $8003: NOP; $8004: RTS
    let mut nes = nes_with_program(&[0x20, 0x04, 0x80, 0xEA, 0x60]);
    let jsr_cycles = nes.step_instruction();
    assert_eq!(jsr_cycles, 6);
    assert_eq!(nes.cpu.state.pc, 0x8004);
    let rts_cycles = nes.step_instruction();
    assert_eq!(rts_cycles, 6);
    assert_eq!(nes.cpu.state.pc, 0x8003);
}

#[test]
fn tax_txa_preserves_accumulator() {
    // LDA #$C3; TAX; TXA
    let mut nes = nes_with_program(&[0xA9, 0xC3, 0xAA, 0x8A]);
    step_n(&mut nes, 3);
    assert_eq!(nes.cpu.state.acc, 0xC3);
    assert_eq!(nes.cpu.state.x, 0xC3);
    assert!(nes.cpu.state.status.contains(Status::NEGATIVE));
    assert!(!nes.cpu.state.status.contains(Status::ZERO));
}

#[test]
fn asl_then_lsr_is_identity_modulo_carry() {
    // LDA #$2A; ASL A; LSR A
    let mut nes = nes_with_program(&[0xA9, 0x2A, 0x0A, 0x4A]);
    step_n(&mut nes, 3);
    assert_eq!(nes.cpu.state.acc, 0x2A);
}

#[test]
fn txs_does_not_touch_flags() {
    // A zero transfer to SP must leave Z alone; TSX does set it.
    let mut nes = nes_with_program(&[0xA2, 0x01, 0x9A, 0xA2, 0x00, 0x9A]);
    step_n(&mut nes, 2); // LDX #$01; TXS
    assert_eq!(nes.cpu.state.stack, 0x01);
    assert!(!nes.cpu.state.status.contains(Status::ZERO));
    step_n(&mut nes, 1); // LDX #$00 sets Z
    assert!(nes.cpu.state.status.contains(Status::ZERO));
    step_n(&mut nes, 1); // TXS leaves Z set
    assert_eq!(nes.cpu.state.stack, 0x00);
    assert!(nes.cpu.state.status.contains(Status::ZERO));
}

#[test]
fn pc_advances_by_length_for_straightline_code() {
    // One instruction of each length: CLC (1), LDA #$01 (2), STA $0200 (3).
    let mut nes = nes_with_program(&[0x18, 0xA9, 0x01, 0x8D, 0x00, 0x02]);
    let mut pc = nes.cpu.state.pc;
    for expected_len in [1u16, 2, 3] {
        nes.step_instruction();
        assert_eq!(nes.cpu.state.pc, pc + expected_len);
        pc = nes.cpu.state.pc;
    }
}

#[test]
fn status_bit5_is_always_observed() {
    let mut nes = nes_with_program(&[0xA9, 0x00, 0x48, 0x28, 0xEA]);
    for _ in 0..4 {
        nes.step_instruction();
        assert!(
            nes.cpu.state.status.contains(Status::UNUSED),
            "bit 5 must read as 1 after every instruction"
        );
    }
}

#[test]
fn page_cross_penalty_applies_to_reads_not_writes() {
    // LDY #$FF; LDA $80C0,Y crosses into $81BF: 4 + 1 cycles.
    let mut nes = nes_with_program(&[0xA0, 0xFF, 0xB9, 0xC0, 0x80]);
    step_n(&mut nes, 1);
    assert_eq!(nes.step_instruction(), 5);

    // LDY #$FF; STA $02C0,Y pays its flat worst case of 5.
    let mut nes = nes_with_program(&[0xA0, 0xFF, 0x99, 0xC0, 0x02]);
    step_n(&mut nes, 1);
    assert_eq!(nes.step_instruction(), 5);

    // Same load without a crossing stays at 4.
    let mut nes = nes_with_program(&[0xA0, 0x01, 0xB9, 0xC0, 0x80]);
    step_n(&mut nes, 1);
    assert_eq!(nes.step_instruction(), 4);
}

#[test]
fn rmw_on_absolute_x_always_pays_seven() {
    // LDX #$01; INC $0200,X with no page cross still costs 7.
    let mut nes = nes_with_program(&[0xA2, 0x01, 0xFE, 0x00, 0x02]);
    step_n(&mut nes, 1);
    assert_eq!(nes.step_instruction(), 7);
    assert_eq!(nes.bus.peek(0x0201), Some(1));
}

#[test]
fn adc_signed_overflow() {
    // LDA #$50; ADC #$50: 0x50 + 0x50 overflows signed into 0xA0.
    let mut nes = nes_with_program(&[0xA9, 0x50, 0x69, 0x50]);
    step_n(&mut nes, 2);
    assert_eq!(nes.cpu.state.acc, 0xA0);
    let p = nes.cpu.state.status;
    assert!(p.contains(Status::OVERFLOW));
    assert!(p.contains(Status::NEGATIVE));
    assert!(!p.contains(Status::CARRY));
}

#[test]
fn sbc_borrows_through_carry() {
    // SEC; LDA #$50; SBC #$B0: signed overflow, no carry out.
    let mut nes = nes_with_program(&[0x38, 0xA9, 0x50, 0xE9, 0xB0]);
    step_n(&mut nes, 3);
    assert_eq!(nes.cpu.state.acc, 0xA0);
    let p = nes.cpu.state.status;
    assert!(p.contains(Status::OVERFLOW));
    assert!(!p.contains(Status::CARRY));
}

#[test]
fn bit_copies_memory_bits_into_nv() {
    // LDA #$01; BIT $0200 with $0200 = $C0: Z set, N set, V set.
    let mut nes = nes_with_program(&[0xA9, 0x01, 0x2C, 0x00, 0x02]);
    nes.bus.write(0x0200, 0xC0);
    step_n(&mut nes, 2);
    let p = nes.cpu.state.status;
    assert!(p.contains(Status::ZERO));
    assert!(p.contains(Status::NEGATIVE));
    assert!(p.contains(Status::OVERFLOW));
    assert_eq!(nes.cpu.state.acc, 0x01);
}

#[test]
fn brk_pushes_state_and_vectors_through_fffe() {
    let mut page = prg_page(&[0x00], 0x8000);
    // IRQ/BRK vector -> $9000 (page offset $1000).
    page[0x3FFE] = 0x00;
    page[0x3FFF] = 0x90;
    let mut nes = Nes::from_ines_buf(&rom_from_page(&page)).unwrap();
    let sp_before = nes.cpu.state.stack;
    let cycles = nes.step_instruction();
    assert_eq!(cycles, 7);
    assert_eq!(nes.cpu.state.pc, 0x9000);
    assert!(nes.cpu.state.status.contains(Status::IRQ_DISABLE));
    // Pushed PC+2, then P with B and bit 5 set.
    assert_eq!(nes.bus.peek(0x0100 | u16::from(sp_before)), Some(0x80));
    assert_eq!(
        nes.bus.peek(0x0100 | u16::from(sp_before.wrapping_sub(1))),
        Some(0x02)
    );
    let pushed_p = nes
        .bus
        .peek(0x0100 | u16::from(sp_before.wrapping_sub(2)))
        .unwrap();
    assert_eq!(pushed_p & 0x30, 0x30);
}

#[test]
fn rti_restores_flags_and_pc_without_increment() {
    // BRK into a handler that immediately RTIs back to $8002.
    let mut page = prg_page(&[0x00, 0xEA, 0xEA], 0x8000);
    page[0x3FFE] = 0x00;
    page[0x3FFF] = 0x90;
    page[0x1000] = 0x40; // RTI at $9000
    let mut nes = Nes::from_ines_buf(&rom_from_page(&page)).unwrap();
    step_n(&mut nes, 1);
    let cycles = nes.step_instruction();
    assert_eq!(cycles, 6);
    // BRK pushed PC+2 = $8002; RTI does not add one.
    assert_eq!(nes.cpu.state.pc, 0x8002);
    assert!(!nes.cpu.state.status.contains(Status::BREAK));
    assert!(nes.cpu.state.status.contains(Status::UNUSED));
}

#[test]
fn unofficial_lax_loads_both_registers() {
    // LAX $10 with $10 = $55
    let mut nes = nes_with_program(&[0xA7, 0x10]);
    nes.bus.write(0x0010, 0x55);
    step_n(&mut nes, 1);
    assert_eq!(nes.cpu.state.acc, 0x55);
    assert_eq!(nes.cpu.state.x, 0x55);
}

#[test]
fn unofficial_sax_stores_a_and_x() {
    // LDA #$F0; LDX #$3C; SAX $10
    let mut nes = nes_with_program(&[0xA9, 0xF0, 0xA2, 0x3C, 0x87, 0x10]);
    step_n(&mut nes, 3);
    assert_eq!(nes.bus.peek(0x0010), Some(0x30));
}

#[test]
fn unofficial_dcp_decrements_then_compares() {
    // LDA #$40; DCP $10 with $10 = $41: memory becomes $40, compare equal.
    let mut nes = nes_with_program(&[0xA9, 0x40, 0xC7, 0x10]);
    nes.bus.write(0x0010, 0x41);
    step_n(&mut nes, 2);
    assert_eq!(nes.bus.peek(0x0010), Some(0x40));
    let p = nes.cpu.state.status;
    assert!(p.contains(Status::ZERO));
    assert!(p.contains(Status::CARRY));
}

#[test]
fn unofficial_isb_increments_then_subtracts() {
    // SEC; LDA #$10; ISB $10 with $10 = $0F: memory becomes $10, A = 0.
    let mut nes = nes_with_program(&[0x38, 0xA9, 0x10, 0xE7, 0x10]);
    nes.bus.write(0x0010, 0x0F);
    step_n(&mut nes, 3);
    assert_eq!(nes.bus.peek(0x0010), Some(0x10));
    assert_eq!(nes.cpu.state.acc, 0x00);
    assert!(nes.cpu.state.status.contains(Status::ZERO));
}

#[test]
fn unofficial_slo_shifts_then_ors() {
    // LDA #$01; SLO $10 with $10 = $80: memory 0, carry set, A = 1.
    let mut nes = nes_with_program(&[0xA9, 0x01, 0x07, 0x10]);
    nes.bus.write(0x0010, 0x80);
    step_n(&mut nes, 2);
    assert_eq!(nes.bus.peek(0x0010), Some(0x00));
    assert!(nes.cpu.state.status.contains(Status::CARRY));
    assert_eq!(nes.cpu.state.acc, 0x01);
}

#[test]
fn unofficial_rra_rotates_then_adds() {
    // CLC; LDA #$01; RRA $10 with $10 = $04: memory 2, A = 3.
    let mut nes = nes_with_program(&[0x18, 0xA9, 0x01, 0x67, 0x10]);
    nes.bus.write(0x0010, 0x04);
    step_n(&mut nes, 3);
    assert_eq!(nes.bus.peek(0x0010), Some(0x02));
    assert_eq!(nes.cpu.state.acc, 0x03);
}

#[test]
fn unofficial_nop_reads_pay_the_page_cross() {
    // LDX #$FF; NOP $80C0,X (0xFC) crosses into $81BF: 4 + 1 cycles.
    let mut nes = nes_with_program(&[0xA2, 0xFF, 0xFC, 0xC0, 0x80]);
    step_n(&mut nes, 1);
    assert_eq!(nes.step_instruction(), 5);

    let mut nes = nes_with_program(&[0xA2, 0x01, 0xFC, 0xC0, 0x80]);
    step_n(&mut nes, 1);
    assert_eq!(nes.step_instruction(), 4);
}

#[test]
fn kil_bytes_do_not_crash() {
    let mut nes = nes_with_program(&[0x02, 0x12, 0xEA]);
    step_n(&mut nes, 3);
    assert_eq!(nes.cpu.state.pc, 0x8003);
}

#[test]
fn nmi_is_serviced_between_instructions() {
    // Enable vblank NMI, then spin; the handler at $8100 increments X.
    let mut page = prg_page(
        &[0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80],
        0x8000,
    );
    page[0x0100] = 0xE8; // INX
    page[0x0101] = 0x4C; // JMP $8101
    page[0x0102] = 0x01;
    page[0x0103] = 0x81;
    page[0x3FFA] = 0x00;
    page[0x3FFB] = 0x81;
    let mut nes = Nes::from_ines_buf(&rom_from_page(&page)).unwrap();
    let mut reached_handler = false;
    for _ in 0..60_000 {
        nes.step_instruction();
        if (0x8100..0x8104).contains(&nes.cpu.state.pc) {
            reached_handler = true;
            break;
        }
    }
    assert!(reached_handler, "vblank NMI never reached its handler");
    assert!(nes.cpu.state.status.contains(Status::IRQ_DISABLE));
    step_n(&mut nes, 1);
    assert_eq!(nes.cpu.state.x, 1);
}

#[test]
fn trace_line_matches_nestest_shape() {
    let nes = nes_with_program(&[0x4C, 0xF5, 0xC5]);
    let line = nes.trace_line();
    assert!(line.starts_with("8000  4C F5 C5  JMP $C5F5"));
    assert_eq!(&line[48..], "A:00 X:00 Y:00 P:24 SP:FD CYC:  0");
}

#[test]
fn trace_annotates_indexed_indirect_operands() {
    let mut nes = nes_with_program(&[0xC1, 0x80]);
    nes.bus.write(0x0080, 0x00);
    nes.bus.write(0x0081, 0x02);
    nes.bus.write(0x0200, 0x5A);
    let line = nes.trace_line();
    assert!(
        line.contains("CMP ($80,X) @ 80 = 0200 = 5A"),
        "unexpected annotation: {}",
        line
    );
}

#[test]
fn trace_marks_unofficial_opcodes() {
    let mut nes = nes_with_program(&[0xA7, 0x10]);
    nes.bus.write(0x0010, 0x55);
    let line = nes.trace_line();
    assert!(line.contains("*LAX $10 = 55"), "line was: {}", line);
}

#[test]
fn trace_cycle_column_is_a_ppu_dot_counter() {
    // Two NOPs = 4 CPU cycles = 12 dots.
    let mut nes = nes_with_program(&[0xEA, 0xEA, 0xEA]);
    step_n(&mut nes, 2);
    let line = nes.trace_line();
    assert!(line.ends_with("CYC: 12"), "line was: {}", line);
}
