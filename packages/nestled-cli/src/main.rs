//! Command-line front-end: loads a ROM, then either prints a disassembly
//! listing, runs a compare-against-reference trace, or drives the clock
//! from a line-oriented REPL.

use std::fs::File;
use std::io::{BufRead, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use nestled_core::devices::clock::Clock;
use nestled_core::devices::cpu::{disassemble_listing, Status};
use nestled_core::devices::nes::Nes;

/// Columns of a trace line covered by the reference comparison: through
/// the SP field, excluding the cycle counter.
const TRACE_COMPARE_COLUMNS: usize = 73;

/// Instructions covered by the canonical nestest reference log.
const NESTEST_INSTRUCTIONS: usize = 8991;

#[derive(Parser)]
#[command(name = "nestled", about = "Cycle-timed NES emulator", version)]
struct Cli {
    /// The .nes ROM image to run
    rom: PathBuf,
    /// Write a nestest-format CPU trace to this file
    trace: Option<PathBuf>,
    /// Print a PRG-ROM disassembly listing and exit
    #[arg(long)]
    disasm: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut nes = Nes::from_file(&cli.rom)?;
    info!(rom = %cli.rom.display(), "loaded cartridge");

    if cli.disasm {
        for line in disassemble_listing(nes.bus.cart.prg(), 0x8000) {
            println!("{line}");
        }
        return Ok(());
    }

    if let Some(path) = &cli.trace {
        let sink = BufWriter::new(File::create(path)?);
        nes.set_trace_sink(Box::new(sink));
        info!(trace = %path.display(), "tracing CPU execution");
    }

    if let Some(gold_path) = find_reference_log(&cli.rom) {
        info!(log = %gold_path.display(), "reference log found, running comparison");
        return compare_against_reference(nes, &gold_path);
    }

    repl(nes)
}

/// The presence of `nestest.log` next to the ROM (or next to this binary)
/// switches the run into compare mode.
fn find_reference_log(rom: &Path) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = rom.parent() {
        candidates.push(dir.join("nestest.log"));
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.join("nestest.log"));
        }
    }
    candidates.into_iter().find(|path| path.exists())
}

/// Run the nestest automation entry point, comparing every trace line
/// against the reference log through the register columns.
fn compare_against_reference(
    mut nes: Nes,
    gold_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    nes.cpu.state.pc = 0xC000;
    nes.cpu.state.status = Status::from_bits_truncate(0x24);
    nes.cpu.state.stack = 0xFD;
    nes.cpu.state.acc = 0;
    nes.cpu.state.x = 0;
    nes.cpu.state.y = 0;

    let gold = std::io::BufReader::new(File::open(gold_path)?);
    let mut mismatches = 0u32;
    let mut lines = 0usize;
    for (idx, gold_line) in gold.lines().take(NESTEST_INSTRUCTIONS).enumerate() {
        let gold_line = gold_line?;
        let ours = nes.trace_line();
        let want = prefix(&gold_line);
        let got = prefix(&ours);
        if want != got {
            mismatches += 1;
            if mismatches <= 10 {
                warn!(line = idx + 1, want, got, "trace mismatch");
            }
        }
        nes.step_instruction();
        lines = idx + 1;
    }

    let official = nes.bus.peek(0x0002).unwrap_or(0xFF);
    let unofficial = nes.bus.peek(0x0003).unwrap_or(0xFF);
    info!(lines, mismatches, official, unofficial, "comparison finished");
    if mismatches > 0 || official != 0 || unofficial != 0 {
        return Err(format!(
            "nestest comparison failed: {mismatches} trace mismatches, \
             result codes {official:02X}/{unofficial:02X}"
        )
        .into());
    }
    Ok(())
}

fn prefix(line: &str) -> &str {
    &line[..TRACE_COMPARE_COLUMNS.min(line.len())]
}

/// Line-oriented control loop. The clock starts paused so that the first
/// `step` lands on the first instruction.
fn repl(nes: Nes) -> Result<(), Box<dyn std::error::Error>> {
    let handle = Clock::spawn_paused(nes);
    println!("commands: step (or empty line), pause, resume, quit");
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "" | "step" => handle.step(),
            "pause" => handle.pause(),
            "resume" => handle.resume(),
            "quit" => break,
            other => warn!(command = other, "unknown command"),
        }
    }
    let (_, summary) = handle.stop();
    info!(
        instructions = summary.instructions,
        cpu_cycles = summary.cpu_cycles,
        "emulation ended"
    );
    Ok(())
}
