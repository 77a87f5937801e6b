//! The master clock: owns the emulator on its own thread and drives it one
//! instruction at a time, with cooperative pause/step/resume.
//!
//! Pause lands on an instruction boundary by construction: the loop only
//! looks at the control channel between instructions, and while paused it
//! blocks on that channel, so `step` releases exactly one instruction.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use tracing::info;

use super::nes::Nes;

/// NTSC master clock. Informational: the clock preserves the CPU/PPU ratio
/// but makes no attempt at real-time pacing.
pub const MASTER_CLOCK_HZ: u64 = 21_477_272;
pub const CPU_CLOCK_DIVISOR: u64 = 12;
pub const PPU_CLOCK_DIVISOR: u64 = 4;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ClockState {
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ClockCommand {
    Pause,
    Resume,
    /// Run exactly one instruction while paused.
    Step,
    Stop,
}

/// What the clock did before it stopped.
#[derive(Debug, Copy, Clone, Default)]
pub struct RunSummary {
    pub instructions: u64,
    pub cpu_cycles: u64,
}

pub struct Clock {
    nes: Nes,
    ctrl_rx: Receiver<ClockCommand>,
    state: ClockState,
}

impl Clock {
    /// Move the emulator onto a clock thread and start it running.
    pub fn spawn(nes: Nes) -> ClockHandle {
        Clock::spawn_in(nes, ClockState::Running)
    }

    /// Like `spawn`, but the clock comes up paused and waits for `resume`
    /// or `step`. Debugger front-ends want this so no instructions slip
    /// through before their first command.
    pub fn spawn_paused(nes: Nes) -> ClockHandle {
        Clock::spawn_in(nes, ClockState::Paused)
    }

    fn spawn_in(nes: Nes, initial: ClockState) -> ClockHandle {
        let (ctrl_tx, ctrl_rx) = unbounded();
        let clock = Clock {
            nes,
            ctrl_rx,
            state: initial,
        };
        let thread = thread::spawn(move || clock.run());
        ClockHandle { ctrl_tx, thread }
    }

    fn run(mut self) -> (Nes, RunSummary) {
        info!(
            master_hz = MASTER_CLOCK_HZ,
            cpu_divisor = CPU_CLOCK_DIVISOR,
            ppu_divisor = PPU_CLOCK_DIVISOR,
            "clock running"
        );
        loop {
            match self.state {
                ClockState::Running => {
                    self.drain_commands();
                    if self.state == ClockState::Running {
                        self.nes.step_instruction();
                    }
                }
                ClockState::Paused => match self.ctrl_rx.recv() {
                    Ok(cmd) => self.apply(cmd),
                    // Every handle is gone; nobody can resume us.
                    Err(_) => self.state = ClockState::Stopped,
                },
                ClockState::Stopped => break,
            }
        }
        let summary = RunSummary {
            instructions: self.nes.instructions_retired(),
            cpu_cycles: self.nes.cpu.state.tot_cycles,
        };
        info!(
            instructions = summary.instructions,
            cpu_cycles = summary.cpu_cycles,
            "clock stopped"
        );
        (self.nes, summary)
    }

    fn drain_commands(&mut self) {
        loop {
            match self.ctrl_rx.try_recv() {
                Ok(cmd) => {
                    self.apply(cmd);
                    if self.state != ClockState::Running {
                        return;
                    }
                }
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    self.state = ClockState::Stopped;
                    return;
                }
            }
        }
    }

    fn apply(&mut self, cmd: ClockCommand) {
        match cmd {
            ClockCommand::Pause => {
                if self.state == ClockState::Running {
                    self.state = ClockState::Paused;
                }
            }
            ClockCommand::Resume => {
                if self.state == ClockState::Paused {
                    self.state = ClockState::Running;
                }
            }
            ClockCommand::Step => {
                if self.state == ClockState::Paused {
                    self.nes.step_instruction();
                }
            }
            ClockCommand::Stop => self.state = ClockState::Stopped,
        }
    }
}

/// Control surface for a running clock. Dropping the handle without
/// calling `stop` also stops the clock, once it notices the channel close.
pub struct ClockHandle {
    ctrl_tx: Sender<ClockCommand>,
    thread: JoinHandle<(Nes, RunSummary)>,
}

impl ClockHandle {
    pub fn pause(&self) {
        let _ = self.ctrl_tx.send(ClockCommand::Pause);
    }

    pub fn resume(&self) {
        let _ = self.ctrl_tx.send(ClockCommand::Resume);
    }

    pub fn step(&self) {
        let _ = self.ctrl_tx.send(ClockCommand::Step);
    }

    /// Stop the clock and take the emulator back for inspection.
    pub fn stop(self) -> (Nes, RunSummary) {
        let _ = self.ctrl_tx.send(ClockCommand::Stop);
        match self.thread.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
