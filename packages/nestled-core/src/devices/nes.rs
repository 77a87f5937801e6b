//! The NES as a unit: CPU, PPU, RAM and cartridge wired to one bus, stepped
//! one instruction at a time with the PPU advancing 3 dots per CPU cycle.

use std::io::Write;
use std::path::Path;

use crossbeam_channel::{Sender, TrySendError};
use tracing::debug;

use super::bus::{cpu_memory_map, BusDevice};
use super::cartridge::{from_ines, Cartridge, RomError};
use super::cpu::{trace_line, Cpu};
use super::mem::Ram;
use super::ppu::Ppu;

/// Dots the PPU advances for every CPU cycle (NTSC).
pub const PPU_DOTS_PER_CPU_CYCLE: u32 = 3;

const RAM_SIZE: usize = 0x800;

/// A completed-frame notification pushed toward a renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Frame {
    pub index: u64,
}

/// Everything the CPU can see through its address pins.
///
/// Owning the non-CPU devices separately from the CPU itself is what lets
/// `Cpu::step(&mut CpuBus)` borrow-check: the register file and the bus are
/// disjoint.
pub struct CpuBus {
    ram: Ram,
    pub ppu: Ppu,
    pub cart: Box<dyn Cartridge>,
    /// Page latched by a $4014 write; the motherboard runs the copy after
    /// the instruction completes.
    dma_page: Option<u8>,
}

impl CpuBus {
    fn new(ppu: Ppu, cart: Box<dyn Cartridge>) -> CpuBus {
        CpuBus {
            ram: Ram::new(RAM_SIZE),
            ppu,
            cart,
            dma_page: None,
        }
    }

    /// Read with hardware side effects (PPUSTATUS latch clear, PPUDATA
    /// buffer advance).
    pub fn read(&mut self, addr: u16) -> u8 {
        let (device, local) = cpu_memory_map::match_addr(addr);
        match device {
            cpu_memory_map::Device::Ram => self.ram.read(local),
            cpu_memory_map::Device::PpuPort => self.ppu.read_port(local, self.cart.as_ref()),
            // OAMDMA and the APU/IO block read back as open bus; 0 here,
            // since open-bus modeling is out of scope.
            cpu_memory_map::Device::OamDma | cpu_memory_map::Device::ApuIo => 0,
            cpu_memory_map::Device::Cartridge => self.cart.read_prg(local),
        }
    }

    /// Debug read: never mutates state. Returns None where a real read
    /// would have side effects.
    pub fn peek(&self, addr: u16) -> Option<u8> {
        let (device, local) = cpu_memory_map::match_addr(addr);
        match device {
            cpu_memory_map::Device::Ram => self.ram.peek(local).to_optional(),
            cpu_memory_map::Device::PpuPort => self.ppu.peek_port(local).to_optional(),
            cpu_memory_map::Device::OamDma | cpu_memory_map::Device::ApuIo => None,
            cpu_memory_map::Device::Cartridge => Some(self.cart.read_prg(local)),
        }
    }

    pub fn write(&mut self, addr: u16, data: u8) {
        let (device, local) = cpu_memory_map::match_addr(addr);
        match device {
            cpu_memory_map::Device::Ram => self.ram.write(local, data),
            cpu_memory_map::Device::PpuPort => {
                let CpuBus { ppu, cart, .. } = self;
                ppu.write_port(local, data, cart.as_mut());
            }
            cpu_memory_map::Device::OamDma => self.dma_page = Some(data),
            cpu_memory_map::Device::ApuIo => {}
            cpu_memory_map::Device::Cartridge => self.cart.write_prg(local, data),
        }
    }
}

pub struct Nes {
    pub cpu: Cpu,
    pub bus: CpuBus,
    /// Instructions retired since power-on.
    instructions: u64,
    frame_tx: Option<Sender<Frame>>,
    trace_sink: Option<Box<dyn Write + Send>>,
}

impl Nes {
    /// Build a NES from an iNES image and point the CPU at the RESET vector.
    pub fn from_ines_buf(buf: &[u8]) -> Result<Nes, RomError> {
        let cart = from_ines(buf)?;
        let ppu = Ppu::new(cart.vertical_mirroring());
        let mut bus = CpuBus::new(ppu, cart);
        let mut cpu = Cpu::new();
        let lo = bus.read(0xFFFC);
        let hi = bus.read(0xFFFD);
        cpu.state.pc = u16::from(lo) | (u16::from(hi) << 8);
        Ok(Nes {
            cpu,
            bus,
            instructions: 0,
            frame_tx: None,
            trace_sink: None,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Nes, RomError> {
        let buf = std::fs::read(path)?;
        Nes::from_ines_buf(&buf)
    }

    /// Attach the renderer's frame channel. Frames are delivered with
    /// `try_send` and dropped when nobody is listening or the channel is
    /// full; emulation never blocks on a renderer.
    pub fn attach_renderer(&mut self, tx: Sender<Frame>) {
        self.frame_tx = Some(tx);
    }

    /// Attach a writer that receives one nestest-format line per
    /// instruction, written just before the instruction executes.
    pub fn set_trace_sink(&mut self, sink: Box<dyn Write + Send>) {
        self.trace_sink = Some(sink);
    }

    /// Hardware reset: the CPU restarts from the RESET vector, memory
    /// stays put.
    pub fn reset(&mut self) {
        self.cpu.reset(&mut self.bus);
    }

    pub fn instructions_retired(&self) -> u64 {
        self.instructions
    }

    /// One nestest-format line for the instruction the CPU will run next.
    pub fn trace_line(&self) -> String {
        trace_line(&self.cpu, &self.bus)
    }

    /// Run one CPU instruction, then advance the PPU three dots per cycle
    /// consumed. Returns the CPU cycles spent, OAMDMA stalls included.
    pub fn step_instruction(&mut self) -> u32 {
        let mut cycles = 0u32;
        if self.bus.ppu.take_nmi() {
            self.cpu.trigger_nmi();
            cycles += u32::from(self.cpu.service_pending_nmi(&mut self.bus).unwrap_or(0));
        }
        if let Some(sink) = &mut self.trace_sink {
            let line = trace_line(&self.cpu, &self.bus);
            // A full trace pipe shouldn't stop the emulator.
            let _ = writeln!(sink, "{}", line);
        }
        cycles += u32::from(self.cpu.step(&mut self.bus));
        if let Some(page) = self.bus.dma_page.take() {
            cycles += self.run_oam_dma(page);
        }
        for _ in 0..cycles * PPU_DOTS_PER_CPU_CYCLE {
            self.bus.ppu.tick();
        }
        if let Some(index) = self.bus.ppu.take_frame() {
            self.push_frame(Frame { index });
        }
        self.instructions += 1;
        cycles
    }

    /// Copy 256 bytes from CPU page `page` into OAM. The CPU is stalled
    /// for 513 cycles, or 514 when the DMA begins on an odd cycle.
    fn run_oam_dma(&mut self, page: u8) -> u32 {
        let base = u16::from(page) << 8;
        for offset in 0..256u16 {
            let value = self.bus.read(base + offset);
            self.bus.ppu.write_oam_byte(value);
        }
        let stolen = if self.cpu.state.tot_cycles % 2 == 1 {
            514
        } else {
            513
        };
        debug!(page, stolen, "OAMDMA transfer");
        self.cpu.state.tot_cycles += stolen;
        stolen as u32
    }

    fn push_frame(&mut self, frame: Frame) {
        let disconnected = match &self.frame_tx {
            None => return,
            // A full channel means a slow consumer; the frame is dropped
            // silently either way.
            Some(tx) => matches!(tx.try_send(frame), Err(TrySendError::Disconnected(_))),
        };
        if disconnected {
            self.frame_tx = None;
        }
    }
}
