// CHIP-8 interpreter
//
// Useful links:
// * [Guide to making a CHIP-8 emulator](https://tobiasvl.github.io/blog/write-a-chip-8-emulator/)
// * [Cowgod's Chip-8 Technical Reference](http://devernay.free.fr/hacks/chip8/C8TECH10.HTM)
// * [CHIP-8 quirks test ROM](https://github.com/Timendus/chip8-test-suite)
//

use std::time::Instant;

use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::{
    decode::{Instruction, Opcode},
    display::{Display, SCREEN_HEIGHT, SCREEN_WIDTH},
    error::Chip8Error,
    keypad::{ExecState, Keys},
    timer::Timers,
};

const MEMORY_SIZE: usize = 0x1000;
const ADDRESS_MASK: u16 = 0x0FFF;
const FONT_GLYPH_SIZE: u16 = 5;

pub const PROGRAM_START: u16 = 0x200;
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const STACK_DEPTH: usize = 16;

pub static DEFAULT_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Chip8Mode {
    COSMAC_VIP,
    CHIP_48,
}

/// Interpreter behaviours that differ between historical CHIP-8 implementations
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Quirks {
    /// Bitwise shift (8XY6 and 8XYE): if true VY is shifted into VX (COSMAC VIP),
    /// otherwise VX is shifted in place
    pub legacy_shift: bool,
    /// Jump with offset (BNNN): if true jump to NNN plus V0 (COSMAC VIP),
    /// otherwise jump to NNN plus VX where X is the high nibble of NNN
    pub legacy_jump: bool,
    /// Store and load memory (FX55/FX65): if true I is left pointing past the
    /// last register transferred (COSMAC VIP)
    pub legacy_memory_increment: bool,
}

impl Quirks {
    pub const fn for_mode(mode: Chip8Mode) -> Quirks {
        match mode {
            Chip8Mode::COSMAC_VIP => Quirks {
                legacy_shift: true,
                legacy_jump: true,
                legacy_memory_increment: true,
            },
            Chip8Mode::CHIP_48 => Quirks {
                legacy_shift: false,
                legacy_jump: false,
                legacy_memory_increment: false,
            },
        }
    }
}

impl Default for Quirks {
    fn default() -> Self {
        Quirks::for_mode(Chip8Mode::COSMAC_VIP)
    }
}

#[derive(Debug, Default)]
pub struct Chip8Builder {
    /// ROM
    rom: Option<Vec<u8>>,
    /// Font sprite
    font: Option<Vec<u8>>,
    /// PRNG Seed
    rng_seed: Option<u64>,
    /// Start of the first timer period
    clock_start: Option<Instant>,
    quirks: Quirks,
    /// Log every executed instruction at debug level
    debug: bool,
}

pub struct Chip8 {
    /// General purpose registers, VF doubles as the flag register
    regs: [u8; 16],
    /// Index register
    index: u16,
    /// Program counter
    pc: u16,
    /// Call stack of return addresses
    stack: Vec<u16>,
    /// Delay and sound timers
    timers: Timers,
    /// Memory
    memory: Vec<u8>,
    /// Display
    display: Display,
    /// Running or parked on FX0A
    state: ExecState,
    quirks: Quirks,
    debug: bool,
    /// PRNG Generator
    rng: StdRng,
    /// Fatal error that stopped the machine
    halt: Option<Chip8Error>,
}

impl Chip8Builder {
    pub fn new() -> Chip8Builder {
        Chip8Builder::default()
    }

    pub fn with_rom(mut self, rom: Vec<u8>) -> Self {
        self.rom = Some(rom);
        self
    }

    pub fn with_font(mut self, font: Vec<u8>) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_clock_start(mut self, start: Instant) -> Self {
        self.clock_start = Some(start);
        self
    }

    pub fn with_mode(mut self, mode: Chip8Mode) -> Self {
        self.quirks = Quirks::for_mode(mode);
        self
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn build(&self) -> Result<Chip8, Chip8Error> {
        let rom = self.rom.as_ref().ok_or(Chip8Error::MissingRom)?;
        if rom.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::ProgramTooLarge { len: rom.len() });
        }

        let font = match &self.font {
            Some(font) => &font[..],
            None => &DEFAULT_FONT[..],
        };
        if font.len() != DEFAULT_FONT.len() {
            return Err(Chip8Error::InvalidFont { len: font.len() });
        }

        let mut memory = vec![0u8; MEMORY_SIZE];
        memory[..font.len()].copy_from_slice(font);

        let start = PROGRAM_START as usize;
        memory[start..start + rom.len()].copy_from_slice(&rom[..]);

        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        log::debug!(
            "loaded {} byte ROM, quirks: {:?}",
            rom.len(),
            self.quirks
        );

        Ok(Chip8 {
            regs: [0u8; 16],
            index: 0,
            pc: PROGRAM_START,
            stack: Vec::with_capacity(STACK_DEPTH),
            timers: Timers::new(self.clock_start.unwrap_or_else(Instant::now)),
            memory,
            display: Display::new(),
            state: ExecState::Running,
            quirks: self.quirks,
            debug: self.debug,
            rng,
            halt: None,
        })
    }
}

impl Chip8 {
    /// Load `program` at 0x200 with the given quirks
    pub fn new(
        program: &[u8],
        legacy_shift: bool,
        legacy_jump: bool,
        legacy_memory_increment: bool,
    ) -> Result<Chip8, Chip8Error> {
        Chip8Builder::new()
            .with_rom(program.to_vec())
            .with_quirks(Quirks {
                legacy_shift,
                legacy_jump,
                legacy_memory_increment,
            })
            .build()
    }

    /// Advance the machine by one step.
    ///
    /// Timers are caught up to `now` first. Then either a pending key wait is
    /// resolved against `keys` or exactly one instruction is executed. After a
    /// fatal error the machine stays halted and every call returns that error.
    pub fn tick(&mut self, keys: Keys, now: Instant) -> Result<(), Chip8Error> {
        if let Some(err) = &self.halt {
            return Err(err.clone());
        }

        self.timers.catch_up(now);

        if self.is_waiting_for_key() {
            if let Some((reg, key)) = self.state.resolve(keys) {
                log::debug!("key 0x{:x} pressed, stored in V{:X}", key, reg);
                self.regs[reg] = key;
            }
            return Ok(());
        }

        self.step(keys).map_err(|err| {
            log::warn!("halting: {}", err);
            self.halt = Some(err.clone());
            err
        })
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut Display {
        &mut self.display
    }

    pub fn sound_active(&self) -> bool {
        self.timers.sound_active()
    }

    pub fn is_waiting_for_key(&self) -> bool {
        matches!(self.state, ExecState::WaitingForKey { .. })
    }

    pub fn halted(&self) -> Option<&Chip8Error> {
        self.halt.as_ref()
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.regs
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay
    }

    pub fn sound_timer(&self) -> u8 {
        self.timers.sound
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    fn step(&mut self, keys: Keys) -> Result<(), Chip8Error> {
        let pc = self.pc;
        let op = Opcode::from_be_bytes(self.read_u16_be(pc));
        self.pc = pc.wrapping_add(2);

        let inst = Instruction::decode(op, pc)?;
        if self.debug {
            log::debug!("0x{:04x}: {:04x} {}", pc, op.word, inst);
        } else {
            log::trace!("0x{:04x}: {:04x} {}", pc, op.word, inst);
        }

        self.execute(inst, pc, keys)
    }

    fn execute(&mut self, inst: Instruction, pc: u16, keys: Keys) -> Result<(), Chip8Error> {
        match inst {
            Instruction::ClearScreen => self.display.clear(),
            Instruction::Return => {
                self.pc = self.stack.pop().ok_or(Chip8Error::StackUnderflow { pc })?;
            }
            Instruction::Sys(nnn) => {
                log::debug!("ignoring SYS 0x{:03x} at 0x{:04x}", nnn, pc);
            }
            Instruction::Jump(nnn) => self.pc = nnn,
            Instruction::Call(nnn) => {
                if self.stack.len() >= STACK_DEPTH {
                    return Err(Chip8Error::StackOverflow { pc });
                }
                self.stack.push(self.pc);
                self.pc = nnn;
            }
            Instruction::SkipEqImm { x, kk } => self.skip_if(self.regs[x] == kk),
            Instruction::SkipNeqImm { x, kk } => self.skip_if(self.regs[x] != kk),
            Instruction::SkipEqReg { x, y } => self.skip_if(self.regs[x] == self.regs[y]),
            Instruction::SetImm { x, kk } => self.regs[x] = kk,
            Instruction::AddImm { x, kk } => self.regs[x] = self.regs[x].wrapping_add(kk),
            Instruction::SetReg { x, y } => self.regs[x] = self.regs[y],
            Instruction::Or { x, y } => self.regs[x] |= self.regs[y],
            Instruction::And { x, y } => self.regs[x] &= self.regs[y],
            Instruction::Xor { x, y } => self.regs[x] ^= self.regs[y],
            Instruction::AddReg { x, y } => {
                let (res, carry) = self.regs[x].overflowing_add(self.regs[y]);
                self.set_with_flag(x, res, carry);
            }
            Instruction::SubXY { x, y } => {
                let (res, borrow) = self.regs[x].overflowing_sub(self.regs[y]);
                self.set_with_flag(x, res, !borrow);
            }
            Instruction::ShiftRight { x, y } => {
                let src = self.shift_source(x, y);
                self.set_with_flag(x, src >> 1, src & 0x01 != 0);
            }
            Instruction::SubYX { x, y } => {
                let (res, borrow) = self.regs[y].overflowing_sub(self.regs[x]);
                self.set_with_flag(x, res, !borrow);
            }
            Instruction::ShiftLeft { x, y } => {
                let src = self.shift_source(x, y);
                self.set_with_flag(x, src << 1, src & 0x80 != 0);
            }
            Instruction::SkipNeqReg { x, y } => self.skip_if(self.regs[x] != self.regs[y]),
            Instruction::SetIndex(nnn) => self.index = nnn,
            Instruction::JumpOffset { x, nnn } => {
                let offset = if self.quirks.legacy_jump {
                    self.regs[0]
                } else {
                    self.regs[x]
                };
                self.pc = nnn + offset as u16;
            }
            Instruction::Random { x, kk } => {
                let n = self.rng.next_u32() as u8;
                self.regs[x] = n & kk;
            }
            Instruction::Draw { x, y, n } => self.draw_sprite(x, y, n),
            Instruction::SkipKeyDown { x } => self.skip_if(keys.is_down(self.regs[x])),
            Instruction::SkipKeyUp { x } => self.skip_if(!keys.is_down(self.regs[x])),
            Instruction::GetDelay { x } => self.regs[x] = self.timers.delay,
            Instruction::WaitKey { x } => {
                log::debug!("waiting for key press into V{:X}", x);
                self.state = ExecState::WaitingForKey { register: x };
            }
            Instruction::SetDelay { x } => self.timers.delay = self.regs[x],
            Instruction::SetSound { x } => self.timers.sound = self.regs[x],
            Instruction::AddIndex { x } => {
                self.index = self.index.wrapping_add(self.regs[x] as u16);
            }
            Instruction::FontGlyph { x } => {
                self.index = self.regs[x] as u16 * FONT_GLYPH_SIZE;
            }
            Instruction::Bcd { x } => {
                let value = self.regs[x];
                self.write_u8(self.index, value / 100);
                self.write_u8(self.index.wrapping_add(1), (value / 10) % 10);
                self.write_u8(self.index.wrapping_add(2), value % 10);
            }
            Instruction::Store { x } => {
                for i in 0..=x {
                    let addr = self.index.wrapping_add(i as u16);
                    self.write_u8(addr, self.regs[i]);
                }
                self.advance_index_after_transfer(x);
            }
            Instruction::Load { x } => {
                for i in 0..=x {
                    let addr = self.index.wrapping_add(i as u16);
                    self.regs[i] = self.read_u8(addr);
                }
                self.advance_index_after_transfer(x);
            }
        }

        Ok(())
    }

    /// Draw an 8xN sprite from memory at I. The origin wraps around the
    /// screen, pixels running off the right or bottom edge are clipped.
    fn draw_sprite(&mut self, x: usize, y: usize, n: u8) {
        let ox = self.regs[x] as usize % SCREEN_WIDTH;
        let oy = self.regs[y] as usize % SCREEN_HEIGHT;

        let mut erased = false;
        for row in 0..n as usize {
            let data = self.read_u8(self.index.wrapping_add(row as u16));
            for column in 0..8 {
                let bit = data & (0x80 >> column) != 0;
                erased |= self.display.write(ox + column, oy + row, bit);
            }
        }

        self.regs[0xF] = erased as u8;
    }

    fn shift_source(&self, x: usize, y: usize) -> u8 {
        if self.quirks.legacy_shift {
            self.regs[y]
        } else {
            self.regs[x]
        }
    }

    /// VF is written after VX so the flag survives when X is F
    fn set_with_flag(&mut self, x: usize, value: u8, flag: bool) {
        self.regs[x] = value;
        self.regs[0xF] = flag as u8;
    }

    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    fn advance_index_after_transfer(&mut self, x: usize) {
        if self.quirks.legacy_memory_increment {
            self.index = self.index.wrapping_add(x as u16 + 1);
        }
    }

    fn read_u8(&self, addr: u16) -> u8 {
        self.memory[(addr & ADDRESS_MASK) as usize]
    }

    fn read_u16_be(&self, addr: u16) -> [u8; 2] {
        [self.read_u8(addr), self.read_u8(addr.wrapping_add(1))]
    }

    fn write_u8(&mut self, addr: u16, data: u8) {
        self.memory[(addr & ADDRESS_MASK) as usize] = data;
    }
}
