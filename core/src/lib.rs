//! CHIP-8 interpreter core
//!
//! The machine is driven by [`Chip8::tick`]: every call catches the 60 Hz
//! timers up to the given instant and then either resolves a pending key wait
//! or executes exactly one instruction. Rendering, audio and input live
//! outside this crate and talk to it through [`Chip8::display`],
//! [`Chip8::sound_active`] and [`Keys`].

mod chip8;
mod color;
mod decode;
mod display;
mod error;
mod keypad;
mod timer;

pub use chip8::{
    Chip8, Chip8Builder, Chip8Mode, Quirks, DEFAULT_FONT, MAX_PROGRAM_SIZE, PROGRAM_START,
    STACK_DEPTH,
};
pub use color::{
    Chip8Color, Chip8ColorParseError, DEFAULT_BACKGROUND_COLOR, DEFAULT_FOREGROUND_COLOR,
};
pub use decode::{Instruction, Opcode};
pub use display::{Display, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use error::Chip8Error;
pub use keypad::{ExecState, Keys};
pub use timer::{Timers, TIMER_PERIOD};
