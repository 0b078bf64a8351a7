use std::{error::Error, fmt};

/// Fatal conditions. Once the interpreter hits one of these while executing
/// it halts and keeps reporting the same error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chip8Error {
    /// Builder was not given a ROM
    MissingRom,
    /// ROM does not fit between 0x200 and the end of memory
    ProgramTooLarge { len: usize },
    /// Custom font sprite is not 16 glyphs of 5 bytes
    InvalidFont { len: usize },
    /// Opcode matches no instruction family or sub-family
    InvalidOpcode { opcode: u16, pc: u16 },
    /// 00EE with an empty call stack
    StackUnderflow { pc: u16 },
    /// 2NNN with a full call stack
    StackOverflow { pc: u16 },
}

impl fmt::Display for Chip8Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chip8Error::MissingRom => write!(f, "a ROM must be provided"),
            Chip8Error::ProgramTooLarge { len } => write!(
                f,
                "ROM of {} bytes does not fit in memory (max {} bytes)",
                len,
                crate::chip8::MAX_PROGRAM_SIZE
            ),
            Chip8Error::InvalidFont { len } => {
                write!(f, "font sprite must be 80 bytes, got {}", len)
            }
            Chip8Error::InvalidOpcode { opcode, pc } => {
                write!(f, "invalid instruction 0x{:04x} at 0x{:04x}", opcode, pc)
            }
            Chip8Error::StackUnderflow { pc } => {
                write!(f, "return with empty stack at 0x{:04x}", pc)
            }
            Chip8Error::StackOverflow { pc } => {
                write!(f, "call with full stack at 0x{:04x}", pc)
            }
        }
    }
}

impl Error for Chip8Error {}
