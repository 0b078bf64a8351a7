// Opcode decoding
//
// An instruction word is split into its nibble fields first (`Opcode`), which
// never fails, and then matched into a typed `Instruction`, which fails for
// words that are not part of the CHIP-8 instruction set.

use std::fmt;

use crate::error::Chip8Error;

/// Nibble fields of a 16 bit big endian instruction word
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Opcode {
    /// Raw instruction word
    pub word: u16,
    /// Bits 12-15, the instruction family
    pub nib3: u8,
    /// Bits 8-11, register X
    pub nib2: u8,
    /// Bits 4-7, register Y
    pub nib1: u8,
    /// Bits 0-3
    pub nib0: u8,
    /// Bits 0-7
    pub low_byte: u8,
    /// Bits 0-11
    pub addr12: u16,
}

impl Opcode {
    pub const fn new(word: u16) -> Opcode {
        Opcode {
            word,
            nib3: ((word & 0xF000) >> 12) as u8,
            nib2: ((word & 0x0F00) >> 8) as u8,
            nib1: ((word & 0x00F0) >> 4) as u8,
            nib0: (word & 0x000F) as u8,
            low_byte: (word & 0x00FF) as u8,
            addr12: word & 0x0FFF,
        }
    }

    pub const fn from_be_bytes(bytes: [u8; 2]) -> Opcode {
        Opcode::new(u16::from_be_bytes(bytes))
    }

    pub fn x(&self) -> usize {
        self.nib2 as usize
    }

    pub fn y(&self) -> usize {
        self.nib1 as usize
    }
}

/// A decoded CHIP-8 instruction. `x`/`y` are register indices.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 0NNN: machine code routine, ignored
    Sys(u16),
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XKK
    SkipEqImm { x: usize, kk: u8 },
    /// 4XKK
    SkipNeqImm { x: usize, kk: u8 },
    /// 5XY0
    SkipEqReg { x: usize, y: usize },
    /// 6XKK
    SetImm { x: usize, kk: u8 },
    /// 7XKK
    AddImm { x: usize, kk: u8 },
    /// 8XY0
    SetReg { x: usize, y: usize },
    /// 8XY1
    Or { x: usize, y: usize },
    /// 8XY2
    And { x: usize, y: usize },
    /// 8XY3
    Xor { x: usize, y: usize },
    /// 8XY4
    AddReg { x: usize, y: usize },
    /// 8XY5
    SubXY { x: usize, y: usize },
    /// 8XY6
    ShiftRight { x: usize, y: usize },
    /// 8XY7
    SubYX { x: usize, y: usize },
    /// 8XYE
    ShiftLeft { x: usize, y: usize },
    /// 9XY0
    SkipNeqReg { x: usize, y: usize },
    /// ANNN
    SetIndex(u16),
    /// BNNN, `x` is only used when the legacy jump quirk is off
    JumpOffset { x: usize, nnn: u16 },
    /// CXKK
    Random { x: usize, kk: u8 },
    /// DXYN
    Draw { x: usize, y: usize, n: u8 },
    /// EX9E
    SkipKeyDown { x: usize },
    /// EXA1
    SkipKeyUp { x: usize },
    /// FX07
    GetDelay { x: usize },
    /// FX0A
    WaitKey { x: usize },
    /// FX15
    SetDelay { x: usize },
    /// FX18
    SetSound { x: usize },
    /// FX1E
    AddIndex { x: usize },
    /// FX29
    FontGlyph { x: usize },
    /// FX33
    Bcd { x: usize },
    /// FX55
    Store { x: usize },
    /// FX65
    Load { x: usize },
}

impl Instruction {
    /// Map an opcode onto an instruction. `pc` is only used for the error.
    pub fn decode(op: Opcode, pc: u16) -> Result<Instruction, Chip8Error> {
        let (x, y, kk, nnn) = (op.x(), op.y(), op.low_byte, op.addr12);

        let inst = match (op.nib3, op.nib2, op.nib1, op.nib0) {
            (0x0, 0x0, 0xE, 0x0) => Instruction::ClearScreen,
            (0x0, 0x0, 0xE, 0xE) => Instruction::Return,
            (0x0, _, _, _) => Instruction::Sys(nnn),
            (0x1, _, _, _) => Instruction::Jump(nnn),
            (0x2, _, _, _) => Instruction::Call(nnn),
            (0x3, _, _, _) => Instruction::SkipEqImm { x, kk },
            (0x4, _, _, _) => Instruction::SkipNeqImm { x, kk },
            (0x5, _, _, 0x0) => Instruction::SkipEqReg { x, y },
            (0x6, _, _, _) => Instruction::SetImm { x, kk },
            (0x7, _, _, _) => Instruction::AddImm { x, kk },
            (0x8, _, _, 0x0) => Instruction::SetReg { x, y },
            (0x8, _, _, 0x1) => Instruction::Or { x, y },
            (0x8, _, _, 0x2) => Instruction::And { x, y },
            (0x8, _, _, 0x3) => Instruction::Xor { x, y },
            (0x8, _, _, 0x4) => Instruction::AddReg { x, y },
            (0x8, _, _, 0x5) => Instruction::SubXY { x, y },
            (0x8, _, _, 0x6) => Instruction::ShiftRight { x, y },
            (0x8, _, _, 0x7) => Instruction::SubYX { x, y },
            (0x8, _, _, 0xE) => Instruction::ShiftLeft { x, y },
            (0x9, _, _, 0x0) => Instruction::SkipNeqReg { x, y },
            (0xA, _, _, _) => Instruction::SetIndex(nnn),
            (0xB, _, _, _) => Instruction::JumpOffset { x, nnn },
            (0xC, _, _, _) => Instruction::Random { x, kk },
            (0xD, _, _, _) => Instruction::Draw { x, y, n: op.nib0 },
            (0xE, _, 0x9, 0xE) => Instruction::SkipKeyDown { x },
            (0xE, _, 0xA, 0x1) => Instruction::SkipKeyUp { x },
            (0xF, _, 0x0, 0x7) => Instruction::GetDelay { x },
            (0xF, _, 0x0, 0xA) => Instruction::WaitKey { x },
            (0xF, _, 0x1, 0x5) => Instruction::SetDelay { x },
            (0xF, _, 0x1, 0x8) => Instruction::SetSound { x },
            (0xF, _, 0x1, 0xE) => Instruction::AddIndex { x },
            (0xF, _, 0x2, 0x9) => Instruction::FontGlyph { x },
            (0xF, _, 0x3, 0x3) => Instruction::Bcd { x },
            (0xF, _, 0x5, 0x5) => Instruction::Store { x },
            (0xF, _, 0x6, 0x5) => Instruction::Load { x },
            _ => {
                return Err(Chip8Error::InvalidOpcode {
                    opcode: op.word,
                    pc,
                })
            }
        };

        Ok(inst)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::ClearScreen => write!(f, "CLS"),
            Instruction::Return => write!(f, "RET"),
            Instruction::Sys(nnn) => write!(f, "SYS 0x{:03x}", nnn),
            Instruction::Jump(nnn) => write!(f, "JP 0x{:03x}", nnn),
            Instruction::Call(nnn) => write!(f, "CALL 0x{:03x}", nnn),
            Instruction::SkipEqImm { x, kk } => write!(f, "SE V{:X}, 0x{:02x}", x, kk),
            Instruction::SkipNeqImm { x, kk } => write!(f, "SNE V{:X}, 0x{:02x}", x, kk),
            Instruction::SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::SetImm { x, kk } => write!(f, "LD V{:X}, 0x{:02x}", x, kk),
            Instruction::AddImm { x, kk } => write!(f, "ADD V{:X}, 0x{:02x}", x, kk),
            Instruction::SetReg { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Instruction::Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            Instruction::And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Instruction::Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Instruction::AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Instruction::SubXY { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            Instruction::ShiftRight { x, y } => write!(f, "SHR V{:X}, V{:X}", x, y),
            Instruction::SubYX { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Instruction::ShiftLeft { x, y } => write!(f, "SHL V{:X}, V{:X}", x, y),
            Instruction::SkipNeqReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Instruction::SetIndex(nnn) => write!(f, "LD I, 0x{:03x}", nnn),
            Instruction::JumpOffset { nnn, .. } => write!(f, "JP V0, 0x{:03x}", nnn),
            Instruction::Random { x, kk } => write!(f, "RND V{:X}, 0x{:02x}", x, kk),
            Instruction::Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Instruction::SkipKeyDown { x } => write!(f, "SKP V{:X}", x),
            Instruction::SkipKeyUp { x } => write!(f, "SKNP V{:X}", x),
            Instruction::GetDelay { x } => write!(f, "LD V{:X}, DT", x),
            Instruction::WaitKey { x } => write!(f, "LD V{:X}, K", x),
            Instruction::SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            Instruction::SetSound { x } => write!(f, "LD ST, V{:X}", x),
            Instruction::AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            Instruction::FontGlyph { x } => write!(f, "LD F, V{:X}", x),
            Instruction::Bcd { x } => write!(f, "LD B, V{:X}", x),
            Instruction::Store { x } => write!(f, "LD [I], V{:X}", x),
            Instruction::Load { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(word: u16) -> Result<Instruction, Chip8Error> {
        Instruction::decode(Opcode::new(word), 0x200)
    }

    #[test]
    fn test_opcode_fields() {
        let op = Opcode::new(0xD12A);

        assert_eq!(op.nib3, 0xD);
        assert_eq!(op.nib2, 0x1);
        assert_eq!(op.nib1, 0x2);
        assert_eq!(op.nib0, 0xA);
        assert_eq!(op.low_byte, 0x2A);
        assert_eq!(op.addr12, 0x12A);
        assert_eq!(Opcode::from_be_bytes([0xD1, 0x2A]), op);
    }

    #[test]
    fn test_decode_families() {
        assert_eq!(decode(0x00E0), Ok(Instruction::ClearScreen));
        assert_eq!(decode(0x00EE), Ok(Instruction::Return));
        assert_eq!(decode(0x1ABC), Ok(Instruction::Jump(0xABC)));
        assert_eq!(decode(0x2204), Ok(Instruction::Call(0x204)));
        assert_eq!(decode(0x8AB4), Ok(Instruction::AddReg { x: 0xA, y: 0xB }));
        assert_eq!(decode(0x8ABE), Ok(Instruction::ShiftLeft { x: 0xA, y: 0xB }));
        assert_eq!(decode(0xB2F0), Ok(Instruction::JumpOffset { x: 0x2, nnn: 0x2F0 }));
        assert_eq!(decode(0xD015), Ok(Instruction::Draw { x: 0, y: 1, n: 5 }));
        assert_eq!(decode(0xE39E), Ok(Instruction::SkipKeyDown { x: 3 }));
        assert_eq!(decode(0xE3A1), Ok(Instruction::SkipKeyUp { x: 3 }));
        assert_eq!(decode(0xF40A), Ok(Instruction::WaitKey { x: 4 }));
        assert_eq!(decode(0xF265), Ok(Instruction::Load { x: 2 }));
    }

    #[test]
    fn test_decode_sys_is_not_fatal() {
        assert_eq!(decode(0x0123), Ok(Instruction::Sys(0x123)));
        assert_eq!(decode(0x0000), Ok(Instruction::Sys(0x000)));
    }

    #[test]
    fn test_decode_invalid_sub_opcodes() {
        for word in [0x5121, 0x912F, 0x8128, 0x812F, 0xE19F, 0xF100, 0xF1FF] {
            assert_eq!(
                decode(word),
                Err(Chip8Error::InvalidOpcode {
                    opcode: word,
                    pc: 0x200
                }),
                "0x{:04x} should not decode",
                word
            );
        }
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(decode(0x00E0).unwrap().to_string(), "CLS");
        assert_eq!(decode(0x6A0F).unwrap().to_string(), "LD VA, 0x0f");
        assert_eq!(decode(0xF155).unwrap().to_string(), "LD [I], V1");
    }
}
