use std::fmt;

use crate::decode::{OpCodes, INSTRUCTION_SIZE};
use crate::error::Chip8Error;
use crate::memory::{TypeAddr, MAX_PROGRAM_SIZE, PROGRAM_START};

impl fmt::Display for OpCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            OpCodes::Sys(addr) => write!(f, "SYS {addr:#05X}"),
            OpCodes::ClearScreen => write!(f, "CLS"),
            OpCodes::PopSubroutine => write!(f, "RET"),
            OpCodes::Jump(addr) => write!(f, "JP {addr:#05X}"),
            OpCodes::PushSubroutine(addr) => write!(f, "CALL {addr:#05X}"),
            OpCodes::SkipEqualConstant(x, kk) => write!(f, "SE V{x:X}, {kk:#04X}"),
            OpCodes::SkipNotEqualConstant(x, kk) => write!(f, "SNE V{x:X}, {kk:#04X}"),
            OpCodes::SkipEqualRegister(x, y) => write!(f, "SE V{x:X}, V{y:X}"),
            OpCodes::SkipNotEqualRegister(x, y) => write!(f, "SNE V{x:X}, V{y:X}"),
            OpCodes::SetRegister(x, kk) => write!(f, "LD V{x:X}, {kk:#04X}"),
            OpCodes::AddToRegister(x, kk) => write!(f, "ADD V{x:X}, {kk:#04X}"),
            OpCodes::CopyRegister(x, y) => write!(f, "LD V{x:X}, V{y:X}"),
            OpCodes::Or(x, y) => write!(f, "OR V{x:X}, V{y:X}"),
            OpCodes::And(x, y) => write!(f, "AND V{x:X}, V{y:X}"),
            OpCodes::XOr(x, y) => write!(f, "XOR V{x:X}, V{y:X}"),
            OpCodes::Add(x, y) => write!(f, "ADD V{x:X}, V{y:X}"),
            OpCodes::SubtractForward(x, y) => write!(f, "SUB V{x:X}, V{y:X}"),
            OpCodes::RightShift(x, y) => write!(f, "SHR V{x:X}, V{y:X}"),
            OpCodes::SubtractBackward(x, y) => write!(f, "SUBN V{x:X}, V{y:X}"),
            OpCodes::LeftShift(x, y) => write!(f, "SHL V{x:X}, V{y:X}"),
            OpCodes::SetIndexRegister(addr) => write!(f, "LD I, {addr:#05X}"),
            OpCodes::JumpWithOffset(addr) => write!(f, "JP V0, {addr:#05X}"),
            OpCodes::Random(x, kk) => write!(f, "RND V{x:X}, {kk:#04X}"),
            OpCodes::Display(x, y, n) => write!(f, "DRW V{x:X}, V{y:X}, {n}"),
            OpCodes::SkipIfPressed(x) => write!(f, "SKP V{x:X}"),
            OpCodes::SkipIfNotPressed(x) => write!(f, "SKNP V{x:X}"),
            OpCodes::CopyDelayToRegister(x) => write!(f, "LD V{x:X}, DT"),
            OpCodes::GetKey(x) => write!(f, "LD V{x:X}, K"),
            OpCodes::CopyRegisterToDelay(x) => write!(f, "LD DT, V{x:X}"),
            OpCodes::CopyRegisterToSound(x) => write!(f, "LD ST, V{x:X}"),
            OpCodes::AddToIndex(x) => write!(f, "ADD I, V{x:X}"),
            OpCodes::PointChar(x) => write!(f, "LD F, V{x:X}"),
            OpCodes::ToDecimal(x) => write!(f, "LD B, V{x:X}"),
            OpCodes::StoreRegisterToMemory(x) => write!(f, "LD [I], V{x:X}"),
            OpCodes::LoadRegisterFromMemory(x) => write!(f, "LD V{x:X}, [I]"),
        }
    }
}

/// What a listing line holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    Instruction(OpCodes),
    /// A word that does not decode, most likely sprite or table data.
    Data(u16),
    /// Odd byte left over at the end of the image.
    Byte(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub addr: TypeAddr,
    pub item: Item,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.item {
            Item::Instruction(op) => write!(f, "{:03X}: {}", self.addr, op),
            Item::Data(word) => write!(f, "{:03X}: DW {word:#06X}", self.addr),
            Item::Byte(byte) => write!(f, "{:03X}: DB {byte:#04X}", self.addr),
        }
    }
}

/// Lists `program` as if loaded at 0x200, one line per word.
///
/// Code and data are not told apart; every aligned word that decodes is shown as
/// an instruction. Images that would not fit in memory are refused.
pub fn disassemble(program: &[u8]) -> Result<Vec<Line>, Chip8Error> {
    if program.len() > MAX_PROGRAM_SIZE {
        return Err(Chip8Error::RomTooLarge {
            size: program.len(),
            max_size: MAX_PROGRAM_SIZE,
        });
    }

    let words = program.chunks_exact(INSTRUCTION_SIZE as usize);
    let tail = words.remainder();
    let lines = words
        .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
        .map(|word| match OpCodes::decode_raw(word) {
            Ok(op) => Item::Instruction(op),
            Err(_) => Item::Data(word),
        })
        .chain(tail.iter().map(|byte| Item::Byte(*byte)))
        .enumerate()
        .map(|(i, item)| Line {
            addr: PROGRAM_START + (i as u16) * INSTRUCTION_SIZE,
            item,
        })
        .collect();
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonics() {
        let cases = [
            (0x00E0, "CLS"),
            (0x00EE, "RET"),
            (0x0123, "SYS 0x123"),
            (0x1ABC, "JP 0xABC"),
            (0x2204, "CALL 0x204"),
            (0x3A12, "SE VA, 0x12"),
            (0x9AB0, "SNE VA, VB"),
            (0x6001, "LD V0, 0x01"),
            (0x8AB6, "SHR VA, VB"),
            (0x8ABE, "SHL VA, VB"),
            (0x8AB7, "SUBN VA, VB"),
            (0xA2F0, "LD I, 0x2F0"),
            (0xB300, "JP V0, 0x300"),
            (0xC0FF, "RND V0, 0xFF"),
            (0xD125, "DRW V1, V2, 5"),
            (0xE19E, "SKP V1"),
            (0xE1A1, "SKNP V1"),
            (0xF30A, "LD V3, K"),
            (0xF318, "LD ST, V3"),
            (0xF329, "LD F, V3"),
            (0xF333, "LD B, V3"),
            (0xF355, "LD [I], V3"),
            (0xF365, "LD V3, [I]"),
        ];
        for (word, text) in cases {
            let op = OpCodes::decode_raw(word).unwrap();
            assert_eq!(op.to_string(), text);
        }
    }

    #[test]
    fn test_listing() {
        let program = [0x00, 0xE0, 0xA2, 0x2A, 0xFF, 0xFF, 0x12, 0x00, 0xF0];
        let listing: Vec<String> = disassemble(&program)
            .unwrap()
            .iter()
            .map(|line| line.to_string())
            .collect();
        assert_eq!(
            listing,
            [
                "200: CLS",
                "202: LD I, 0x22A",
                "204: DW 0xFFFF",
                "206: JP 0x200",
                "208: DB 0xF0",
            ]
        );
    }

    #[test]
    fn test_empty_listing() {
        assert_eq!(disassemble(&[]), Ok(vec![]));
    }

    #[test]
    fn test_oversized_image_is_refused() {
        assert_eq!(
            disassemble(&vec![0; 70_000]),
            Err(Chip8Error::RomTooLarge {
                size: 70_000,
                max_size: MAX_PROGRAM_SIZE
            })
        );

        // a full-size image lists up to the last word of memory
        let listing = disassemble(&vec![0; MAX_PROGRAM_SIZE]).unwrap();
        assert_eq!(listing.len(), MAX_PROGRAM_SIZE / 2);
        assert_eq!(listing.last().map(|line| line.addr), Some(0xFFE));
    }
}
