use crate::opcode::{OpcodeTable, Operation, RECOVERED};
use serde::Serialize;

/// Bias subtracted from Bx to get the signed sBx operand.
pub const MAXARG_SBX: i32 = 131071;

/// Set on a B/C operand when it indexes the constant pool instead of a register.
pub const BITRK: u16 = 0x100;

const SIZE_OP: u32 = 6;
const SIZE_A: u32 = 8;
const SIZE_C: u32 = 9;
const SIZE_B: u32 = 9;

const POS_A: u32 = SIZE_OP;
const POS_C: u32 = POS_A + SIZE_A;
const POS_B: u32 = POS_C + SIZE_C;
const POS_BX: u32 = POS_C;

const MASK_OP: u32 = (1 << SIZE_OP) - 1;
const MASK_A: u32 = (1 << SIZE_A) - 1;
const MASK_C: u32 = (1 << SIZE_C) - 1;
const MASK_B: u32 = (1 << SIZE_B) - 1;
const MASK_BX: u32 = (1 << (SIZE_B + SIZE_C)) - 1;

/// A decoded 32-bit instruction word.
///
/// Every field is extracted regardless of the operation's operand mode, so callers
/// pick whichever view (B/C, Bx or sBx) the operation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub raw: u32,
    pub opcode: u8,
    pub op: Operation,
    pub a: u8,
    pub b: u16,
    pub c: u16,
    pub bx: u32,
    pub sbx: i32,
}

impl Instruction {
    pub fn decode(word: u32, table: &OpcodeTable) -> Self {
        let opcode = (word & MASK_OP) as u8;
        let bx = (word >> POS_BX) & MASK_BX;
        Self {
            raw: word,
            opcode,
            op: table.lookup(opcode),
            a: ((word >> POS_A) & MASK_A) as u8,
            b: ((word >> POS_B) & MASK_B) as u16,
            c: ((word >> POS_C) & MASK_C) as u16,
            bx,
            sbx: bx as i32 - MAXARG_SBX,
        }
    }
}

/// Decode with the recovered opcode table.
pub fn decode(word: u32) -> Instruction {
    Instruction::decode(word, &RECOVERED)
}

/// Whether an RK operand names a constant.
pub fn is_constant(rk: u16) -> bool {
    rk & BITRK != 0
}

/// Constant pool index carried by an RK operand.
pub fn constant_index(rk: u16) -> usize {
    (rk & 0xFF) as usize
}

pub fn encode_abc(opcode: u8, a: u8, b: u16, c: u16) -> u32 {
    (opcode as u32 & MASK_OP)
        | ((a as u32) << POS_A)
        | ((c as u32 & MASK_C) << POS_C)
        | ((b as u32 & MASK_B) << POS_B)
}

pub fn encode_abx(opcode: u8, a: u8, bx: u32) -> u32 {
    (opcode as u32 & MASK_OP) | ((a as u32) << POS_A) | ((bx & MASK_BX) << POS_BX)
}

pub fn encode_asbx(opcode: u8, a: u8, sbx: i32) -> u32 {
    encode_abx(opcode, a, (sbx + MAXARG_SBX) as u32)
}
