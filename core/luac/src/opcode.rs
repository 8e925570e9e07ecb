use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Operations understood by the decoder and synthesizer.
///
/// Variants carry no numbering: which opcode number selects which operation lives in
/// an [`OpcodeTable`]. Several operations have an `Alt` twin because the target build
/// dispatches two opcode numbers to the same handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Move,
    LoadK,
    LoadKBx,
    LoadBool,
    LoadBoolAlt,
    LoadNil,
    GetUpval,
    GetGlobal,
    GetTable,
    SetGlobal,
    SetUpval,
    SetTable,
    SetTableAlt,
    NewTable,
    SelfCall,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Unm,
    Len,
    Concat,
    Jmp,
    Eq,
    Lt,
    Le,
    Test,
    TestSet,
    Call,
    Return,
    ForLoop,
    ForPrep,
    SetList,
    SetListAlt,
    Closure,
    ClosureAlt,
    VarArg,
    /// Opcode number with no entry in the active table.
    Unknown(u8),
}

/// How the operand bits after A are split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandMode {
    ABC,
    ABx,
    AsBx,
}

impl Operation {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Operation::Move => "MOVE",
            Operation::LoadK => "LOADK",
            Operation::LoadKBx => "LOADK_BX",
            Operation::LoadBool => "LOADBOOL",
            Operation::LoadBoolAlt => "LOADBOOL_ALT",
            Operation::LoadNil => "LOADNIL",
            Operation::GetUpval => "GETUPVAL",
            Operation::GetGlobal => "GETGLOBAL",
            Operation::GetTable => "GETTABLE",
            Operation::SetGlobal => "SETGLOBAL",
            Operation::SetUpval => "SETUPVAL",
            Operation::SetTable => "SETTABLE",
            Operation::SetTableAlt => "SETTABLE_ALT",
            Operation::NewTable => "NEWTABLE",
            Operation::SelfCall => "SELF",
            Operation::Add => "ADD",
            Operation::Sub => "SUB",
            Operation::Mul => "MUL",
            Operation::Div => "DIV",
            Operation::Mod => "MOD",
            Operation::Pow => "POW",
            Operation::Unm => "UNM",
            Operation::Len => "LEN",
            Operation::Concat => "CONCAT",
            Operation::Jmp => "JMP",
            Operation::Eq => "EQ",
            Operation::Lt => "LT",
            Operation::Le => "LE",
            Operation::Test => "TEST",
            Operation::TestSet => "TESTSET",
            Operation::Call => "CALL",
            Operation::Return => "RETURN",
            Operation::ForLoop => "FORLOOP",
            Operation::ForPrep => "FORPREP",
            Operation::SetList => "SETLIST",
            Operation::SetListAlt => "SETLIST_ALT",
            Operation::Closure => "CLOSURE",
            Operation::ClosureAlt => "CLOSURE_ALT",
            Operation::VarArg => "VARARG",
            Operation::Unknown(_) => "UNKNOWN",
        }
    }

    pub fn mode(&self) -> OperandMode {
        match self {
            Operation::LoadK
            | Operation::LoadKBx
            | Operation::GetGlobal
            | Operation::SetGlobal
            | Operation::Closure
            | Operation::ClosureAlt => OperandMode::ABx,
            Operation::Jmp | Operation::ForLoop | Operation::ForPrep => OperandMode::AsBx,
            _ => OperandMode::ABC,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Operation::Unknown(_))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Unknown(n) => f.pad(&format!("UNKNOWN({n})")),
            op => f.pad(op.mnemonic()),
        }
    }
}

/// Opcode numbering recovered from the target client build.
pub const RECOVERED_TABLE: [Operation; 38] = [
    Operation::Sub,         // 0
    Operation::LoadK,       // 1
    Operation::Test,        // 2
    Operation::SetTable,    // 3
    Operation::LoadKBx,     // 4
    Operation::LoadNil,     // 5
    Operation::Call,        // 6
    Operation::Jmp,         // 7
    Operation::SelfCall,    // 8
    Operation::LoadBool,    // 9
    Operation::Len,         // 10
    Operation::NewTable,    // 11
    Operation::Le,          // 12
    Operation::ClosureAlt,  // 13
    Operation::SetTableAlt, // 14
    Operation::TestSet,     // 15
    Operation::Mod,         // 16
    Operation::GetUpval,    // 17
    Operation::ForPrep,     // 18
    Operation::Mul,         // 19
    Operation::Concat,      // 20
    Operation::GetTable,    // 21
    Operation::SetList,     // 22
    Operation::LoadBoolAlt, // 23
    Operation::SetListAlt,  // 24
    Operation::Unm,         // 25
    Operation::Return,      // 26
    Operation::Div,         // 27
    Operation::Move,        // 28
    Operation::SetGlobal,   // 29
    Operation::Add,         // 30
    Operation::Eq,          // 31
    Operation::ForLoop,     // 32
    Operation::Lt,          // 33
    Operation::Pow,         // 34
    Operation::SetUpval,    // 35
    Operation::Closure,     // 36
    Operation::VarArg,      // 37
];

/// The table the decoder uses unless told otherwise.
pub static RECOVERED: OpcodeTable = OpcodeTable::recovered();

/// Mapping from 6-bit opcode numbers to operations.
///
/// Serialized as a JSON array of operation names, slot `i` being opcode `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpcodeTable {
    slots: Cow<'static, [Operation]>,
}

impl OpcodeTable {
    pub fn new(slots: Vec<Operation>) -> Self {
        Self {
            slots: Cow::Owned(slots),
        }
    }

    pub const fn recovered() -> Self {
        Self {
            slots: Cow::Borrowed(&RECOVERED_TABLE),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Operation for `opcode`, or [`Operation::Unknown`] past the end of the table.
    pub fn lookup(&self, opcode: u8) -> Operation {
        self.slots
            .get(opcode as usize)
            .copied()
            .unwrap_or(Operation::Unknown(opcode))
    }

    /// First opcode number mapped to `op`.
    pub fn opcode_of(&self, op: Operation) -> Option<u8> {
        self.slots.iter().position(|&slot| slot == op).map(|i| i as u8)
    }
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::recovered()
    }
}
