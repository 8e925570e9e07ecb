pub mod disasm;
pub mod error;
pub mod header;
pub mod instruction;
pub mod opcode;
pub mod parser;
pub mod process;
pub mod reader;
pub mod types;
pub mod writer;

pub use disasm::disassemble;
pub use error::{ParseError, Result};
pub use header::{Header, SIGNATURE, is_chunk};
pub use instruction::{Instruction, decode};
pub use opcode::{OpcodeTable, Operation, RECOVERED};
pub use parser::{ParseLimits, parse, parse_with, parse_with_limits};
pub use types::{Constant, LocalVar, Prototype};
pub use writer::write_chunk;
