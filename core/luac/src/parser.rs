use crate::error::{ParseError, Result};
use crate::header::Header;
use crate::instruction::Instruction;
use crate::opcode::{OpcodeTable, RECOVERED};
use crate::reader::ChunkReader;
use crate::types::{Constant, LocalVar, Prototype};
use tracing::{debug, trace};

// Smallest encoded size of one record in each counted section.
const INSTRUCTION_SIZE: usize = 4;
const CONSTANT_MIN_SIZE: usize = 1;
const PROTOTYPE_MIN_SIZE: usize = 40;
const LINE_INFO_SIZE: usize = 4;
const LOCAL_MIN_SIZE: usize = 12;
const UPVALUE_NAME_MIN_SIZE: usize = 4;

const TAG_NIL: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_NUMBER: u8 = 3;
const TAG_STRING: u8 = 4;

/// Ceilings applied while walking the prototype tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// Deepest allowed nesting; the root prototype sits at depth 0.
    pub max_depth: usize,
    /// Total prototypes allowed across the whole tree.
    pub max_prototypes: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_depth: 200,
            max_prototypes: 65536,
        }
    }
}

/// Parse a chunk with the recovered opcode table and default limits.
pub fn parse(chunk: &[u8]) -> Result<Prototype> {
    parse_with(chunk, &RECOVERED, ParseLimits::default())
}

pub fn parse_with_limits(chunk: &[u8], limits: ParseLimits) -> Result<Prototype> {
    parse_with(chunk, &RECOVERED, limits)
}

pub fn parse_with(chunk: &[u8], table: &OpcodeTable, limits: ParseLimits) -> Result<Prototype> {
    let mut reader = ChunkReader::new(chunk);
    Header::read_validated(&mut reader)?;

    let mut parser = Parser {
        reader,
        table,
        limits,
        prototypes: 0,
    };
    let root = parser.prototype(0)?;

    if parser.reader.remaining() > 0 {
        debug!(
            trailing = parser.reader.remaining(),
            "ignoring bytes after root prototype"
        );
    }
    debug!(prototypes = parser.prototypes, "chunk parsed");
    Ok(root)
}

struct Parser<'a, 't> {
    reader: ChunkReader<'a>,
    table: &'t OpcodeTable,
    limits: ParseLimits,
    prototypes: usize,
}

impl Parser<'_, '_> {
    fn prototype(&mut self, depth: usize) -> Result<Prototype> {
        if depth > self.limits.max_depth {
            return Err(ParseError::LimitExceeded(format!(
                "nesting depth exceeds {}",
                self.limits.max_depth
            )));
        }
        self.prototypes += 1;
        if self.prototypes > self.limits.max_prototypes {
            return Err(ParseError::LimitExceeded(format!(
                "more than {} prototypes",
                self.limits.max_prototypes
            )));
        }

        let offset = self.reader.position();
        let source = self.reader.read_string()?;
        let line_defined = self.reader.read_u32()?;
        let last_line_defined = self.reader.read_u32()?;
        let num_upvalues = self.reader.read_u8()?;
        let num_params = self.reader.read_u8()?;
        let is_vararg = self.reader.read_u8()?;
        let max_stack_size = self.reader.read_u8()?;

        let code = self.code()?;
        let constants = self.constants()?;

        let count = self.reader.read_count(PROTOTYPE_MIN_SIZE)?;
        let mut prototypes = Vec::with_capacity(count);
        for _ in 0..count {
            prototypes.push(self.prototype(depth + 1)?);
        }

        let count = self.reader.read_count(LINE_INFO_SIZE)?;
        let mut line_info = Vec::with_capacity(count);
        for _ in 0..count {
            line_info.push(self.reader.read_u32()?);
        }

        let count = self.reader.read_count(LOCAL_MIN_SIZE)?;
        let mut locals = Vec::with_capacity(count);
        for _ in 0..count {
            locals.push(LocalVar {
                name: self.reader.read_string()?,
                start_pc: self.reader.read_u32()?,
                end_pc: self.reader.read_u32()?,
            });
        }

        let count = self.reader.read_count(UPVALUE_NAME_MIN_SIZE)?;
        let mut upvalue_names = Vec::with_capacity(count);
        for _ in 0..count {
            upvalue_names.push(self.reader.read_string()?);
        }

        trace!(
            offset,
            depth,
            instructions = code.len(),
            constants = constants.len(),
            children = prototypes.len(),
            "prototype parsed"
        );

        Ok(Prototype {
            source,
            line_defined,
            last_line_defined,
            num_upvalues,
            num_params,
            is_vararg,
            max_stack_size,
            code,
            constants,
            prototypes,
            line_info,
            locals,
            upvalue_names,
        })
    }

    fn code(&mut self) -> Result<Vec<Instruction>> {
        let count = self.reader.read_count(INSTRUCTION_SIZE)?;
        let mut code = Vec::with_capacity(count);
        for _ in 0..count {
            let word = self.reader.read_u32()?;
            code.push(Instruction::decode(word, self.table));
        }
        Ok(code)
    }

    fn constants(&mut self) -> Result<Vec<Constant>> {
        let count = self.reader.read_count(CONSTANT_MIN_SIZE)?;
        let mut constants = Vec::with_capacity(count);
        for _ in 0..count {
            let offset = self.reader.position();
            let constant = match self.reader.read_u8()? {
                TAG_NIL => Constant::Nil,
                TAG_BOOL => Constant::Bool(self.reader.read_u8()? != 0),
                TAG_NUMBER => Constant::Number(self.reader.read_f64()?),
                TAG_STRING => Constant::Text(self.reader.read_string()?.unwrap_or_default()),
                tag => return Err(ParseError::UnknownConstantTag { tag, offset }),
            };
            constants.push(constant);
        }
        Ok(constants)
    }
}
