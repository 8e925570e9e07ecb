use crate::instruction::Instruction;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Constant {
    Nil,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for Constant {
    /// Renders the constant as a source literal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Nil => f.write_str("nil"),
            Constant::Bool(b) => write!(f, "{b}"),
            Constant::Number(n) => f.write_str(&format_number(*n)),
            Constant::Text(s) => write!(f, "\"{}\"", escape(s)),
        }
    }
}

pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "(0/0)".to_string()
    } else if n.is_infinite() {
        let huge = if n > 0.0 { "math.huge" } else { "-math.huge" };
        huge.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// Debug record for a named local. Live over `[start_pc, end_pc)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalVar {
    pub name: Option<String>,
    pub start_pc: u32,
    pub end_pc: u32,
}

impl LocalVar {
    pub fn is_active(&self, pc: u32) -> bool {
        self.start_pc <= pc && pc < self.end_pc
    }
}

/// One function record. Children are owned, so the tree has no cycles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prototype {
    pub source: Option<String>,
    pub line_defined: u32,
    pub last_line_defined: u32,
    pub num_upvalues: u8,
    pub num_params: u8,
    pub is_vararg: u8,
    pub max_stack_size: u8,
    pub code: Vec<Instruction>,
    pub constants: Vec<Constant>,
    pub prototypes: Vec<Prototype>,
    pub line_info: Vec<u32>,
    pub locals: Vec<LocalVar>,
    pub upvalue_names: Vec<Option<String>>,
}

impl Prototype {
    /// Debug name of register `reg` at `pc`.
    ///
    /// Locals occupy registers in declaration order, so the n-th local active at `pc`
    /// lives in register n.
    pub fn local_name(&self, reg: u32, pc: u32) -> Option<&str> {
        self.locals
            .iter()
            .filter(|local| local.is_active(pc))
            .nth(reg as usize)
            .and_then(|local| local.name.as_deref())
    }

    pub fn upvalue_name(&self, index: usize) -> Option<&str> {
        self.upvalue_names.get(index).and_then(|n| n.as_deref())
    }

    pub fn line_at(&self, pc: usize) -> Option<u32> {
        self.line_info.get(pc).copied()
    }

    /// Number of prototypes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.prototypes.iter().map(Prototype::count).sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        1 + self.prototypes.iter().map(Prototype::depth).max().unwrap_or(0)
    }

    /// Label used in listings and diagnostics.
    pub fn display_name(&self) -> String {
        match &self.source {
            Some(src) if self.line_defined == 0 => src.clone(),
            Some(src) => format!("{}:{}", src, self.line_defined),
            None if self.line_defined == 0 => "main".to_string(),
            None => format!("function@{}", self.line_defined),
        }
    }
}

impl Default for Prototype {
    fn default() -> Self {
        Self {
            source: None,
            line_defined: 0,
            last_line_defined: 0,
            num_upvalues: 0,
            num_params: 0,
            is_vararg: 0,
            max_stack_size: 2,
            code: Vec::new(),
            constants: Vec::new(),
            prototypes: Vec::new(),
            line_info: Vec::new(),
            locals: Vec::new(),
            upvalue_names: Vec::new(),
        }
    }
}
