use crate::diagnostic::Diagnostic;
use luac::instruction::{constant_index, is_constant};
use luac::{Constant, Prototype};
use std::collections::{HashMap, HashSet};

/// Expressions longer than this are not carried forward; the register falls back
/// to its name so repeated self-references cannot grow text without bound.
pub const MAX_EXPRESSION_LEN: usize = 256;

/// Expression text last bound to each register during one pass.
#[derive(Debug, Default)]
pub struct RegisterState {
    bindings: HashMap<usize, String>,
    // Registers holding `obj:method` from a SELF, whose next argument is the implicit self.
    methods: HashSet<usize>,
}

impl RegisterState {
    pub fn bind(&mut self, reg: usize, text: impl Into<String>) {
        self.methods.remove(&reg);
        self.insert(reg, text.into());
    }

    pub fn bind_method(&mut self, reg: usize, text: impl Into<String>) {
        if self.insert(reg, text.into()) {
            self.methods.insert(reg);
        } else {
            self.methods.remove(&reg);
        }
    }

    fn insert(&mut self, reg: usize, text: String) -> bool {
        if text.len() > MAX_EXPRESSION_LEN {
            self.bindings.remove(&reg);
            false
        } else {
            self.bindings.insert(reg, text);
            true
        }
    }

    pub fn get(&self, reg: usize) -> Option<&str> {
        self.bindings.get(&reg).map(String::as_str)
    }

    pub fn is_method(&self, reg: usize) -> bool {
        self.methods.contains(&reg)
    }
}

/// Per-prototype synthesis state. Built fresh for every function and dropped after.
pub struct FunctionContext<'p> {
    pub(crate) proto: &'p Prototype,
    pub(crate) path: String,
    pub(crate) registers: RegisterState,
    pub(crate) pc: usize,
    pub(crate) diagnostics: Vec<Diagnostic>,
    // Children whose full text has already been emitted once in this function.
    pub(crate) spliced: HashSet<usize>,
}

impl<'p> FunctionContext<'p> {
    pub fn new(proto: &'p Prototype, path: impl Into<String>) -> Self {
        Self {
            proto,
            path: path.into(),
            registers: RegisterState::default(),
            pc: 0,
            diagnostics: Vec::new(),
            spliced: HashSet::new(),
        }
    }

    /// Name for register `reg` at the current pc.
    ///
    /// A local whose range starts right after this instruction is the one the
    /// instruction declares, so it is tried too.
    pub fn name_for(&self, reg: usize) -> String {
        let pc = self.pc as u32;
        self.proto
            .local_name(reg as u32, pc)
            .or_else(|| self.proto.local_name(reg as u32, pc + 1))
            .map(str::to_string)
            .unwrap_or_else(|| format!("var{reg}"))
    }

    /// Current text of register `reg`, falling back to its name if never written.
    pub fn value_of(&self, reg: usize) -> String {
        match self.registers.get(reg) {
            Some(text) => text.to_string(),
            None => self.name_for(reg),
        }
    }

    /// Resolve a B/C operand that may name either a register or a constant.
    pub fn rk(&self, operand: u16) -> String {
        if is_constant(operand) {
            let index = constant_index(operand);
            match self.proto.constants.get(index) {
                Some(k) => k.to_string(),
                None => format!("K{index}"),
            }
        } else {
            self.value_of(operand as usize)
        }
    }

    /// Constant `index` rendered as a bare identifier, for global and field names.
    pub fn constant_name(&self, index: usize) -> Option<String> {
        self.proto.constants.get(index).map(|k| match k {
            Constant::Text(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn constant_literal(&self, index: usize) -> Option<String> {
        self.proto.constants.get(index).map(Constant::to_string)
    }

    pub fn upvalue_name(&self, index: usize) -> String {
        self.proto
            .upvalue_name(index)
            .map(str::to_string)
            .unwrap_or_else(|| format!("upval{index}"))
    }

    /// Parameter list as it appears in a function header.
    pub fn params(&self) -> Vec<String> {
        let mut params: Vec<String> = (0..self.proto.num_params as u32)
            .map(|i| {
                self.proto
                    .local_name(i, 0)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("arg{i}"))
            })
            .collect();
        if self.proto.is_vararg != 0 {
            params.push("...".to_string());
        }
        params
    }

    /// Declare register `reg` at the current pc and return its name.
    pub fn assign(&mut self, reg: usize) -> String {
        let name = self.name_for(reg);
        self.registers.bind(reg, name.clone());
        name
    }

    pub fn diagnose(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
