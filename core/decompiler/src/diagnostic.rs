use serde::Serialize;
use thiserror::Error;

/// Non-fatal problems met while synthesizing. The affected spot degrades to a
/// comment or a constant dump and synthesis carries on.
///
/// `function` is the prototype's path in the tree: `0` for the root, `0.2` for its
/// third child, and so on.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    #[error("{function}: unknown opcode {opcode} at pc {pc}")]
    UnknownOpcode {
        function: String,
        pc: usize,
        opcode: u8,
    },
    #[error("{function}: {operation} at pc {pc} has an operand that does not resolve")]
    UnresolvedOperand {
        function: String,
        pc: usize,
        operation: String,
    },
    #[error("{function}: no statements recovered, emitted constant dump")]
    SynthesisGap { function: String },
}

impl Diagnostic {
    pub fn function(&self) -> &str {
        match self {
            Diagnostic::UnknownOpcode { function, .. }
            | Diagnostic::UnresolvedOperand { function, .. }
            | Diagnostic::SynthesisGap { function } => function,
        }
    }
}
