use decompiler::Diagnostic;
use luac::Prototype;
use serde::Serialize;

/// Everything recovered from one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveredAsset {
    pub prototype: Prototype,
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}
