use crate::error::DecodeError;
use crate::{RecoverOptions, recover_any};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// Write the decrypted chunk bytes.
    #[default]
    Decrypt,
    /// Write synthesized pseudo-source. Accepts encrypted assets and plain chunks.
    Decompile,
}

/// Outcome of a batch run. One bad file never stops the others, and entries the
/// walk could not read are reported as failures too.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, DecodeError)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failures.len()
    }
}

/// Walk `input`, process every file (optionally only those with `extension`) in
/// parallel and mirror the directory layout under `output`.
pub fn run_batch(
    input: &Path,
    output: &Path,
    mode: BatchMode,
    extension: Option<&str>,
    options: &RecoverOptions,
) -> BatchReport {
    let mut report = BatchReport::default();
    let mut files = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                let path = entry.into_path();
                let wanted = match extension {
                    Some(ext) => path.extension().is_some_and(|e| e.eq_ignore_ascii_case(ext)),
                    None => true,
                };
                if wanted {
                    files.push(path);
                }
            }
            Ok(_) => {}
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                warn!(path = %path.display(), error = %e, "batch walk failed");
                report.failures.push((path, DecodeError::Io(e.into())));
            }
        }
    }
    debug!(files = files.len(), ?mode, "batch started");

    let results: Vec<(PathBuf, Result<(), DecodeError>)> = files
        .par_iter()
        .map(|path| {
            let relative = path.strip_prefix(input).unwrap_or(path);
            let target = output.join(relative);
            (path.clone(), process_one(path, &target, mode, options))
        })
        .collect();

    for (path, result) in results {
        match result {
            Ok(()) => report.succeeded.push(path),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "batch item failed");
                report.failures.push((path, e));
            }
        }
    }
    report
}

fn process_one(
    path: &Path,
    target: &Path,
    mode: BatchMode,
    options: &RecoverOptions,
) -> Result<(), DecodeError> {
    let data = fs::read(path)?;
    let bytes = match mode {
        BatchMode::Decrypt => dhcrypt::decrypt(&data)?,
        BatchMode::Decompile => recover_any(&data, options)?.text.into_bytes(),
    };
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, bytes)?;
    Ok(())
}
