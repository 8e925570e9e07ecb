use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{BatchMode, RecoverOptions, recover_any, recover_with, run_batch};

pub fn decompile_file(
    input: &Path,
    output: &Option<PathBuf>,
    encrypted: bool,
    options: &RecoverOptions,
) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    // Without the flag, encrypted assets and plain chunks are told apart by their markers.
    let recovered = if encrypted {
        recover_with(&data, options)
    } else {
        recover_any(&data, options)
    };
    let recovered = recovered.with_context(|| format!("Failed to decompile {:?}", input))?;

    let out_path = match output {
        Some(p) => p.clone(),
        None => input.with_extension("dec.lua"),
    };

    fs::write(&out_path, &recovered.text).context("Failed to write output file")?;
    println!(
        "Decompiled {} functions to {:?} ({} diagnostics)",
        recovered.prototype.count(),
        out_path,
        recovered.diagnostics.len()
    );
    Ok(())
}

pub fn batch_dir(
    input: &Path,
    output: &Path,
    mode: BatchMode,
    extension: Option<&str>,
    options: &RecoverOptions,
) -> Result<()> {
    if !input.is_dir() {
        anyhow::bail!("Input {:?} is not a directory", input);
    }
    fs::create_dir_all(output).context("Failed to create output directory")?;

    let report = run_batch(input, output, mode, extension, options);
    for (path, error) in &report.failures {
        println!("Failed {:?}: {}", path, error);
    }
    println!(
        "Processed {} files: {} succeeded, {} failed. Output in {:?}",
        report.total(),
        report.succeeded.len(),
        report.failures.len(),
        output
    );
    Ok(())
}
