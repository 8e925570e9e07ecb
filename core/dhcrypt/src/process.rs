use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{decrypt, encrypt};

pub fn decrypt_file(input: &Path, output: &Option<PathBuf>) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    let decrypted = decrypt(&data).with_context(|| format!("Failed to decrypt {:?}", input))?;

    let out_path = match output {
        Some(p) => p.clone(),
        None => input.with_extension("luac"),
    };

    fs::write(&out_path, decrypted).context("Failed to write output file")?;
    println!("Decrypted to {:?}", out_path);
    Ok(())
}

pub fn encrypt_file(input: &Path, output: &Option<PathBuf>) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    let encrypted = encrypt(&data).context("Failed to compress input")?;

    let out_path = match output {
        Some(p) => p.clone(),
        None => input.with_extension("encrypted"),
    };

    fs::write(&out_path, encrypted).context("Failed to write output file")?;
    println!("Encrypted to {:?}", out_path);
    Ok(())
}
