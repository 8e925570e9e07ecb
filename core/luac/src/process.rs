use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::header::{Header, hexdump};
use crate::reader::ChunkReader;
use crate::{disassemble, parse};

pub fn luac_info(input: &Path) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;

    println!("File: {:?} ({} bytes)", input, data.len());
    println!("{}", hexdump(&data, 64));

    let mut reader = ChunkReader::new(&data);
    let header = Header::read(&mut reader).context("Failed to read chunk header")?;
    println!("{}", header);
    header.validate().context("Unsupported chunk header")?;

    let root = parse(&data).with_context(|| format!("Failed to parse {:?}", input))?;
    println!();
    println!("Source:           {}", root.display_name());
    println!("Prototypes:       {}", root.count());
    println!("Max depth:        {}", root.depth());
    println!("Root code:        {} instructions", root.code.len());
    println!("Root constants:   {}", root.constants.len());
    Ok(())
}

pub fn luac_disasm(input: &Path, output: &Option<PathBuf>) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    let root = parse(&data).with_context(|| format!("Failed to parse {:?}", input))?;
    let listing = disassemble(&root);

    match output {
        Some(out_path) => {
            fs::write(out_path, listing).context("Failed to write output file")?;
            println!("Disassembled to {:?}", out_path);
        }
        None => print!("{}", listing),
    }
    Ok(())
}

pub fn luac_dump(input: &Path, output: &Option<PathBuf>) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    let root = parse(&data).with_context(|| format!("Failed to parse {:?}", input))?;

    let out_path = match output {
        Some(p) => p.clone(),
        None => input.with_extension("json"),
    };

    let json = serde_json::to_string_pretty(&root)?;
    fs::write(&out_path, json).context("Failed to write output file")?;
    println!("Dumped prototype tree to {:?}", out_path);
    Ok(())
}
