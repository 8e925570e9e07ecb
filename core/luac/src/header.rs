use crate::error::{ParseError, Result};
use crate::reader::ChunkReader;
use serde::Serialize;
use std::fmt;

/// Leading bytes of every chunk.
pub const SIGNATURE: &[u8; 4] = b"\x1bLua";

/// The only header the parser accepts: version 5.1, official format, little endian,
/// 4-byte int, size_t and instruction, 8-byte floating point numbers.
pub const EXPECTED_HEADER: [u8; HEADER_SIZE] =
    [0x1B, 0x4C, 0x75, 0x61, 0x51, 0x00, 0x01, 0x04, 0x04, 0x04, 0x08, 0x00];

pub const HEADER_SIZE: usize = 12;

pub fn is_chunk(data: &[u8]) -> bool {
    data.starts_with(SIGNATURE)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub signature: [u8; 4],
    pub version: u8,
    pub format: u8,
    pub endianness: u8,
    pub int_size: u8,
    pub size_t_size: u8,
    pub instruction_size: u8,
    pub number_size: u8,
    pub integral: u8,
}

impl Header {
    /// Read the 12 header bytes without validating them.
    pub fn read(reader: &mut ChunkReader) -> Result<Self> {
        let bytes = reader.read_bytes(HEADER_SIZE)?;
        Ok(Self {
            signature: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: bytes[4],
            format: bytes[5],
            endianness: bytes[6],
            int_size: bytes[7],
            size_t_size: bytes[8],
            instruction_size: bytes[9],
            number_size: bytes[10],
            integral: bytes[11],
        })
    }

    /// Check every field against the supported configuration, reporting the first mismatch.
    pub fn validate(&self) -> Result<()> {
        if &self.signature != SIGNATURE {
            return Err(ParseError::Format {
                field: "signature",
                expected: hex::encode(SIGNATURE),
                found: hex::encode(self.signature),
            });
        }
        let fields = [
            ("version", self.version, EXPECTED_HEADER[4]),
            ("format", self.format, EXPECTED_HEADER[5]),
            ("endianness", self.endianness, EXPECTED_HEADER[6]),
            ("int size", self.int_size, EXPECTED_HEADER[7]),
            ("size_t size", self.size_t_size, EXPECTED_HEADER[8]),
            ("instruction size", self.instruction_size, EXPECTED_HEADER[9]),
            ("number size", self.number_size, EXPECTED_HEADER[10]),
            ("integral flag", self.integral, EXPECTED_HEADER[11]),
        ];
        for (field, found, expected) in fields {
            if found != expected {
                return Err(ParseError::Format {
                    field,
                    expected: format!("{expected:#04x}"),
                    found: format!("{found:#04x}"),
                });
            }
        }
        Ok(())
    }

    pub fn read_validated(reader: &mut ChunkReader) -> Result<Self> {
        let header = Self::read(reader)?;
        header.validate()?;
        Ok(header)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Signature:        {}", hex::encode(self.signature))?;
        writeln!(
            f,
            "Version:          {}.{}",
            self.version >> 4,
            self.version & 0x0F
        )?;
        writeln!(f, "Format:           {}", self.format)?;
        writeln!(
            f,
            "Endianness:       {}",
            if self.endianness == 1 { "little" } else { "big" }
        )?;
        writeln!(f, "int:              {} bytes", self.int_size)?;
        writeln!(f, "size_t:           {} bytes", self.size_t_size)?;
        writeln!(f, "Instruction:      {} bytes", self.instruction_size)?;
        writeln!(f, "Number:           {} bytes", self.number_size)?;
        write!(
            f,
            "Numbers:          {}",
            if self.integral == 0 { "floating point" } else { "integral" }
        )
    }
}

/// Classic 16-bytes-per-row hex dump of the first `limit` bytes.
pub fn hexdump(data: &[u8], limit: usize) -> String {
    let mut out = String::new();
    for (row, chunk) in data[..data.len().min(limit)].chunks(16).enumerate() {
        let hex_part: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        out.push_str(&format!(
            "{:08x}  {:<47}  |{}|\n",
            row * 16,
            hex_part.join(" "),
            ascii
        ));
    }
    out
}
