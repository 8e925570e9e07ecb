use crate::header::EXPECTED_HEADER;
use crate::types::{Constant, Prototype};
use byteorder::{LE, WriteBytesExt};
use std::io::{self, Write};

/// Serialize a prototype tree as a chunk the parser accepts.
///
/// Instructions are written from their raw words, so a parsed tree writes back
/// byte-for-byte.
pub fn write_chunk(proto: &Prototype) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    out.write_all(&EXPECTED_HEADER)?;
    write_prototype(&mut out, proto)?;
    Ok(out)
}

fn write_string<W: Write>(w: &mut W, s: Option<&str>) -> io::Result<()> {
    match s {
        None => w.write_u32::<LE>(0),
        Some(s) => {
            w.write_u32::<LE>(s.len() as u32 + 1)?;
            w.write_all(s.as_bytes())?;
            w.write_u8(0)
        }
    }
}

fn write_prototype<W: Write>(w: &mut W, proto: &Prototype) -> io::Result<()> {
    write_string(w, proto.source.as_deref())?;
    w.write_u32::<LE>(proto.line_defined)?;
    w.write_u32::<LE>(proto.last_line_defined)?;
    w.write_u8(proto.num_upvalues)?;
    w.write_u8(proto.num_params)?;
    w.write_u8(proto.is_vararg)?;
    w.write_u8(proto.max_stack_size)?;

    w.write_u32::<LE>(proto.code.len() as u32)?;
    for inst in &proto.code {
        w.write_u32::<LE>(inst.raw)?;
    }

    w.write_u32::<LE>(proto.constants.len() as u32)?;
    for constant in &proto.constants {
        match constant {
            Constant::Nil => w.write_u8(0)?,
            Constant::Bool(b) => {
                w.write_u8(1)?;
                w.write_u8(*b as u8)?;
            }
            Constant::Number(n) => {
                w.write_u8(3)?;
                w.write_f64::<LE>(*n)?;
            }
            Constant::Text(s) => {
                w.write_u8(4)?;
                write_string(w, Some(s))?;
            }
        }
    }

    w.write_u32::<LE>(proto.prototypes.len() as u32)?;
    for child in &proto.prototypes {
        write_prototype(w, child)?;
    }

    w.write_u32::<LE>(proto.line_info.len() as u32)?;
    for line in &proto.line_info {
        w.write_u32::<LE>(*line)?;
    }

    w.write_u32::<LE>(proto.locals.len() as u32)?;
    for local in &proto.locals {
        write_string(w, local.name.as_deref())?;
        w.write_u32::<LE>(local.start_pc)?;
        w.write_u32::<LE>(local.end_pc)?;
    }

    w.write_u32::<LE>(proto.upvalue_names.len() as u32)?;
    for name in &proto.upvalue_names {
        write_string(w, name.as_deref())?;
    }
    Ok(())
}
