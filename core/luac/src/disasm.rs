use crate::instruction::{BITRK, Instruction, constant_index};
use crate::opcode::{OperandMode, Operation};
use crate::types::{Constant, Prototype};
use std::fmt::{self, Write};

/// Instruction listing for a prototype and all of its children.
pub fn disassemble(proto: &Prototype) -> String {
    Listing(proto).to_string()
}

struct Listing<'a>(&'a Prototype);

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        listing(f, self.0, "0")
    }
}

fn listing(out: &mut fmt::Formatter<'_>, proto: &Prototype, path: &str) -> fmt::Result {
    writeln!(
        out,
        "function {} <{}> ({} instructions, {} constants, {} params{}, {} upvalues, {} children)",
        path,
        proto.display_name(),
        proto.code.len(),
        proto.constants.len(),
        proto.num_params,
        if proto.is_vararg != 0 { "+" } else { "" },
        proto.num_upvalues,
        proto.prototypes.len(),
    )?;

    for (pc, inst) in proto.code.iter().enumerate() {
        let line = proto
            .line_at(pc)
            .map(|l| format!("[{l}]"))
            .unwrap_or_else(|| "[-]".to_string());
        let operands = operands(inst);
        let comment = comment(proto, pc, inst);
        write!(out, "  {:>5}  {:<7} {:<13} {:<16}", pc, line, inst.op, operands)?;
        if comment.is_empty() {
            out.write_char('\n')?;
        } else {
            writeln!(out, "; {comment}")?;
        }
    }

    if !proto.constants.is_empty() {
        writeln!(out, "constants ({}):", proto.constants.len())?;
        for (i, k) in proto.constants.iter().enumerate() {
            writeln!(out, "  {:>5}  {}", i, k)?;
        }
    }

    if !proto.locals.is_empty() {
        writeln!(out, "locals ({}):", proto.locals.len())?;
        for (i, local) in proto.locals.iter().enumerate() {
            writeln!(
                out,
                "  {:>5}  {:<16} {}..{}",
                i,
                local.name.as_deref().unwrap_or("?"),
                local.start_pc,
                local.end_pc
            )?;
        }
    }

    for (i, child) in proto.prototypes.iter().enumerate() {
        out.write_char('\n')?;
        listing(out, child, &format!("{path}.{i}"))?;
    }
    Ok(())
}

fn operands(inst: &Instruction) -> String {
    match inst.op.mode() {
        OperandMode::ABx => format!("{} {}", inst.a, inst.bx),
        OperandMode::AsBx => format!("{} {}", inst.a, inst.sbx),
        OperandMode::ABC => format!("{} {} {}", inst.a, rk_operand(inst.b), rk_operand(inst.c)),
    }
}

fn rk_operand(v: u16) -> String {
    if v & BITRK != 0 {
        format!("K{}", v & 0xFF)
    } else {
        v.to_string()
    }
}

fn constant(proto: &Prototype, index: usize) -> Option<&Constant> {
    proto.constants.get(index)
}

fn comment(proto: &Prototype, pc: usize, inst: &Instruction) -> String {
    match inst.op {
        Operation::LoadK | Operation::LoadKBx | Operation::GetGlobal | Operation::SetGlobal => {
            constant(proto, inst.bx as usize)
                .map(|k| k.to_string())
                .unwrap_or_default()
        }
        Operation::Jmp | Operation::ForLoop | Operation::ForPrep => {
            format!("to {}", pc as i64 + 1 + inst.sbx as i64)
        }
        Operation::Closure | Operation::ClosureAlt => {
            format!("child {}", (inst.bx & 0x1FF) as i64 - 1)
        }
        Operation::Unknown(n) => format!("opcode {n} raw {:#010x}", inst.raw),
        _ => {
            let ks: Vec<String> = [inst.b, inst.c]
                .iter()
                .filter(|&&v| v & BITRK != 0)
                .filter_map(|&v| constant(proto, constant_index(v)))
                .map(|k| k.to_string())
                .collect();
            ks.join(" ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{decode, encode_abc, encode_abx, encode_asbx};

    #[test]
    fn test_listing_shows_operations_and_constants() {
        let proto = Prototype {
            code: vec![
                decode(encode_abx(1, 0, 0)),
                decode(encode_asbx(7, 0, 2)),
                decode(encode_abc(30, 1, 0, 0x101)),
                decode(encode_abc(26, 0, 1, 0)),
                decode(50),
            ],
            constants: vec![Constant::Text("hi".into()), Constant::Number(2.0)],
            line_info: vec![1, 1, 2, 3, 3],
            prototypes: vec![Prototype::default()],
            ..Default::default()
        };
        let text = disassemble(&proto);
        assert!(text.starts_with("function 0 <main> (5 instructions"));
        assert!(text.contains("LOADK"));
        assert!(text.contains("; \"hi\""));
        assert!(text.contains("; to 4"));
        assert!(text.contains("K1"));
        assert!(text.contains("UNKNOWN(50)"));
        assert!(text.contains("function 0.0 <main>"));
    }
}
