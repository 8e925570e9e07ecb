pub mod context;
pub mod diagnostic;
mod synth;

pub use context::{FunctionContext, RegisterState};
pub use diagnostic::Diagnostic;

use luac::Prototype;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// A function rendering to fewer lines than this gets a constant dump appended.
const MIN_RENDERED_LINES: usize = 3;

const INDENT: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Synthesis {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Render a prototype tree as pseudo-source.
///
/// The output is an annotated linear trace: conditionals and loops open a block
/// without a matching close, and jumps show up as comments.
pub fn synthesize(proto: &Prototype) -> Synthesis {
    let mut diagnostics = Vec::new();
    let text = function_text(proto, "0", true, &mut diagnostics);
    Synthesis { text, diagnostics }
}

fn function_text(
    proto: &Prototype,
    path: &str,
    root: bool,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let children: Vec<String> = proto
        .prototypes
        .iter()
        .enumerate()
        .map(|(i, child)| function_text(child, &format!("{path}.{i}"), false, diagnostics))
        .collect();

    let mut ctx = FunctionContext::new(proto, path);
    let mut body = Vec::new();
    for (pc, inst) in proto.code.iter().enumerate() {
        ctx.pc = pc;
        ctx.emit(inst, &children, &mut body);
    }

    let rendered = if root { body.len() } else { body.len() + 2 };
    if rendered < MIN_RENDERED_LINES {
        constant_dump(proto, &children, &ctx.spliced, &mut body);
        ctx.diagnose(Diagnostic::SynthesisGap {
            function: path.to_string(),
        });
    }

    debug!(function = path, lines = body.len(), "function synthesized");

    let text = if root {
        body.join("\n")
    } else {
        let mut lines = Vec::with_capacity(body.len() + 2);
        lines.push(format!("function({})", ctx.params().join(", ")));
        lines.extend(body.iter().map(|line| indent(line)));
        lines.push("end".to_string());
        lines.join("\n")
    };
    diagnostics.append(&mut ctx.diagnostics);
    text
}

fn indent(line: &str) -> String {
    if line.is_empty() {
        String::new()
    } else {
        format!("{INDENT}{line}")
    }
}

/// Every constant in pool order, then the children not already spliced, so nothing
/// is dropped when statement recovery comes up empty.
fn constant_dump(
    proto: &Prototype,
    children: &[String],
    spliced: &HashSet<usize>,
    out: &mut Vec<String>,
) {
    out.push("-- Constants:".to_string());
    for (i, k) in proto.constants.iter().enumerate() {
        out.push(format!("-- [{i}] {k}"));
    }
    if !children.is_empty() {
        out.push(format!("-- {} nested functions", children.len()));
        for (i, child) in children.iter().enumerate() {
            if spliced.contains(&i) {
                out.push(format!("-- Nested function {i}: see above"));
                continue;
            }
            out.push(format!("-- Nested function {i}:"));
            out.extend(child.lines().map(str::to_string));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luac::instruction::{encode_abc, encode_abx, encode_asbx};
    use luac::{Constant, Instruction, LocalVar, OpcodeTable, Operation, RECOVERED, decode};

    fn opcode(op: Operation) -> u8 {
        RECOVERED.opcode_of(op).unwrap()
    }

    fn abc(op: Operation, a: u8, b: u16, c: u16) -> Instruction {
        decode(encode_abc(opcode(op), a, b, c))
    }

    fn abx(op: Operation, a: u8, bx: u32) -> Instruction {
        decode(encode_abx(opcode(op), a, bx))
    }

    fn asbx(op: Operation, a: u8, sbx: i32) -> Instruction {
        decode(encode_asbx(opcode(op), a, sbx))
    }

    fn text(s: &str) -> Constant {
        Constant::Text(s.to_string())
    }

    #[test]
    fn test_global_assignment_end_to_end() {
        let proto = Prototype {
            code: vec![
                abx(Operation::LoadK, 0, 0),
                abx(Operation::SetGlobal, 0, 1),
                abc(Operation::Return, 0, 1, 0),
            ],
            constants: vec![text("hello"), text("greet")],
            ..Default::default()
        };
        let out = synthesize(&proto);
        assert_eq!(out.text, "local var0 = \"hello\"\ngreet = var0\nreturn");
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_fallback_lists_every_constant_in_order() {
        let proto = Prototype {
            code: vec![abc(Operation::Return, 0, 1, 0)],
            constants: vec![Constant::Number(1.0), text("x"), Constant::Nil],
            ..Default::default()
        };
        let out = synthesize(&proto);
        let lines: Vec<&str> = out.text.lines().collect();
        assert_eq!(
            lines,
            vec!["return", "-- Constants:", "-- [0] 1", "-- [1] \"x\"", "-- [2] nil"]
        );
        assert_eq!(
            out.diagnostics,
            vec![Diagnostic::SynthesisGap {
                function: "0".into()
            }]
        );
    }

    #[test]
    fn test_fallback_includes_children() {
        let child = Prototype::default();
        let proto = Prototype {
            constants: vec![text("only")],
            prototypes: vec![child],
            ..Default::default()
        };
        let out = synthesize(&proto);
        assert!(out.text.contains("-- [0] \"only\""));
        assert!(out.text.contains("-- 1 nested functions"));
        assert!(out.text.contains("-- Nested function 0:\nfunction()"));
        // both the empty child and the root fall back
        assert_eq!(out.diagnostics.len(), 2);
        assert_eq!(out.diagnostics[0].function(), "0.0");
    }

    #[test]
    fn test_closure_splices_child() {
        let child = Prototype {
            num_params: 1,
            code: vec![abc(Operation::Return, 0, 2, 0)],
            locals: vec![LocalVar {
                name: Some("x".into()),
                start_pc: 0,
                end_pc: 1,
            }],
            ..Default::default()
        };
        let proto = Prototype {
            code: vec![
                abx(Operation::Closure, 0, 1),
                abx(Operation::SetGlobal, 0, 0),
                abc(Operation::Return, 0, 1, 0),
            ],
            constants: vec![text("identity")],
            prototypes: vec![child],
            ..Default::default()
        };
        let out = synthesize(&proto);
        assert_eq!(
            out.text,
            "local var0 = function(x)\n  return x\nend\nidentity = var0\nreturn"
        );
    }

    #[test]
    fn test_missing_closure_child() {
        let proto = Prototype {
            code: vec![
                abx(Operation::ClosureAlt, 2, 5),
                abc(Operation::Return, 0, 1, 0),
                abc(Operation::Return, 0, 1, 0),
            ],
            ..Default::default()
        };
        let out = synthesize(&proto);
        assert!(out.text.starts_with("local var2 = function() end -- missing child 4"));
        assert!(matches!(
            out.diagnostics[0],
            Diagnostic::UnresolvedOperand { pc: 0, .. }
        ));
    }

    #[test]
    fn test_method_call_skips_self_argument() {
        let proto = Prototype {
            num_params: 1,
            code: vec![
                abc(Operation::SelfCall, 1, 0, 0x100),
                abx(Operation::LoadK, 3, 1),
                abc(Operation::Call, 1, 3, 1),
                abc(Operation::Return, 0, 1, 0),
            ],
            constants: vec![text("update"), Constant::Number(2.0)],
            locals: vec![LocalVar {
                name: Some("self".into()),
                start_pc: 0,
                end_pc: 4,
            }],
            ..Default::default()
        };
        let out = synthesize(&proto);
        assert_eq!(
            out.text,
            "local var3 = 2\nself:update(var3)\nreturn"
        );
    }

    #[test]
    fn test_call_result_forms() {
        let proto = Prototype {
            code: vec![
                abc(Operation::Call, 0, 0, 0),
                abc(Operation::Call, 0, 1, 3),
                abc(Operation::Call, 4, 2, 2),
            ],
            ..Default::default()
        };
        let lines: Vec<String> = synthesize(&proto).text.lines().map(str::to_string).collect();
        assert_eq!(lines[0], "var0(...)");
        assert_eq!(lines[1], "local var0, var1 = var0()");
        assert_eq!(lines[2], "local var4 = var4(var5)");
    }

    #[test]
    fn test_control_flow_trace() {
        let proto = Prototype {
            code: vec![
                abc(Operation::Eq, 0, 1, 0x100),
                asbx(Operation::Jmp, 0, 3),
                asbx(Operation::ForPrep, 0, 1),
                asbx(Operation::ForLoop, 0, -2),
                abc(Operation::Test, 2, 0, 0),
                abc(Operation::Lt, 1, 0x100, 5),
            ],
            constants: vec![Constant::Number(1.0)],
            ..Default::default()
        };
        let lines: Vec<String> = synthesize(&proto).text.lines().map(str::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "if not (var1 == 1) then",
                "-- jump to pc 5",
                "for i = var0, var1, var2 do",
                "end -- for loop",
                "if not var2 then",
                "if 1 < var5 then",
            ]
        );
    }

    #[test]
    fn test_arithmetic_and_tables() {
        let proto = Prototype {
            code: vec![
                abc(Operation::NewTable, 0, 0, 0),
                abc(Operation::Add, 1, 0x100, 0x101),
                abc(Operation::SetTable, 0, 0x102, 1),
                abc(Operation::GetTable, 2, 0, 0x102),
                abc(Operation::Concat, 3, 1, 2),
                abc(Operation::SetList, 0, 2, 1),
            ],
            constants: vec![
                Constant::Number(1.0),
                Constant::Number(2.5),
                text("key"),
            ],
            ..Default::default()
        };
        let lines: Vec<String> = synthesize(&proto).text.lines().map(str::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "local var0 = {}",
                "local var1 = (1 + 2.5)",
                "var0[\"key\"] = var1",
                "local var2 = var0[\"key\"]",
                "local var3 = (var1 .. var2)",
                "var0[1] = var1",
                "var0[2] = var2",
            ]
        );
    }

    #[test]
    fn test_unknown_opcode_is_commented() {
        let proto = Prototype {
            code: vec![
                decode(50 | (1 << 6)),
                abc(Operation::Return, 0, 1, 0),
                abc(Operation::Return, 0, 1, 0),
            ],
            ..Default::default()
        };
        let out = synthesize(&proto);
        assert!(out.text.starts_with("-- UNKNOWN(50) A=1 B=0 C=0"));
        assert_eq!(
            out.diagnostics,
            vec![Diagnostic::UnknownOpcode {
                function: "0".into(),
                pc: 0,
                opcode: 50
            }]
        );
    }

    #[test]
    fn test_constant_out_of_range() {
        let proto = Prototype {
            code: vec![
                abx(Operation::LoadK, 0, 7),
                abc(Operation::Return, 0, 1, 0),
                abc(Operation::Return, 0, 1, 0),
            ],
            ..Default::default()
        };
        let out = synthesize(&proto);
        assert!(out.text.starts_with("-- LOADK A=0"));
        assert!(matches!(
            out.diagnostics[0],
            Diagnostic::UnresolvedOperand { .. }
        ));
    }

    #[test]
    fn test_nested_header_and_vararg() {
        let child = Prototype {
            num_params: 2,
            is_vararg: 2,
            code: vec![
                abc(Operation::VarArg, 2, 3, 0),
                abc(Operation::Return, 2, 3, 0),
            ],
            ..Default::default()
        };
        let proto = Prototype {
            code: vec![abx(Operation::Closure, 0, 1), abc(Operation::Return, 0, 1, 0)],
            prototypes: vec![child],
            ..Default::default()
        };
        let out = synthesize(&proto);
        assert_eq!(
            out.text,
            "local var0 = function(arg0, arg1, ...)\n  local var2, var3 = ...\n  return var2, var3\nend\nreturn"
        );
    }

    /// Run `code` through one function context and collect the emitted lines.
    fn render(proto: &Prototype, code: &[Instruction]) -> Vec<String> {
        let mut ctx = FunctionContext::new(proto, "0");
        let mut out = Vec::new();
        for (pc, inst) in code.iter().enumerate() {
            ctx.pc = pc;
            ctx.emit(inst, &[], &mut out);
        }
        out
    }

    #[test]
    fn test_statement_forms() {
        let proto = Prototype {
            constants: vec![text("print"), Constant::Number(3.0)],
            upvalue_names: vec![Some("cache".into())],
            ..Default::default()
        };
        let with_globals = OpcodeTable::new(vec![Operation::Move, Operation::GetGlobal]);
        let get_global = Instruction::decode(encode_abx(1, 0, 0), &with_globals);

        let cases: Vec<(Vec<Instruction>, Vec<&str>)> = vec![
            (vec![abc(Operation::Move, 1, 0, 0)], vec!["local var1 = var0"]),
            (
                vec![abc(Operation::LoadNil, 0, 2, 0)],
                vec!["local var0, var1, var2 = nil"],
            ),
            (vec![abc(Operation::LoadBool, 0, 1, 0)], vec!["local var0 = true"]),
            (vec![abc(Operation::LoadBoolAlt, 2, 0, 1)], vec!["local var2 = false"]),
            (vec![abc(Operation::GetUpval, 0, 0, 0)], vec!["local var0 = cache"]),
            (vec![abc(Operation::GetUpval, 0, 4, 0)], vec!["local var0 = upval4"]),
            (vec![abc(Operation::SetUpval, 1, 0, 0)], vec!["cache = var1"]),
            (vec![abc(Operation::SetUpval, 1, 2, 0)], vec!["upval2 = var1"]),
            (vec![get_global], vec!["local var0 = print"]),
            (vec![abc(Operation::Unm, 1, 0, 0)], vec!["local var1 = (-var0)"]),
            (vec![abc(Operation::Len, 1, 0, 0)], vec!["local var1 = (#var0)"]),
            (
                vec![abc(Operation::TestSet, 0, 1, 1)],
                vec!["if var1 then", "  var0 = var1"],
            ),
            (
                vec![abc(Operation::TestSet, 0, 1, 0)],
                vec!["if not var1 then", "  var0 = var1"],
            ),
            (vec![abc(Operation::VarArg, 0, 0, 0)], vec!["local var0 = ..."]),
            (vec![abc(Operation::VarArg, 0, 1, 0)], vec![]),
            (
                vec![abc(Operation::SetList, 0, 0, 1)],
                vec!["-- var0[...] = values up to stack top"],
            ),
            (
                vec![abc(Operation::SetList, 0, 2, 3)],
                vec!["var0[101] = var1", "var0[102] = var2"],
            ),
            (vec![abc(Operation::SetListAlt, 0, 1, 2)], vec!["var0[51] = var1"]),
            (
                vec![
                    abc(Operation::SelfCall, 1, 0, 0x101),
                    abc(Operation::Call, 1, 2, 1),
                ],
                vec!["var0[3](var0)"],
            ),
            (
                vec![
                    abc(Operation::SelfCall, 1, 0, 5),
                    abc(Operation::Call, 1, 2, 1),
                ],
                vec!["var0[var5](var0)"],
            ),
        ];

        for (code, expected) in cases {
            assert_eq!(render(&proto, &code), expected, "{:?}", code[0].op);
        }
    }

    #[test]
    fn test_repeated_closure_spliced_once() {
        let mut proto = Prototype {
            code: vec![abc(Operation::Return, 0, 1, 0)],
            ..Default::default()
        };
        for _ in 0..24 {
            proto = Prototype {
                code: vec![
                    abx(Operation::Closure, 0, 1),
                    abx(Operation::Closure, 1, 1),
                    abc(Operation::Return, 0, 1, 0),
                ],
                prototypes: vec![proto],
                ..Default::default()
            };
        }

        let out = synthesize(&proto);
        assert!(out.diagnostics.is_empty());
        assert_eq!(out.text.matches("(see above)").count(), 24);
        assert!(out.text.len() < 50_000, "{} bytes", out.text.len());
        assert!(out.text.starts_with(
            "local var0 = function()\n  local var0 = function()"
        ));
    }

    #[test]
    fn test_self_referencing_expression_stays_bounded() {
        let mut code = vec![abc(Operation::SelfCall, 0, 0, 0); 40];
        code.push(abc(Operation::Call, 0, 1, 1));
        code.push(abc(Operation::Return, 0, 1, 0));
        let proto = Prototype {
            code,
            ..Default::default()
        };

        let out = synthesize(&proto);
        for line in out.text.lines() {
            assert!(line.len() <= context::MAX_EXPRESSION_LEN + 2, "{line}");
        }
    }
}
