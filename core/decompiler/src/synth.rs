use crate::context::FunctionContext;
use crate::diagnostic::Diagnostic;
use luac::{Instruction, Operation};
use tracing::debug;

/// Array slots written per SETLIST flush.
const FIELDS_PER_FLUSH: usize = 50;

impl FunctionContext<'_> {
    /// Render one instruction, appending zero or more lines to `out`.
    ///
    /// `children` holds the already synthesized text of this prototype's children.
    pub(crate) fn emit(&mut self, inst: &Instruction, children: &[String], out: &mut Vec<String>) {
        let a = inst.a as usize;
        let b = inst.b as usize;
        let c = inst.c as usize;

        match inst.op {
            Operation::Move => {
                let value = self.value_of(b);
                let name = self.assign(a);
                out.push(format!("local {name} = {value}"));
            }
            Operation::LoadK | Operation::LoadKBx => match self.constant_literal(inst.bx as usize) {
                Some(k) => {
                    let name = self.assign(a);
                    out.push(format!("local {name} = {k}"));
                }
                None => self.unresolved(inst, out),
            },
            Operation::LoadBool | Operation::LoadBoolAlt => {
                let name = self.assign(a);
                out.push(format!("local {name} = {}", b != 0));
            }
            Operation::LoadNil => {
                let names: Vec<String> = (a..=b.max(a)).map(|r| self.assign(r)).collect();
                out.push(format!("local {} = nil", names.join(", ")));
            }
            Operation::GetUpval => {
                let upvalue = self.upvalue_name(b);
                let name = self.assign(a);
                out.push(format!("local {name} = {upvalue}"));
            }
            Operation::GetGlobal => match self.constant_name(inst.bx as usize) {
                Some(global) => {
                    let name = self.assign(a);
                    out.push(format!("local {name} = {global}"));
                }
                None => self.unresolved(inst, out),
            },
            Operation::GetTable => {
                let table = self.value_of(b);
                let key = self.rk(inst.c);
                let name = self.assign(a);
                out.push(format!("local {name} = {table}[{key}]"));
            }
            Operation::SetGlobal => match self.constant_name(inst.bx as usize) {
                Some(global) => out.push(format!("{global} = {}", self.value_of(a))),
                None => self.unresolved(inst, out),
            },
            Operation::SetUpval => {
                out.push(format!("{} = {}", self.upvalue_name(b), self.value_of(a)));
            }
            Operation::SetTable | Operation::SetTableAlt => {
                out.push(format!(
                    "{}[{}] = {}",
                    self.value_of(a),
                    self.rk(inst.b),
                    self.rk(inst.c)
                ));
            }
            Operation::NewTable => {
                let name = self.assign(a);
                out.push(format!("local {name} = {{}}"));
            }
            Operation::SelfCall => {
                let object = self.value_of(b);
                match self.constant_name_of_rk(inst.c) {
                    Some(method) => self
                        .registers
                        .bind_method(a, format!("{object}:{method}")),
                    None => {
                        let key = self.rk(inst.c);
                        self.registers.bind(a, format!("{object}[{key}]"));
                    }
                }
                self.registers.bind(a + 1, object);
            }
            Operation::Add => self.arith(a, inst, "+", out),
            Operation::Sub => self.arith(a, inst, "-", out),
            Operation::Mul => self.arith(a, inst, "*", out),
            Operation::Div => self.arith(a, inst, "/", out),
            Operation::Mod => self.arith(a, inst, "%", out),
            Operation::Pow => self.arith(a, inst, "^", out),
            Operation::Unm => self.unary(a, b, "-", out),
            Operation::Len => self.unary(a, b, "#", out),
            Operation::Concat => {
                let parts: Vec<String> = (b..=c.max(b)).map(|r| self.value_of(r)).collect();
                let name = self.assign(a);
                out.push(format!("local {name} = ({})", parts.join(" .. ")));
            }
            Operation::Jmp => {
                out.push(format!("-- jump to pc {}", self.pc as i64 + 1 + inst.sbx as i64));
            }
            Operation::Eq => self.compare(inst, "==", out),
            Operation::Lt => self.compare(inst, "<", out),
            Operation::Le => self.compare(inst, "<=", out),
            Operation::Test => {
                out.push(format!("if {} then", self.truth(a, c)));
            }
            Operation::TestSet => {
                out.push(format!("if {} then", self.truth(b, c)));
                let value = self.value_of(b);
                let name = self.assign(a);
                out.push(format!("  {name} = {value}"));
            }
            Operation::Call => self.call(a, b, c, out),
            Operation::Return => {
                let line = match b {
                    0 => "return ...".to_string(),
                    1 => "return".to_string(),
                    _ => {
                        let values: Vec<String> =
                            (a..a + b - 1).map(|r| self.value_of(r)).collect();
                        format!("return {}", values.join(", "))
                    }
                };
                out.push(line);
            }
            Operation::ForPrep => {
                let start = self.value_of(a);
                let limit = self.value_of(a + 1);
                let step = self.value_of(a + 2);
                let pc = self.pc as u32;
                let var = self
                    .proto
                    .local_name((a + 3) as u32, pc + 1)
                    .map(str::to_string)
                    .unwrap_or_else(|| "i".to_string());
                self.registers.bind(a + 3, var.clone());
                out.push(format!("for {var} = {start}, {limit}, {step} do"));
            }
            Operation::ForLoop => out.push("end -- for loop".to_string()),
            Operation::SetList | Operation::SetListAlt => {
                let table = self.value_of(a);
                if b == 0 {
                    out.push(format!("-- {table}[...] = values up to stack top"));
                }
                let base = c.saturating_sub(1) * FIELDS_PER_FLUSH;
                for i in 1..=b {
                    out.push(format!("{table}[{}] = {}", base + i, self.value_of(a + i)));
                }
            }
            Operation::Closure | Operation::ClosureAlt => self.closure(a, inst, children, out),
            Operation::VarArg => match b {
                0 => {
                    let name = self.assign(a);
                    out.push(format!("local {name} = ..."));
                }
                1 => {}
                _ => {
                    let names: Vec<String> = (a..a + b - 1).map(|r| self.assign(r)).collect();
                    out.push(format!("local {} = ...", names.join(", ")));
                }
            },
            Operation::Unknown(opcode) => {
                debug!(function = %self.path, pc = self.pc, opcode, "unknown opcode");
                out.push(operand_comment(inst));
                self.diagnose(Diagnostic::UnknownOpcode {
                    function: self.path.clone(),
                    pc: self.pc,
                    opcode,
                });
            }
        }
    }

    fn arith(&mut self, a: usize, inst: &Instruction, op: &str, out: &mut Vec<String>) {
        let left = self.rk(inst.b);
        let right = self.rk(inst.c);
        let name = self.assign(a);
        out.push(format!("local {name} = ({left} {op} {right})"));
    }

    fn unary(&mut self, a: usize, b: usize, op: &str, out: &mut Vec<String>) {
        let value = self.value_of(b);
        let name = self.assign(a);
        out.push(format!("local {name} = ({op}{value})"));
    }

    fn compare(&mut self, inst: &Instruction, op: &str, out: &mut Vec<String>) {
        let cond = format!("{} {op} {}", self.rk(inst.b), self.rk(inst.c));
        if inst.a == 0 {
            out.push(format!("if not ({cond}) then"));
        } else {
            out.push(format!("if {cond} then"));
        }
    }

    fn truth(&self, reg: usize, c: usize) -> String {
        let value = self.value_of(reg);
        if c != 0 { value } else { format!("not {value}") }
    }

    fn call(&mut self, a: usize, b: usize, c: usize, out: &mut Vec<String>) {
        let func = self.value_of(a);
        // A SELF-produced method already carries its receiver in the `obj:m` form.
        let first_arg = if self.registers.is_method(a) { a + 2 } else { a + 1 };
        let args: Vec<String> = match b {
            0 => vec!["...".to_string()],
            _ => (first_arg..a + b).map(|r| self.value_of(r)).collect(),
        };
        let call = format!("{func}({})", args.join(", "));

        match c {
            0 | 1 => out.push(call),
            _ => {
                let names: Vec<String> = (a..a + c - 1).map(|r| self.assign(r)).collect();
                out.push(format!("local {} = {call}", names.join(", ")));
            }
        }
    }

    fn closure(&mut self, a: usize, inst: &Instruction, children: &[String], out: &mut Vec<String>) {
        let index = (inst.bx & 0x1FF) as i64 - 1;
        let name = self.assign(a);
        let child = usize::try_from(index)
            .ok()
            .and_then(|i| children.get(i).map(|text| (i, text)));
        match child {
            // Each child is spliced once; later references point back at it.
            Some((i, _)) if self.spliced.contains(&i) => {
                out.push(format!("local {name} = function() end -- child {i} (see above)"));
            }
            Some((i, text)) => {
                self.spliced.insert(i);
                let mut lines = text.lines();
                let header = lines.next().unwrap_or("function()");
                out.push(format!("local {name} = {header}"));
                out.extend(lines.map(str::to_string));
            }
            None => {
                out.push(format!(
                    "local {name} = function() end -- missing child {index} of {}",
                    children.len()
                ));
                self.diagnose(Diagnostic::UnresolvedOperand {
                    function: self.path.clone(),
                    pc: self.pc,
                    operation: inst.op.to_string(),
                });
            }
        }
    }

    fn constant_name_of_rk(&self, operand: u16) -> Option<String> {
        if luac::instruction::is_constant(operand) {
            let index = luac::instruction::constant_index(operand);
            match self.proto.constants.get(index) {
                Some(luac::Constant::Text(s)) => Some(s.clone()),
                _ => None,
            }
        } else {
            None
        }
    }

    fn unresolved(&mut self, inst: &Instruction, out: &mut Vec<String>) {
        out.push(operand_comment(inst));
        self.diagnose(Diagnostic::UnresolvedOperand {
            function: self.path.clone(),
            pc: self.pc,
            operation: inst.op.to_string(),
        });
    }
}

fn operand_comment(inst: &Instruction) -> String {
    format!("-- {} A={} B={} C={}", inst.op, inst.a, inst.b, inst.c)
}
