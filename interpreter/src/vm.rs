//! The variable machine itself: one handler per opcode, driven by a
//! single scheduling loop (`step_once`) that executes the instruction at
//! `pc` and advances or jumps. The block/branch/object opcodes
//! (`ENTERBLOCK`/`EXITBLOCK`/`EXCON`, the comparison family, `OBJECT`/
//! `ATTRIBUTE`/`RETRIEVE`) have no simpler reference behavior to match,
//! so their semantics are designed against the VM's own invariants and
//! recorded as Open Question decisions in `DESIGN.md`.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, BufRead, Write};

use jg_compiler::jgc::{Instruction, Opcode, Operand, Value};

/// A loaded, ready-to-run JGC program. `functions` maps a declared label
/// to the index of its entry instruction; `labels` is scoped per
/// function, since `LABEL`/`BR` targets are only meaningful within the
/// function they were written in.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub functions: HashMap<String, usize>,
    pub labels: HashMap<String, HashMap<String, usize>>,
}

/// A named, typed storage cell. Auto-created with `type_tag = "EMPTY"`,
/// `value = Null` on first reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub type_tag: String,
    pub value: Value,
}

impl Default for Variable {
    fn default() -> Self {
        Self {
            type_tag: "EMPTY".to_string(),
            value: Value::Null,
        }
    }
}

/// One entry on the call stack. `call_site` is the index of the `FUNC`
/// instruction that pushed this frame — needed by `EXCON` to find the
/// block its caller attached via `ENTERBLOCK`/`EXITBLOCK`. `dest` is the
/// call's second operand, the variable a matching `RETURN` deposits its
/// value into.
#[derive(Debug, Clone)]
pub struct CallFrame {
    pub call_site: usize,
    pub function: String,
    pub dest: Option<String>,
}

/// Bookkeeping an `EXCON` leaves on the instruction at the end of the
/// block it jumped into: where to resume once that block finishes, and
/// which function's labels were in scope before the jump (the block
/// belongs lexically to the caller, not to the function that ran
/// `EXCON`).
#[derive(Debug, Clone)]
struct PendingReturn {
    resume_pc: usize,
    resume_scope: Option<String>,
}

enum Flow {
    Advance,
    Jump(usize),
}

/// The running machine: one variable store, one call stack, one `pc`
/// into `program.instructions`.
pub struct Interpreter {
    pub variables: HashMap<String, Variable>,
    pub stack: Vec<CallFrame>,
    pub program: Program,
    pub pc: usize,
    pub object_counters: HashMap<String, u64>,
    pending_returns: HashMap<usize, PendingReturn>,
    scope_override: Option<String>,
}

impl Interpreter {
    pub fn new(program: Program) -> Self {
        let pc = program.functions.get("main").copied().unwrap_or(0);
        Self {
            variables: HashMap::new(),
            stack: Vec::new(),
            program,
            pc,
            object_counters: HashMap::new(),
            pending_returns: HashMap::new(),
            scope_override: None,
        }
    }

    fn current_function(&self) -> String {
        self.scope_override.clone().unwrap_or_else(|| {
            self.stack
                .last()
                .map(|f| f.function.clone())
                .unwrap_or_else(|| "main".to_string())
        })
    }

    /// Runs until `pc` walks off the end of the program. `out` is the
    /// sink for `PRINT`; `input` supplies `IINPUT`'s lines.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with(&mut lines, &mut out)
    }

    pub fn run_with<R, W>(&mut self, input: &mut R, out: &mut W) -> io::Result<()>
    where
        R: Iterator<Item = io::Result<String>>,
        W: Write,
    {
        while self.step_once(input, out)? {}
        Ok(())
    }

    /// Runs a single scheduling step: either consumes an `EXCON`
    /// restore sitting at the current `pc`, or executes the current
    /// instruction and advances. Returns `false` once `pc` has run off
    /// the end of the program. Exposed for `jgi`'s `-lines` trace mode.
    pub fn step_once<R, W>(&mut self, input: &mut R, out: &mut W) -> io::Result<bool>
    where
        R: Iterator<Item = io::Result<String>>,
        W: Write,
    {
        if self.pc >= self.program.instructions.len() {
            return Ok(false);
        }

        if let Some(pending) = self.pending_returns.remove(&self.pc) {
            self.pc = pending.resume_pc;
            self.scope_override = pending.resume_scope;
            return Ok(true);
        }

        let flow = self.step(input, out)?;
        self.pc = match flow {
            Flow::Advance => self.pc + 1,
            Flow::Jump(target) => target,
        };
        Ok(true)
    }

    fn step<R, W>(&mut self, input: &mut R, out: &mut W) -> io::Result<Flow>
    where
        R: Iterator<Item = io::Result<String>>,
        W: Write,
    {
        let instr = self.program.instructions[self.pc].clone();
        match instr.opcode {
            Opcode::Func => Ok(self.exec_func(&instr)),
            Opcode::Return => Ok(self.exec_return(&instr)),
            Opcode::Insert => {
                self.exec_insert(&instr);
                Ok(Flow::Advance)
            }
            Opcode::Assign => {
                self.exec_assign(&instr);
                Ok(Flow::Advance)
            }
            Opcode::Copy => {
                self.exec_copy(&instr);
                Ok(Flow::Advance)
            }
            Opcode::Iinput => {
                self.exec_iinput(&instr, input)?;
                Ok(Flow::Advance)
            }
            Opcode::Iadd => {
                self.exec_arith(&instr, |a, b| a + b);
                Ok(Flow::Advance)
            }
            Opcode::Isub => {
                self.exec_arith(&instr, |a, b| a - b);
                Ok(Flow::Advance)
            }
            Opcode::Print => {
                self.exec_print(&instr, out)?;
                Ok(Flow::Advance)
            }
            Opcode::Gt => {
                self.exec_compare(&instr, |a, b| a > b);
                Ok(Flow::Advance)
            }
            Opcode::Lt => {
                self.exec_compare(&instr, |a, b| a < b);
                Ok(Flow::Advance)
            }
            Opcode::Eq => {
                self.exec_compare(&instr, |a, b| a == b);
                Ok(Flow::Advance)
            }
            Opcode::Ge => {
                self.exec_compare(&instr, |a, b| a >= b);
                Ok(Flow::Advance)
            }
            Opcode::Le => {
                self.exec_compare(&instr, |a, b| a <= b);
                Ok(Flow::Advance)
            }
            Opcode::Ne => {
                self.exec_compare(&instr, |a, b| a != b);
                Ok(Flow::Advance)
            }
            Opcode::Br => Ok(self.exec_br(&instr)),
            Opcode::Brgt => Ok(self.exec_branch_compare(&instr, |a, b| a > b)),
            Opcode::Brlt => Ok(self.exec_branch_compare(&instr, |a, b| a < b)),
            Opcode::Breq => Ok(self.exec_branch_compare(&instr, |a, b| a == b)),
            Opcode::Brge => Ok(self.exec_branch_compare(&instr, |a, b| a >= b)),
            Opcode::Brle => Ok(self.exec_branch_compare(&instr, |a, b| a <= b)),
            Opcode::Brne => Ok(self.exec_branch_compare(&instr, |a, b| a != b)),
            Opcode::Excon => Ok(self.exec_excon()),
            Opcode::Object => {
                self.exec_object(&instr);
                Ok(Flow::Advance)
            }
            Opcode::Attribute => {
                self.exec_attribute(&instr);
                Ok(Flow::Advance)
            }
            Opcode::Retrieve => {
                self.exec_retrieve(&instr);
                Ok(Flow::Advance)
            }
            Opcode::Enterblock | Opcode::Exitblock | Opcode::Label => Ok(Flow::Advance),
        }
    }

    // -- variable resolution -------------------------------------------------

    /// Read position: a bare name (`derefs == 0`) is the literal token
    /// itself — an integer if it parses as one, a string otherwise — not
    /// a variable lookup. `derefs >= 1` walks that many variable reads,
    /// chasing through `Value::Str` values between hops.
    fn resolve_value(&self, operand: &Operand) -> Value {
        match operand {
            Operand::Literal(v) => v.clone(),
            Operand::Name { name, derefs: 0 } => match name.parse::<i64>() {
                Ok(n) => Value::Int(n),
                Err(_) => Value::Str(name.clone()),
            },
            Operand::Name { name, derefs } => {
                let mut current = name.clone();
                let mut value = Value::Null;
                for hop in 0..*derefs {
                    value = self
                        .variables
                        .get(&current)
                        .map(|v| v.value.clone())
                        .unwrap_or(Value::Null);
                    if hop + 1 < *derefs {
                        match &value {
                            Value::Str(s) => current = s.clone(),
                            _ => break,
                        }
                    }
                }
                value
            }
        }
    }

    /// Destination position: a bare name (`derefs == 0`) is the variable
    /// to write directly. `derefs >= 1` chases that many `Str` hops and
    /// uses the last name reached — `ASSIGN @x, 5` writes through the
    /// variable `x` names, not `x` itself.
    fn resolve_name(&self, operand: &Operand) -> String {
        match operand {
            Operand::Literal(v) => v.to_string(),
            Operand::Name { name, derefs: 0 } => name.clone(),
            Operand::Name { name, derefs } => {
                let mut current = name.clone();
                for _ in 0..*derefs {
                    match self.variables.get(&current).map(|v| v.value.clone()) {
                        Some(Value::Str(s)) => current = s,
                        _ => break,
                    }
                }
                current
            }
        }
    }

    fn write_value(&mut self, name: &str, value: Value) {
        let var = self.variables.entry(name.to_string()).or_default();
        var.value = value;
    }

    fn as_int(value: &Value) -> i64 {
        match value {
            Value::Int(n) => *n,
            Value::Str(s) => s.parse::<i64>().unwrap_or(0),
            _ => 0,
        }
    }

    // -- opcode bodies ---------------------------------------------------

    fn exec_func(&mut self, instr: &Instruction) -> Flow {
        let label = match instr.operands.first() {
            Some(Operand::Name { name, .. }) => name.clone(),
            _ => return Flow::Advance,
        };
        let dest = instr.operands.get(1).map(|op| self.resolve_name(op));

        match self.program.functions.get(&label).copied() {
            Some(target) => {
                self.stack.push(CallFrame {
                    call_site: self.pc,
                    function: label,
                    dest,
                });
                Flow::Jump(target)
            }
            None => Flow::Advance,
        }
    }

    fn exec_return(&mut self, instr: &Instruction) -> Flow {
        let frame = match self.stack.pop() {
            Some(frame) => frame,
            None => return Flow::Jump(self.program.instructions.len()),
        };

        if let (Some(src_op), Some(dest_name)) = (instr.operands.first(), &frame.dest) {
            let src_name = self.resolve_name(src_op);
            if let Some(src_var) = self.variables.get(&src_name).cloned() {
                self.variables.insert(dest_name.clone(), src_var);
            }
        }

        let call_instr = &self.program.instructions[frame.call_site];
        let return_pc = match call_instr.contents {
            Some((_, end)) => end,
            None => frame.call_site + 1,
        };
        Flow::Jump(return_pc)
    }

    fn exec_insert(&mut self, instr: &Instruction) {
        let name = match instr.operands.first() {
            Some(op) => self.resolve_name(op),
            None => return,
        };
        let type_tag = match instr.operands.get(1) {
            Some(op) => match self.resolve_value(op) {
                Value::Str(s) => s,
                Value::Int(n) => n.to_string(),
                _ => "EMPTY".to_string(),
            },
            None => "EMPTY".to_string(),
        };
        self.variables.insert(
            name,
            Variable {
                type_tag,
                value: Value::Null,
            },
        );
    }

    fn exec_assign(&mut self, instr: &Instruction) {
        let name = match instr.operands.first() {
            Some(op) => self.resolve_name(op),
            None => return,
        };
        let value = match instr.operands.get(1) {
            Some(op) => self.resolve_value(op),
            None => Value::Null,
        };
        if let Some(type_op) = instr.operands.get(2) {
            let type_tag = match self.resolve_value(type_op) {
                Value::Str(s) => s,
                Value::Int(n) => n.to_string(),
                _ => "EMPTY".to_string(),
            };
            self.variables.insert(name, Variable { type_tag, value });
        } else {
            self.write_value(&name, value);
        }
    }

    fn exec_copy(&mut self, instr: &Instruction) {
        let dest = match instr.operands.first() {
            Some(op) => self.resolve_name(op),
            None => return,
        };
        let src = match instr.operands.get(1) {
            Some(op) => self.resolve_name(op),
            None => return,
        };
        let value = self
            .variables
            .get(&src)
            .map(|v| v.value.clone())
            .unwrap_or(Value::Null);
        self.write_value(&dest, value);
    }

    fn exec_iinput<R: Iterator<Item = io::Result<String>>>(
        &mut self,
        instr: &Instruction,
        input: &mut R,
    ) -> io::Result<()> {
        let name = match instr.operands.first() {
            Some(op) => self.resolve_name(op),
            None => return Ok(()),
        };
        let line = match input.next() {
            Some(line) => line?,
            None => String::new(),
        };
        let parsed = line.trim().parse::<i64>().unwrap_or(0);
        self.variables.insert(
            name,
            Variable {
                type_tag: "int".to_string(),
                value: Value::Int(parsed),
            },
        );
        Ok(())
    }

    fn exec_arith(&mut self, instr: &Instruction, op: impl Fn(i64, i64) -> i64) {
        let dest = match instr.operands.first() {
            Some(o) => self.resolve_name(o),
            None => return,
        };
        let a = instr
            .operands
            .get(1)
            .map(|o| Self::as_int(&self.resolve_value(o)))
            .unwrap_or(0);
        let b = instr
            .operands
            .get(2)
            .map(|o| Self::as_int(&self.resolve_value(o)))
            .unwrap_or(0);
        self.write_value(&dest, Value::Int(op(a, b)));
    }

    fn exec_print<W: Write>(&mut self, instr: &Instruction, out: &mut W) -> io::Result<()> {
        let value = match instr.operands.first() {
            Some(op) => self.resolve_value(op),
            None => Value::Null,
        };
        match value {
            Value::Int(n) => write!(out, "{n}")?,
            Value::Str(s) => write!(out, "{}", s.replace("\\n", "\n"))?,
            Value::Map(_) => write!(out, "<object>")?,
            Value::Null => {}
        }
        writeln!(out)?;
        Ok(())
    }

    fn exec_compare(&mut self, instr: &Instruction, op: impl Fn(i64, i64) -> bool) {
        let dest = match instr.operands.first() {
            Some(o) => self.resolve_name(o),
            None => return,
        };
        let a = instr
            .operands
            .get(1)
            .map(|o| Self::as_int(&self.resolve_value(o)))
            .unwrap_or(0);
        let b = instr
            .operands
            .get(2)
            .map(|o| Self::as_int(&self.resolve_value(o)))
            .unwrap_or(0);
        self.variables.insert(
            dest,
            Variable {
                type_tag: "bool".to_string(),
                value: Value::Int(op(a, b) as i64),
            },
        );
    }

    fn exec_br(&mut self, instr: &Instruction) -> Flow {
        let label = match instr.operands.first() {
            Some(Operand::Name { name, .. }) => name.clone(),
            _ => return Flow::Advance,
        };
        self.branch_target(&label)
            .map(Flow::Jump)
            .unwrap_or(Flow::Advance)
    }

    fn exec_branch_compare(&mut self, instr: &Instruction, op: impl Fn(i64, i64) -> bool) -> Flow {
        let a = instr
            .operands
            .first()
            .map(|o| Self::as_int(&self.resolve_value(o)))
            .unwrap_or(0);
        let b = instr
            .operands
            .get(1)
            .map(|o| Self::as_int(&self.resolve_value(o)))
            .unwrap_or(0);
        let label = match instr.operands.get(2) {
            Some(Operand::Name { name, .. }) => name.clone(),
            _ => return Flow::Advance,
        };
        if op(a, b) {
            self.branch_target(&label).map(Flow::Jump).unwrap_or(Flow::Advance)
        } else {
            Flow::Advance
        }
    }

    fn branch_target(&self, label: &str) -> Option<usize> {
        self.program
            .labels
            .get(&self.current_function())
            .and_then(|scope| scope.get(label))
            .copied()
    }

    /// Jumps into the block the current function's caller attached via
    /// `ENTERBLOCK`/`EXITBLOCK` right after the call that invoked us.
    /// Undefined by the original source outside a block-carrying call;
    /// resolved here as a no-op (see DESIGN.md).
    fn exec_excon(&mut self) -> Flow {
        let frame = match self.stack.last() {
            Some(frame) => frame.clone(),
            None => return Flow::Advance,
        };
        let contents = self.program.instructions[frame.call_site].contents;
        let (start, end) = match contents {
            Some(bounds) => bounds,
            None => return Flow::Advance,
        };

        let caller_scope = if self.stack.len() >= 2 {
            Some(self.stack[self.stack.len() - 2].function.clone())
        } else {
            None
        };
        self.pending_returns.insert(
            end,
            PendingReturn {
                resume_pc: self.pc + 1,
                resume_scope: self.scope_override.clone(),
            },
        );
        self.scope_override = caller_scope.or_else(|| Some("main".to_string()));
        Flow::Jump(start)
    }

    fn exec_object(&mut self, instr: &Instruction) {
        let dest = match instr.operands.first() {
            Some(op) => self.resolve_name(op),
            None => return,
        };
        let type_tag = self
            .variables
            .get(&dest)
            .map(|v| v.type_tag.clone())
            .unwrap_or_else(|| "EMPTY".to_string());
        let counter = self.object_counters.entry(type_tag.clone()).or_insert(0);
        *counter += 1;
        let object_name = format!("{type_tag}_{counter}");
        self.variables.insert(
            object_name.clone(),
            Variable {
                type_tag: type_tag.clone(),
                value: Value::Map(BTreeMap::new()),
            },
        );
        let dest_var = self.variables.entry(dest).or_insert_with(|| Variable {
            type_tag,
            value: Value::Null,
        });
        dest_var.value = Value::Str(object_name);
    }

    fn object_name(&self, operand: &Operand) -> Option<String> {
        match self.resolve_value(operand) {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    fn key_text(&self, operand: &Operand) -> String {
        match self.resolve_value(operand) {
            Value::Str(s) => s,
            Value::Int(n) => n.to_string(),
            _ => String::new(),
        }
    }

    fn exec_attribute(&mut self, instr: &Instruction) {
        let object_op = match instr.operands.first() {
            Some(op) => op,
            None => return,
        };
        let object_name = match self.object_name(object_op) {
            Some(name) => name,
            None => return,
        };
        let key = match instr.operands.get(1) {
            Some(op) => self.key_text(op),
            None => return,
        };
        let value = match instr.operands.get(2) {
            Some(op) => self.resolve_value(op),
            None => Value::Null,
        };
        if let Some(var) = self.variables.get_mut(&object_name) {
            if let Value::Map(map) = &mut var.value {
                map.insert(key, value);
            }
        }
    }

    fn exec_retrieve(&mut self, instr: &Instruction) {
        let dest = match instr.operands.first() {
            Some(op) => self.resolve_name(op),
            None => return,
        };
        let object_op = match instr.operands.get(1) {
            Some(op) => op,
            None => return,
        };
        let object_name = self.object_name(object_op);
        let key = match instr.operands.get(2) {
            Some(op) => self.key_text(op),
            None => return,
        };
        let value = object_name
            .and_then(|name| self.variables.get(&name).cloned())
            .and_then(|var| match var.value {
                Value::Map(map) => map.get(&key).cloned(),
                _ => None,
            })
            .unwrap_or(Value::Null);
        self.write_value(&dest, value);
    }
}

#[cfg(test)]
mod tests;
