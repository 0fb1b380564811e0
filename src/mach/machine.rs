use super::{
    Address, Engine, EngineFactory, Hook, Link, Native, Op, Opcode, Operation, Script, Stack, Val,
};
use crate::error;
use crate::lang::{Error, LineNumber};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

type Result<T> = std::result::Result<T, Error>;

/// Instructions executed between two polls of the interrupt hook.
pub const POLL_INTERVAL: usize = 256;

/// ## Stack machine
///
/// The reference [`Engine`]. Executes linked scripts, keeping variables
/// in a flat table. Unassigned variables read as 0 or the empty string.
///
/// The interrupt hook is polled once every `poll_interval` instructions
/// and on every backward branch, so a stop request is seen within
/// `poll_interval` instructions plus the time of one native call.
pub struct Machine {
    ops: Vec<Op>,
    labels: HashMap<String, Address>,
    natives: HashMap<String, Native>,
    hook: Option<Hook>,
    poll_interval: usize,
    vars: HashMap<String, Val>,
    stack: Stack<Val>,
    gosub: Stack<Address>,
    line_number: Option<LineNumber>,
}

impl Default for Machine {
    fn default() -> Self {
        Machine::new()
    }
}

fn poll(hook: &mut Option<Hook>) -> Result<()> {
    match hook.as_mut() {
        Some(hook) => {
            if hook() {
                Err(error!(Break))
            } else {
                Ok(())
            }
        }
        None => Ok(()),
    }
}

impl Machine {
    pub fn new() -> Machine {
        Machine::with_poll_interval(POLL_INTERVAL)
    }

    pub fn with_poll_interval(poll_interval: usize) -> Machine {
        Machine {
            ops: vec![],
            labels: HashMap::default(),
            natives: HashMap::default(),
            hook: None,
            poll_interval: poll_interval.max(1),
            vars: HashMap::default(),
            stack: Stack::new("EXPRESSION TOO COMPLEX"),
            gosub: Stack::new("TOO MANY GOSUBS"),
            line_number: None,
        }
    }

    /// A factory building machines with the given poll interval.
    pub fn factory(poll_interval: usize) -> EngineFactory {
        Arc::new(move || -> Result<Box<dyn Engine>> {
            Ok(Box::new(Machine::with_poll_interval(poll_interval)))
        })
    }

    /// Value of a variable after a run.
    pub fn var(&self, name: &str) -> Option<&Val> {
        self.vars.get(name)
    }

    fn execute(&mut self, mut pc: Address) -> Result<()> {
        let mut countdown = self.poll_interval;
        loop {
            let op = match self.ops.get(pc) {
                Some(op) => op,
                None => return Ok(()),
            };
            countdown -= 1;
            if countdown == 0 {
                countdown = self.poll_interval;
                poll(&mut self.hook)?;
            }
            let here = pc;
            pc += 1;
            match op {
                Opcode::Label(_) => {}
                Opcode::Line(number) => self.line_number = Some(*number),
                Opcode::Literal(val) => self.stack.push(val.clone())?,
                Opcode::Push(name) => {
                    let val = match self.vars.get(name) {
                        Some(val) => val.clone(),
                        None if name.ends_with('$') => Val::String(String::new()),
                        None => Val::Number(0.0),
                    };
                    self.stack.push(val)?;
                }
                Opcode::Pop(name) => {
                    let val = self.stack.pop()?;
                    if name.ends_with('$') != matches!(val, Val::String(_)) {
                        return Err(error!(TypeMismatch));
                    }
                    self.vars.insert(name.clone(), val);
                }
                Opcode::Jump(addr) => {
                    if *addr <= here {
                        poll(&mut self.hook)?;
                    }
                    pc = *addr;
                }
                Opcode::IfNot(addr) => {
                    if !self.stack.pop()?.is_true()? {
                        pc = *addr;
                    }
                }
                Opcode::Gosub(addr) => {
                    if *addr <= here {
                        poll(&mut self.hook)?;
                    }
                    self.gosub.push(pc)?;
                    pc = *addr;
                }
                Opcode::Return => {
                    pc = match self.gosub.pop() {
                        Ok(addr) => addr,
                        Err(_) => return Err(error!(ReturnWithoutGosub)),
                    };
                }
                Opcode::Next(var, limit, step, body) => {
                    let get = |name: &str| match self.vars.get(name) {
                        Some(val) => val.number(),
                        None => Ok(0.0),
                    };
                    let (limit, step) = (get(limit.as_str())?, get(step.as_str())?);
                    let n = get(var.as_str())? + step;
                    self.vars.insert(var.clone(), Val::Number(n));
                    let more = if step >= 0.0 { n <= limit } else { n >= limit };
                    if more {
                        poll(&mut self.hook)?;
                        pc = *body;
                    }
                }
                Opcode::End => return Ok(()),
                Opcode::Call(name, argc) | Opcode::Exec(name, argc) => {
                    let args = self.stack.pop_n(*argc)?;
                    let native = match self.natives.get_mut(name) {
                        Some(native) => native,
                        None => return Err(error!(UndefinedFunction; name)),
                    };
                    let val = native(&args)?;
                    if let Opcode::Call(..) = op {
                        self.stack.push(val)?;
                    }
                }
                Opcode::Neg => {
                    let val = self.stack.pop()?;
                    self.stack.push(Operation::negate(val)?)?;
                }
                Opcode::Not => {
                    let val = self.stack.pop()?;
                    self.stack.push(Operation::not(val)?)?;
                }
                _ => {
                    let (lhs, rhs) = self.stack.pop_2()?;
                    let val = match op {
                        Opcode::Pow => Operation::power(lhs, rhs),
                        Opcode::Mul => Operation::multiply(lhs, rhs),
                        Opcode::Div => Operation::divide(lhs, rhs),
                        Opcode::Mod => Operation::modulus(lhs, rhs),
                        Opcode::Add => Operation::sum(lhs, rhs),
                        Opcode::Sub => Operation::subtract(lhs, rhs),
                        Opcode::Eq => Operation::equal(lhs, rhs),
                        Opcode::NotEq => Operation::not_equal(lhs, rhs),
                        Opcode::Lt => Operation::less(lhs, rhs),
                        Opcode::LtEq => Operation::less_equal(lhs, rhs),
                        Opcode::Gt => Operation::greater(lhs, rhs),
                        Opcode::GtEq => Operation::greater_equal(lhs, rhs),
                        Opcode::And => Operation::and(lhs, rhs),
                        Opcode::Or => Operation::or(lhs, rhs),
                        _ => Err(error!(InternalError; "UNKNOWN OPERATION")),
                    }?;
                    self.stack.push(val)?;
                }
            }
        }
    }
}

impl Engine for Machine {
    fn load(&mut self, script: &str) -> Result<()> {
        let link = Link::link(Script::parse(script)?)?;
        debug!(ops = link.ops.len(), labels = link.labels.len(), "script loaded");
        self.ops = link.ops;
        self.labels = link.labels;
        Ok(())
    }

    fn call(&mut self, entry: &str) -> Result<()> {
        let pc = match self.labels.get(entry) {
            Some(pc) => *pc,
            None => return Err(error!(UndefinedLine; &format!("NO ENTRY {}", entry))),
        };
        self.vars.clear();
        self.stack.clear();
        self.gosub.clear();
        self.line_number = None;
        self.execute(pc)
            .map_err(|e| e.or_line_number(self.line_number))
    }

    fn register_native(&mut self, name: &str, native: Native) {
        self.natives.insert(name.to_ascii_uppercase(), native);
    }

    fn set_interrupt_hook(&mut self, hook: Option<Hook>) {
        self.hook = hook;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn run(script: &str) -> (Machine, Result<()>) {
        let mut m = Machine::new();
        m.load(script).unwrap();
        let r = m.call("MAIN");
        (m, r)
    }

    #[test]
    fn test_arithmetic_and_vars() {
        let (m, r) = run("MAIN:\n LIT 2\n LIT 3\n MUL\n POP A\n PUSH B\n POP C\n");
        r.unwrap();
        assert_eq!(m.var("A"), Some(&Val::Number(6.0)));
        assert_eq!(m.var("C"), Some(&Val::Number(0.0)));
    }

    #[test]
    fn test_for_loop_runs_body_at_least_once() {
        let script = "MAIN:\n LIT 5\n POP I\n LIT 1\n POP %L1\n LIT 1\n POP %S1\nF1:\n PUSH N\n LIT 1\n ADD\n POP N\n NEXT I %L1 %S1 F1\n";
        let (m, r) = run(script);
        r.unwrap();
        assert_eq!(m.var("N"), Some(&Val::Number(1.0)));
    }

    #[test]
    fn test_runtime_error_has_line() {
        let (_, r) = run("MAIN:\n .LINE 30\n LIT 1\n LIT 0\n DIV\n");
        let e = r.unwrap_err();
        assert!(e.is(ErrorCode::DivisionByZero));
        assert_eq!(e.line_number(), Some(30));
        let (_, r) = run("MAIN:\n .LINE 40\n RETURN\n");
        assert!(r.unwrap_err().is(ErrorCode::ReturnWithoutGosub));
    }

    #[test]
    fn test_hook_breaks_infinite_loop() {
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = polls.clone();
        let mut m = Machine::with_poll_interval(16);
        m.load("MAIN:\nL10:\n .LINE 10\n JUMP L10\n").unwrap();
        m.set_interrupt_hook(Some(Box::new(move || counter.fetch_add(1, Ordering::SeqCst) >= 3)));
        let e = m.call("MAIN").unwrap_err();
        assert!(e.is(ErrorCode::Break));
        assert_eq!(e.line_number(), Some(10));
        assert_eq!(polls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_natives() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        let mut m = Machine::new();
        m.register_native(
            "twice",
            Box::new(|args: &[Val]| Ok(Val::Number(args[0].number()? * 2.0))),
        );
        m.register_native(
            "MARK",
            Box::new(move |_: &[Val]| {
                flag.store(true, Ordering::SeqCst);
                Ok(Val::FALSE)
            }),
        );
        m.load("MAIN:\n LIT 21\n CALL TWICE 1\n POP A\n EXEC MARK 0\n EXEC NOPE 0\n")
            .unwrap();
        let e = m.call("MAIN").unwrap_err();
        assert!(e.is(ErrorCode::UndefinedFunction));
        assert_eq!(m.var("A"), Some(&Val::Number(42.0)));
        assert!(called.load(Ordering::SeqCst));
    }
}
