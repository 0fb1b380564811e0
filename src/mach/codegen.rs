use super::{Label, Opcode, Stack, Val, ENTRY};
use crate::error;
use crate::lang::ast::{Expression, Program, Statement, Target, Variable};
use crate::lang::{Column, Error, LineNumber};

type Result<T> = std::result::Result<T, Error>;

/// Generate intermediate code for a checked program.
///
/// Each line starts with a `L<number>` label and a `.LINE` marker. The
/// entry label comes first and the code ends with END so falling off the
/// last line stops the program.
pub fn codegen(program: &Program) -> Result<Vec<Opcode>> {
    let mut gen = Codegen::new();
    gen.prog.push(Opcode::Label(ENTRY.to_string()))?;
    for line in &program.lines {
        gen.prog.push(Opcode::Label(line_label(line.number)))?;
        gen.prog.push(Opcode::Line(line.number))?;
        for statement in &line.statements {
            gen.statement(statement)
                .map_err(|e| e.in_line_number(line.number))?;
        }
    }
    gen.prog.push(Opcode::End)?;
    if let Some((_, var)) = gen.loops.pop() {
        return Err(error!(ForWithoutNext; &var));
    }
    Ok(gen.prog.into_vec())
}

pub fn line_label(number: LineNumber) -> Label {
    format!("L{}", number)
}

struct Codegen {
    prog: Stack<Opcode>,
    loops: Vec<(usize, String)>,
    loop_count: usize,
    branch_count: usize,
}

impl Codegen {
    fn new() -> Codegen {
        Codegen {
            prog: Stack::new("PROGRAM TOO LARGE"),
            loops: vec![],
            loop_count: 0,
            branch_count: 0,
        }
    }

    fn expression(&mut self, expr: &Expression) -> Result<()> {
        fn binary(this: &mut Codegen, lhs: &Expression, rhs: &Expression, op: Opcode) -> Result<()> {
            this.expression(lhs)?;
            this.expression(rhs)?;
            this.prog.push(op)
        }
        use Expression::*;
        match expr {
            Number(_, n) => self.prog.push(Opcode::Literal(Val::Number(*n))),
            String(_, s) => self.prog.push(Opcode::Literal(Val::String(s.clone()))),
            Char(_, c) => self.prog.push(Opcode::Literal(Val::String(c.to_string()))),
            Var(_, name) => self.prog.push(Opcode::Push(name.clone())),
            Function(_, name, args) => {
                for arg in args {
                    self.expression(arg)?;
                }
                self.prog.push(Opcode::Call(name.clone(), args.len()))
            }
            Negation(_, expr) => {
                self.expression(expr)?;
                self.prog.push(Opcode::Neg)
            }
            Not(_, expr) => {
                self.expression(expr)?;
                self.prog.push(Opcode::Not)
            }
            Power(_, lhs, rhs) => binary(self, lhs, rhs, Opcode::Pow),
            Multiply(_, lhs, rhs) => binary(self, lhs, rhs, Opcode::Mul),
            Divide(_, lhs, rhs) => binary(self, lhs, rhs, Opcode::Div),
            Modulus(_, lhs, rhs) => binary(self, lhs, rhs, Opcode::Mod),
            Add(_, lhs, rhs) => binary(self, lhs, rhs, Opcode::Add),
            Subtract(_, lhs, rhs) => binary(self, lhs, rhs, Opcode::Sub),
            Equal(_, lhs, rhs) => binary(self, lhs, rhs, Opcode::Eq),
            NotEqual(_, lhs, rhs) => binary(self, lhs, rhs, Opcode::NotEq),
            Less(_, lhs, rhs) => binary(self, lhs, rhs, Opcode::Lt),
            LessEqual(_, lhs, rhs) => binary(self, lhs, rhs, Opcode::LtEq),
            Greater(_, lhs, rhs) => binary(self, lhs, rhs, Opcode::Gt),
            GreaterEqual(_, lhs, rhs) => binary(self, lhs, rhs, Opcode::GtEq),
            And(_, lhs, rhs) => binary(self, lhs, rhs, Opcode::And),
            Or(_, lhs, rhs) => binary(self, lhs, rhs, Opcode::Or),
        }
    }

    fn statement(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::Call(_, name, args) => self.r#exec(name, args),
            Statement::End(_) => self.prog.push(Opcode::End),
            Statement::For(_, var, from, to, step) => self.r#for(var, from, to, step.as_ref()),
            Statement::Gosub(_, target) => self.prog.push(Opcode::Gosub(target_label(target))),
            Statement::Goto(_, target) => self.prog.push(Opcode::Jump(target_label(target))),
            Statement::If(_, predicate, then_stmts, else_stmts) => {
                self.r#if(predicate, then_stmts, else_stmts)
            }
            Statement::Let(_, var, expr) => {
                self.expression(expr)?;
                self.prog.push(Opcode::Pop(var.name.clone()))
            }
            Statement::Next(col, var) => self.r#next(col, var.as_ref()),
            Statement::Print(_, exprs) => self.r#exec("PRINT", exprs),
            Statement::Rem(_) => Ok(()),
            Statement::Return(_) => self.prog.push(Opcode::Return),
        }
    }

    fn r#exec(&mut self, name: &str, args: &[Expression]) -> Result<()> {
        for arg in args {
            self.expression(arg)?;
        }
        self.prog.push(Opcode::Exec(name.to_string(), args.len()))
    }

    fn r#if(&mut self, predicate: &Expression, then_stmts: &[Statement], else_stmts: &[Statement]) -> Result<()> {
        self.branch_count += 1;
        let else_label = format!("E{}", self.branch_count);
        let exit_label = format!("X{}", self.branch_count);
        self.expression(predicate)?;
        self.prog.push(Opcode::IfNot(else_label.clone()))?;
        for stmt in then_stmts {
            self.statement(stmt)?;
        }
        if else_stmts.is_empty() {
            return self.prog.push(Opcode::Label(else_label));
        }
        self.prog.push(Opcode::Jump(exit_label.clone()))?;
        self.prog.push(Opcode::Label(else_label))?;
        for stmt in else_stmts {
            self.statement(stmt)?;
        }
        self.prog.push(Opcode::Label(exit_label))
    }

    fn r#for(
        &mut self,
        var: &Variable,
        from: &Expression,
        to: &Expression,
        step: Option<&Expression>,
    ) -> Result<()> {
        self.loop_count += 1;
        let k = self.loop_count;
        self.expression(from)?;
        self.prog.push(Opcode::Pop(var.name.clone()))?;
        self.expression(to)?;
        self.prog.push(Opcode::Pop(format!("%L{}", k)))?;
        match step {
            Some(step) => self.expression(step)?,
            None => self.prog.push(Opcode::Literal(Val::Number(1.0)))?,
        }
        self.prog.push(Opcode::Pop(format!("%S{}", k)))?;
        self.prog.push(Opcode::Label(format!("F{}", k)))?;
        self.loops.push((k, var.name.clone()));
        Ok(())
    }

    fn r#next(&mut self, col: &Column, var: Option<&Variable>) -> Result<()> {
        let (k, name) = match self.loops.pop() {
            Some(pair) => pair,
            None => return Err(error!(NextWithoutFor, ..col)),
        };
        if let Some(var) = var {
            if var.name != name {
                return Err(error!(NextWithoutFor, ..&var.col; &var.name));
            }
        }
        self.prog.push(Opcode::Next(
            name,
            format!("%L{}", k),
            format!("%S{}", k),
            format!("F{}", k),
        ))
    }
}

fn target_label(target: &Target) -> Label {
    line_label(target.line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::{lex, parse};

    fn gen(s: &str) -> Vec<String> {
        let program = parse(&lex(s).unwrap()).unwrap();
        codegen(&program)
            .unwrap()
            .iter()
            .map(|op| op.to_string())
            .collect()
    }

    #[test]
    fn test_let_and_print() {
        assert_eq!(
            gen("10 A=3*B: PRINT A"),
            vec![
                "MAIN:", "L10:", ".LINE 10", "LIT 3", "PUSH B", "MUL", "POP A", "PUSH A",
                "LIT \"\\n\"", "EXEC PRINT 2", "END"
            ]
        );
    }

    #[test]
    fn test_for_next() {
        assert_eq!(
            gen("10 FOR I=1 TO 3\n20 NEXT"),
            vec![
                "MAIN:", "L10:", ".LINE 10", "LIT 1", "POP I", "LIT 3", "POP %L1", "LIT 1",
                "POP %S1", "F1:", "L20:", ".LINE 20", "NEXT I %L1 %S1 F1", "END"
            ]
        );
    }

    #[test]
    fn test_if_else() {
        assert_eq!(
            gen("10 IF A THEN 10 ELSE END"),
            vec![
                "MAIN:", "L10:", ".LINE 10", "PUSH A", "IFNOT E1", "JUMP L10", "JUMP X1", "E1:",
                "END", "X1:", "END"
            ]
        );
    }
}
