use super::ast::*;
use super::registry::{Registry, Type};
use super::{Column, Error, LineNumber};
use std::collections::BTreeSet;

type Result<T> = std::result::Result<T, Error>;

/// Check a parsed program against the line table, the native registry
/// and the string/number type rules. The program is returned unchanged.
pub fn analyze(program: Program, registry: &Registry) -> Result<Program> {
    let mut checker = Checker {
        registry,
        lines: program.lines.iter().map(|l| l.number).collect(),
        loops: vec![],
        line_number: 0,
    };
    for line in &program.lines {
        checker.line_number = line.number;
        for statement in &line.statements {
            checker
                .statement(statement)
                .map_err(|e| e.or_line_number(Some(line.number)))?;
        }
    }
    if let Some((line, col, name)) = checker.loops.pop() {
        return Err(error!(ForWithoutNext, line, ..&col; &name));
    }
    Ok(program)
}

struct Checker<'a> {
    registry: &'a Registry,
    lines: BTreeSet<LineNumber>,
    loops: Vec<(LineNumber, Column, String)>,
    line_number: LineNumber,
}

fn type_of_var(name: &str) -> Type {
    if name.ends_with('$') {
        Type::String
    } else {
        Type::Number
    }
}

impl<'a> Checker<'a> {
    fn statement(&mut self, statement: &Statement) -> Result<()> {
        use Statement::*;
        match statement {
            End(_) | Rem(_) | Return(_) => Ok(()),
            Goto(_, target) | Gosub(_, target) => self.target(target),
            Print(_, exprs) => {
                for expr in exprs {
                    self.expression(expr)?;
                }
                Ok(())
            }
            Let(_, var, expr) => {
                let ty = self.expression(expr)?;
                if ty != type_of_var(&var.name) {
                    return Err(error!(TypeMismatch, ..&expr.column()));
                }
                Ok(())
            }
            If(_, predicate, then_stmts, else_stmts) => {
                self.number(predicate)?;
                for stmt in then_stmts.iter().chain(else_stmts.iter()) {
                    self.statement(stmt)?;
                }
                Ok(())
            }
            For(col, var, from, to, step) => {
                if var.is_string() {
                    return Err(error!(TypeMismatch, ..&var.col));
                }
                self.number(from)?;
                self.number(to)?;
                if let Some(step) = step {
                    self.number(step)?;
                }
                self.loops
                    .push((self.line_number, col.clone(), var.name.clone()));
                Ok(())
            }
            Next(col, var) => {
                match (self.loops.pop(), var) {
                    (Some((_, _, name)), Some(var)) if name != var.name => {
                        Err(error!(NextWithoutFor, ..&var.col; &var.name))
                    }
                    (Some(_), _) => Ok(()),
                    (None, _) => Err(error!(NextWithoutFor, ..col)),
                }
            }
            Call(col, name, args) => {
                self.call(col, name, args)?;
                Ok(())
            }
        }
    }

    fn target(&self, target: &Target) -> Result<()> {
        if self.lines.contains(&target.line) {
            Ok(())
        } else {
            Err(error!(UndefinedLine, ..&target.col; &target.line.to_string()))
        }
    }

    fn number(&self, expr: &Expression) -> Result<()> {
        match self.expression(expr)? {
            Type::Number => Ok(()),
            Type::String => Err(error!(TypeMismatch, ..&expr.column())),
        }
    }

    fn call(&self, col: &Column, name: &str, args: &[Expression]) -> Result<Option<Type>> {
        let signature = match self.registry.get(name) {
            Some(signature) => signature,
            None => return Err(error!(UndefinedFunction, ..col; name)),
        };
        if !signature.arity.contains(&args.len()) {
            return Err(error!(IllegalFunctionCall, ..col; "WRONG NUMBER OF ARGUMENTS"));
        }
        for (index, arg) in args.iter().enumerate() {
            let ty = self.expression(arg)?;
            if let Some(expected) = signature.param(index) {
                if ty != expected {
                    return Err(error!(TypeMismatch, ..&arg.column()));
                }
            }
        }
        Ok(signature.returns)
    }

    fn expression(&self, expr: &Expression) -> Result<Type> {
        use Expression::*;
        match expr {
            Number(..) => Ok(Type::Number),
            String(..) | Char(..) => Ok(Type::String),
            Var(_, name) => Ok(type_of_var(name)),
            Function(col, name, args) => match self.call(col, name, args)? {
                Some(ty) => Ok(ty),
                None => Err(error!(IllegalFunctionCall, ..col; "NO VALUE")),
            },
            Negation(_, expr) | Not(_, expr) => {
                self.number(expr)?;
                Ok(Type::Number)
            }
            Add(col, lhs, rhs) => {
                let (l, r) = (self.expression(lhs)?, self.expression(rhs)?);
                if l != r {
                    return Err(error!(TypeMismatch, ..col));
                }
                Ok(l)
            }
            Equal(col, lhs, rhs)
            | NotEqual(col, lhs, rhs)
            | Less(col, lhs, rhs)
            | LessEqual(col, lhs, rhs)
            | Greater(col, lhs, rhs)
            | GreaterEqual(col, lhs, rhs) => {
                if self.expression(lhs)? != self.expression(rhs)? {
                    return Err(error!(TypeMismatch, ..col));
                }
                Ok(Type::Number)
            }
            Power(_, lhs, rhs)
            | Multiply(_, lhs, rhs)
            | Divide(_, lhs, rhs)
            | Modulus(_, lhs, rhs)
            | Subtract(_, lhs, rhs)
            | And(_, lhs, rhs)
            | Or(_, lhs, rhs) => {
                self.number(lhs)?;
                self.number(rhs)?;
                Ok(Type::Number)
            }
        }
    }
}
