use super::ast::*;
use crate::mach::{Operation, Val};

/// Constant folding. Operations on literals are evaluated at compile time
/// with the same arithmetic the machine uses. An operation that fails, a
/// division by zero or an overflow, is left in place so it is reported
/// when, and if, the line runs.
pub fn fold(mut program: Program) -> Program {
    for line in &mut program.lines {
        for statement in &mut line.statements {
            fold_statement(statement);
        }
    }
    program
}

fn fold_statement(statement: &mut Statement) {
    use Statement::*;
    match statement {
        End(_) | Rem(_) | Return(_) | Goto(..) | Gosub(..) | Next(..) => {}
        Call(_, _, exprs) | Print(_, exprs) => {
            for expr in exprs {
                fold_expression(expr);
            }
        }
        Let(_, _, expr) => fold_expression(expr),
        For(_, _, from, to, step) => {
            fold_expression(from);
            fold_expression(to);
            if let Some(step) = step {
                fold_expression(step);
            }
        }
        If(_, predicate, then_stmts, else_stmts) => {
            fold_expression(predicate);
            for stmt in then_stmts.iter_mut().chain(else_stmts.iter_mut()) {
                fold_statement(stmt);
            }
        }
    }
}

fn literal(expr: &Expression) -> Option<Val> {
    match expr {
        Expression::Number(_, n) => Some(Val::Number(*n)),
        Expression::String(_, s) => Some(Val::String(s.clone())),
        _ => None,
    }
}

fn fold_expression(expr: &mut Expression) {
    use Expression::*;
    let col = expr.column();
    let folded = match expr {
        Number(..) | String(..) | Char(..) | Var(..) => return,
        Function(_, _, args) => {
            for arg in args {
                fold_expression(arg);
            }
            return;
        }
        Negation(_, inner) | Not(_, inner) => {
            fold_expression(inner);
            let val = match literal(inner) {
                Some(val) => val,
                None => return,
            };
            if let Negation(..) = expr {
                Operation::negate(val)
            } else {
                Operation::not(val)
            }
        }
        Power(_, lhs, rhs)
        | Multiply(_, lhs, rhs)
        | Divide(_, lhs, rhs)
        | Modulus(_, lhs, rhs)
        | Add(_, lhs, rhs)
        | Subtract(_, lhs, rhs)
        | Equal(_, lhs, rhs)
        | NotEqual(_, lhs, rhs)
        | Less(_, lhs, rhs)
        | LessEqual(_, lhs, rhs)
        | Greater(_, lhs, rhs)
        | GreaterEqual(_, lhs, rhs)
        | And(_, lhs, rhs)
        | Or(_, lhs, rhs) => {
            fold_expression(lhs);
            fold_expression(rhs);
            let (l, r) = match (literal(lhs), literal(rhs)) {
                (Some(l), Some(r)) => (l, r),
                _ => return,
            };
            let op = match expr {
                Power(..) => Operation::power,
                Multiply(..) => Operation::multiply,
                Divide(..) => Operation::divide,
                Modulus(..) => Operation::modulus,
                Add(..) => Operation::sum,
                Subtract(..) => Operation::subtract,
                Equal(..) => Operation::equal,
                NotEqual(..) => Operation::not_equal,
                Less(..) => Operation::less,
                LessEqual(..) => Operation::less_equal,
                Greater(..) => Operation::greater,
                GreaterEqual(..) => Operation::greater_equal,
                And(..) => Operation::and,
                _ => Operation::or,
            };
            op(l, r)
        }
    };
    match folded {
        Ok(Val::Number(n)) if n.is_finite() => *expr = Number(col, n),
        Ok(Val::String(s)) => *expr = String(col, s),
        _ => {}
    }
}

/// Statement level clean up run on the checked tree: remarks go, so do
/// self assignments and anything after an END, GOTO or RETURN on the same
/// line. An IF with a constant predicate is replaced by the branch taken.
/// FOR and NEXT are never removed since they pair statically.
pub fn peephole(mut program: Program) -> Program {
    for line in &mut program.lines {
        let statements = std::mem::take(&mut line.statements);
        line.statements = peephole_statements(statements);
    }
    program
}

fn peephole_statements(statements: Vec<Statement>) -> Vec<Statement> {
    let mut out = vec![];
    let mut dead = false;
    for statement in statements {
        if dead {
            if let Statement::For(..) | Statement::Next(..) = statement {
                out.push(statement);
            }
            continue;
        }
        match statement {
            Statement::Rem(_) => {}
            Statement::Let(_, ref var, Expression::Var(_, ref name)) if var.name == *name => {}
            Statement::If(_, Expression::Number(_, n), then_stmts, else_stmts)
                if !has_loop(&then_stmts) && !has_loop(&else_stmts) =>
            {
                let taken = if n != 0.0 { then_stmts } else { else_stmts };
                for stmt in peephole_statements(taken) {
                    dead |= stmt.is_terminal();
                    out.push(stmt);
                }
            }
            Statement::If(col, predicate, then_stmts, else_stmts) => out.push(Statement::If(
                col,
                predicate,
                peephole_statements(then_stmts),
                peephole_statements(else_stmts),
            )),
            statement => {
                dead = statement.is_terminal();
                out.push(statement);
            }
        }
    }
    out
}

fn has_loop(statements: &[Statement]) -> bool {
    statements.iter().any(|s| match s {
        Statement::For(..) | Statement::Next(..) => true,
        Statement::If(_, _, t, e) => has_loop(t) || has_loop(e),
        _ => false,
    })
}
