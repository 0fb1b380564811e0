use super::{Column, LineNumber};

/// A parsed program, lines in ascending order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub lines: Vec<ProgramLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramLine {
    pub number: LineNumber,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Call(Column, String, Vec<Expression>),
    End(Column),
    For(Column, Variable, Expression, Expression, Option<Expression>),
    Gosub(Column, Target),
    Goto(Column, Target),
    If(Column, Expression, Vec<Statement>, Vec<Statement>),
    Let(Column, Variable, Expression),
    Next(Column, Option<Variable>),
    Print(Column, Vec<Expression>),
    Rem(Column),
    Return(Column),
}

/// A line number operand of GOTO, GOSUB, THEN or ELSE.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub col: Column,
    pub line: LineNumber,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub col: Column,
    pub name: String,
}

impl Variable {
    pub fn is_string(&self) -> bool {
        self.name.ends_with('$')
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Number(Column, f64),
    String(Column, String),
    Char(Column, char),
    Var(Column, String),
    Function(Column, String, Vec<Expression>),
    Negation(Column, Box<Expression>),
    Not(Column, Box<Expression>),
    Power(Column, Box<Expression>, Box<Expression>),
    Multiply(Column, Box<Expression>, Box<Expression>),
    Divide(Column, Box<Expression>, Box<Expression>),
    Modulus(Column, Box<Expression>, Box<Expression>),
    Add(Column, Box<Expression>, Box<Expression>),
    Subtract(Column, Box<Expression>, Box<Expression>),
    Equal(Column, Box<Expression>, Box<Expression>),
    NotEqual(Column, Box<Expression>, Box<Expression>),
    Less(Column, Box<Expression>, Box<Expression>),
    LessEqual(Column, Box<Expression>, Box<Expression>),
    Greater(Column, Box<Expression>, Box<Expression>),
    GreaterEqual(Column, Box<Expression>, Box<Expression>),
    And(Column, Box<Expression>, Box<Expression>),
    Or(Column, Box<Expression>, Box<Expression>),
}

impl Expression {
    pub fn column(&self) -> Column {
        use Expression::*;
        match self {
            Number(col, ..)
            | String(col, ..)
            | Char(col, ..)
            | Var(col, ..)
            | Function(col, ..)
            | Negation(col, ..)
            | Not(col, ..)
            | Power(col, ..)
            | Multiply(col, ..)
            | Divide(col, ..)
            | Modulus(col, ..)
            | Add(col, ..)
            | Subtract(col, ..)
            | Equal(col, ..)
            | NotEqual(col, ..)
            | Less(col, ..)
            | LessEqual(col, ..)
            | Greater(col, ..)
            | GreaterEqual(col, ..)
            | And(col, ..)
            | Or(col, ..) => col.clone(),
        }
    }
}

impl Statement {
    pub fn column(&self) -> Column {
        use Statement::*;
        match self {
            Call(col, ..)
            | End(col)
            | For(col, ..)
            | Gosub(col, ..)
            | Goto(col, ..)
            | If(col, ..)
            | Let(col, ..)
            | Next(col, ..)
            | Print(col, ..)
            | Rem(col)
            | Return(col) => col.clone(),
        }
    }

    /// Control never reaches the statement after this one on the same line.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Statement::End(_) | Statement::Goto(..) | Statement::Return(_)
        )
    }
}

pub trait Visitor {
    fn visit_statement(&mut self, _: &Statement) {}
    fn visit_variable(&mut self, _: &Variable) {}
    fn visit_target(&mut self, _: &Target) {}
    fn visit_expression(&mut self, _: &Expression) {}
}

pub trait AcceptVisitor {
    fn accept<V: Visitor>(&self, visitor: &mut V);
}

impl AcceptVisitor for Variable {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        visitor.visit_variable(self)
    }
}

impl AcceptVisitor for Target {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        visitor.visit_target(self)
    }
}

impl AcceptVisitor for Statement {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        use Statement::*;
        match self {
            End(_) | Rem(_) | Return(_) => {}
            Call(_, _, vec_expr) | Print(_, vec_expr) => {
                for expr in vec_expr {
                    expr.accept(visitor);
                }
            }
            For(_, var, from, to, step) => {
                var.accept(visitor);
                from.accept(visitor);
                to.accept(visitor);
                if let Some(step) = step {
                    step.accept(visitor);
                }
            }
            Gosub(_, target) | Goto(_, target) => target.accept(visitor),
            If(_, predicate, then_stmts, else_stmts) => {
                predicate.accept(visitor);
                for stmt in then_stmts {
                    stmt.accept(visitor);
                }
                for stmt in else_stmts {
                    stmt.accept(visitor);
                }
            }
            Let(_, var, expr) => {
                var.accept(visitor);
                expr.accept(visitor);
            }
            Next(_, var) => {
                if let Some(var) = var {
                    var.accept(visitor);
                }
            }
        }
        visitor.visit_statement(self)
    }
}

impl AcceptVisitor for Expression {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        use Expression::*;
        match self {
            Number(..) | String(..) | Char(..) | Var(..) => {}
            Function(_, _, vec_expr) => {
                for expr in vec_expr {
                    expr.accept(visitor);
                }
            }
            Negation(_, expr) | Not(_, expr) => expr.accept(visitor),
            Power(_, expr1, expr2)
            | Multiply(_, expr1, expr2)
            | Divide(_, expr1, expr2)
            | Modulus(_, expr1, expr2)
            | Add(_, expr1, expr2)
            | Subtract(_, expr1, expr2)
            | Equal(_, expr1, expr2)
            | NotEqual(_, expr1, expr2)
            | Less(_, expr1, expr2)
            | LessEqual(_, expr1, expr2)
            | Greater(_, expr1, expr2)
            | GreaterEqual(_, expr1, expr2)
            | And(_, expr1, expr2)
            | Or(_, expr1, expr2) => {
                expr1.accept(visitor);
                expr2.accept(visitor);
            }
        }
        visitor.visit_expression(self)
    }
}
