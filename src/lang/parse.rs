use super::{ast::*, token::*, Column, Error, Lexed, LineNumber};

type Result<T> = std::result::Result<T, Error>;

pub fn parse(lines: &[Lexed]) -> Result<Program> {
    let mut program = Program::default();
    for line in lines {
        match Parser::parse(&line.tokens) {
            Ok(statements) => program.lines.push(ProgramLine {
                number: line.number,
                statements,
            }),
            Err(e) => return Err(e.in_line_number(line.number)),
        }
    }
    Ok(program)
}

struct Parser<'a> {
    tokens: &'a [(Column, Token)],
    pos: usize,
    col: Column,
}

impl<'a> Parser<'a> {
    fn parse(tokens: &'a [(Column, Token)]) -> Result<Vec<Statement>> {
        let mut parse = Parser {
            tokens,
            pos: 0,
            col: 0..0,
        };
        let mut r: Vec<Statement> = vec![];
        loop {
            match parse.peek() {
                None => return Ok(r),
                Some(Token::Colon) => {
                    parse.next();
                    continue;
                }
                Some(_) => {}
            }
            let statement = parse.statement().map_err(|e| e.in_column(&parse.col))?;
            r.push(statement);
            match parse.peek() {
                None | Some(Token::Colon) => {}
                Some(_) => {
                    parse.next();
                    return Err(error!(SyntaxError, ..&parse.col; "EXPECTED END OF STATEMENT"));
                }
            }
        }
    }

    fn column(&self) -> Column {
        self.col.clone()
    }

    fn next(&mut self) -> Option<&'a Token> {
        let (col, token) = self.tokens.get(self.pos)?;
        self.pos += 1;
        self.col = col.clone();
        Some(token)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.peek(),
            None | Some(Token::Colon) | Some(Token::Word(Word::Else))
        )
    }

    fn statement(&mut self) -> Result<Statement> {
        let token = match self.next() {
            Some(t) => t,
            None => return Err(error!(SyntaxError; "EXPECTED STATEMENT")),
        };
        let column = self.column();
        match token {
            Token::Ident(name) => {
                if let Some(Token::Operator(Operator::Equal)) = self.peek() {
                    let var = Variable {
                        col: column.clone(),
                        name: name.clone(),
                    };
                    Statement::r#assign(self, column, var)
                } else {
                    Statement::r#call(self, column, name)
                }
            }
            Token::Remark(_) => Ok(Statement::Rem(column)),
            Token::Word(word) => Statement::for_word(self, column, *word),
            _ => Err(error!(SyntaxError; "EXPECTED STATEMENT")),
        }
    }

    fn expression(&mut self) -> Result<Expression> {
        self.binary(0)
    }

    fn binary(&mut self, min_precedence: usize) -> Result<Expression> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Operator(op)) => *op,
                _ => break,
            };
            let precedence = match Expression::op_precedence(op) {
                Some(p) if p >= min_precedence => p,
                _ => break,
            };
            self.next();
            let column = self.column();
            let rhs = if op == Operator::Caret {
                self.binary(precedence)?
            } else {
                self.binary(precedence + 1)?
            };
            lhs = Expression::for_binary_op(column, op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expression> {
        match self.next() {
            Some(Token::Operator(Operator::Minus)) => {
                let column = self.column();
                let expr = self.binary(7)?;
                Ok(Expression::Negation(column, Box::new(expr)))
            }
            Some(Token::Operator(Operator::Plus)) => self.binary(7),
            Some(Token::Operator(Operator::Not)) => {
                let column = self.column();
                let expr = self.binary(3)?;
                Ok(Expression::Not(column, Box::new(expr)))
            }
            Some(Token::LParen) => {
                let expr = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Some(Token::Ident(name)) => {
                let column = self.column();
                match self.peek() {
                    Some(Token::LParen) => {
                        let args = self.expression_list()?;
                        Ok(Expression::Function(column, name.clone(), args))
                    }
                    _ => Ok(Expression::Var(column, name.clone())),
                }
            }
            Some(Token::Literal(Literal::Number(s))) => match s.parse::<f64>() {
                Ok(n) => Ok(Expression::Number(self.column(), n)),
                Err(_) => Err(error!(SyntaxError; "MALFORMED NUMBER")),
            },
            Some(Token::Literal(Literal::String(s))) => {
                Ok(Expression::String(self.column(), s.clone()))
            }
            _ => Err(error!(SyntaxError; "EXPECTED EXPRESSION")),
        }
    }

    fn expression_list(&mut self) -> Result<Vec<Expression>> {
        self.expect(Token::LParen)?;
        let mut v: Vec<Expression> = vec![];
        if let Some(Token::RParen) = self.peek() {
            self.next();
            return Ok(v);
        }
        loop {
            v.push(self.expression()?);
            match self.next() {
                Some(Token::RParen) => return Ok(v),
                Some(Token::Comma) => continue,
                _ => return Err(error!(SyntaxError; "EXPECTED END OR SEPARATOR")),
            }
        }
    }

    fn printer_list(&mut self) -> Result<Vec<Expression>> {
        let mut v: Vec<Expression> = vec![];
        let mut linefeed = true;
        loop {
            if self.at_statement_end() {
                if linefeed {
                    let mut column = self.column();
                    column.start = column.end;
                    v.push(Expression::Char(column, '\n'));
                }
                return Ok(v);
            }
            match self.peek() {
                Some(Token::Semicolon) => {
                    linefeed = false;
                    self.next();
                }
                Some(Token::Comma) => {
                    linefeed = false;
                    self.next();
                    v.push(Expression::Char(self.column(), '\t'));
                }
                _ => {
                    linefeed = true;
                    v.push(self.expression()?);
                }
            };
        }
    }

    fn variable(&mut self) -> Result<Variable> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(Variable {
                col: self.column(),
                name: name.clone(),
            }),
            _ => Err(error!(SyntaxError; "EXPECTED VARIABLE")),
        }
    }

    fn target(&mut self) -> Result<Target> {
        match self.next() {
            Some(Token::Literal(Literal::Number(s))) => match s.parse::<LineNumber>() {
                Ok(line) => Ok(Target {
                    col: self.column(),
                    line,
                }),
                Err(_) => Err(error!(UndefinedLine; "INVALID LINE NUMBER")),
            },
            _ => Err(error!(SyntaxError; "EXPECTED LINE NUMBER")),
        }
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        if let Some(t) = self.next() {
            if *t == token {
                return Ok(());
            }
        }
        Err(error!(SyntaxError;
            match token {
                Token::Literal(_) => "EXPECTED LITERAL",
                Token::Word(Word::Then) => "EXPECTED THEN",
                Token::Word(Word::To) => "EXPECTED TO",
                Token::Word(_) => "EXPECTED RESERVED WORD",
                Token::Operator(_) => "EXPECTED OPERATOR",
                Token::Ident(_) => "EXPECTED IDENTIFIER",
                Token::Remark(_) => "UNEXPECTED TOKEN",
                Token::LParen => "EXPECTED LEFT PARENTHESIS",
                Token::RParen => "EXPECTED RIGHT PARENTHESIS",
                Token::Comma => "EXPECTED COMMA",
                Token::Colon => "EXPECTED COLON",
                Token::Semicolon => "EXPECTED SEMICOLON",
            }
        ))
    }
}

impl Expression {
    fn for_binary_op(col: Column, op: Operator, lhs: Expression, rhs: Expression) -> Expression {
        use Operator::*;
        let (lhs, rhs) = (Box::new(lhs), Box::new(rhs));
        match op {
            Caret => Expression::Power(col, lhs, rhs),
            Multiply => Expression::Multiply(col, lhs, rhs),
            Divide => Expression::Divide(col, lhs, rhs),
            Modulus => Expression::Modulus(col, lhs, rhs),
            Plus => Expression::Add(col, lhs, rhs),
            Minus => Expression::Subtract(col, lhs, rhs),
            Equal => Expression::Equal(col, lhs, rhs),
            NotEqual => Expression::NotEqual(col, lhs, rhs),
            Less => Expression::Less(col, lhs, rhs),
            LessEqual => Expression::LessEqual(col, lhs, rhs),
            Greater => Expression::Greater(col, lhs, rhs),
            GreaterEqual => Expression::GreaterEqual(col, lhs, rhs),
            And => Expression::And(col, lhs, rhs),
            Or => Expression::Or(col, lhs, rhs),
            Not => unreachable!("NOT is never binary"),
        }
    }

    fn op_precedence(op: Operator) -> Option<usize> {
        use Operator::*;
        match op {
            Or => Some(1),
            And => Some(2),
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual => Some(4),
            Plus | Minus => Some(5),
            Multiply | Divide | Modulus => Some(6),
            Caret => Some(8),
            Not => None,
        }
    }
}

impl Statement {
    fn for_word(parse: &mut Parser, column: Column, word: Word) -> Result<Statement> {
        use Word::*;
        match word {
            Print => Ok(Statement::Print(column, parse.printer_list()?)),
            Let => {
                let var = parse.variable()?;
                Self::r#assign(parse, column, var)
            }
            Goto => Ok(Statement::Goto(column, parse.target()?)),
            Gosub => Ok(Statement::Gosub(column, parse.target()?)),
            Return => Ok(Statement::Return(column)),
            End => Ok(Statement::End(column)),
            If => Self::r#if(parse, column),
            For => Self::r#for(parse, column),
            Next => Self::r#next(parse, column),
            Rem => {
                if let Some(Token::Remark(_)) = parse.peek() {
                    parse.next();
                }
                Ok(Statement::Rem(column))
            }
            Else | Step | Then | To => Err(error!(SyntaxError; "EXPECTED STATEMENT")),
        }
    }

    fn r#assign(parse: &mut Parser, column: Column, var: Variable) -> Result<Statement> {
        parse.expect(Token::Operator(Operator::Equal))?;
        let expr = parse.expression()?;
        Ok(Statement::Let(column, var, expr))
    }

    fn r#call(parse: &mut Parser, column: Column, name: &str) -> Result<Statement> {
        let mut args = vec![];
        if let Some(Token::LParen) = parse.peek() {
            args = parse.expression_list()?;
        } else if !parse.at_statement_end() {
            loop {
                args.push(parse.expression()?);
                match parse.peek() {
                    Some(Token::Comma) => {
                        parse.next();
                    }
                    _ => break,
                }
            }
        }
        Ok(Statement::Call(column, name.to_string(), args))
    }

    fn r#if(parse: &mut Parser, column: Column) -> Result<Statement> {
        let predicate = parse.expression()?;
        let then_stmts = match parse.peek() {
            Some(Token::Word(Word::Goto)) => {
                parse.next();
                let goto_col = parse.column();
                vec![Statement::Goto(goto_col, parse.target()?)]
            }
            _ => {
                parse.expect(Token::Word(Word::Then))?;
                Self::branch(parse)?
            }
        };
        let else_stmts = match parse.peek() {
            Some(Token::Word(Word::Else)) => {
                parse.next();
                Self::branch(parse)?
            }
            _ => vec![],
        };
        Ok(Statement::If(column, predicate, then_stmts, else_stmts))
    }

    /// The body of THEN or ELSE: a bare line number or statements up to
    /// ELSE or the end of the line.
    fn branch(parse: &mut Parser) -> Result<Vec<Statement>> {
        if let Some(Token::Literal(Literal::Number(_))) = parse.peek() {
            let target = parse.target()?;
            return Ok(vec![Statement::Goto(target.col.clone(), target)]);
        }
        let mut stmts = vec![];
        loop {
            match parse.peek() {
                None | Some(Token::Word(Word::Else)) => return Ok(stmts),
                Some(Token::Colon) => {
                    parse.next();
                }
                Some(_) => stmts.push(parse.statement()?),
            }
        }
    }

    fn r#for(parse: &mut Parser, column: Column) -> Result<Statement> {
        let var = parse.variable()?;
        parse.expect(Token::Operator(Operator::Equal))?;
        let from = parse.expression()?;
        parse.expect(Token::Word(Word::To))?;
        let to = parse.expression()?;
        let step = match parse.peek() {
            Some(Token::Word(Word::Step)) => {
                parse.next();
                Some(parse.expression()?)
            }
            _ => None,
        };
        Ok(Statement::For(column, var, from, to, step))
    }

    fn r#next(parse: &mut Parser, column: Column) -> Result<Statement> {
        if parse.at_statement_end() {
            return Ok(Statement::Next(column, None));
        }
        Ok(Statement::Next(column, Some(parse.variable()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::super::lex;
    use super::*;

    fn parse_str(s: &str) -> Vec<Statement> {
        let lexed = lex(&format!("10 {}", s)).unwrap();
        match parse(&lexed) {
            Ok(mut program) => program.lines.pop().unwrap().statements,
            Err(e) => panic!("{} : {:?}", e, e),
        }
    }

    #[test]
    fn test_let_without_keyword() {
        assert_eq!(
            parse_str("A=12"),
            vec![Statement::Let(
                0..1,
                Variable {
                    col: 0..1,
                    name: "A".into()
                },
                Expression::Number(2..4, 12.0)
            )]
        );
    }

    #[test]
    fn test_precedence() {
        let stmts = parse_str("X=2-3*4");
        match &stmts[0] {
            Statement::Let(_, _, Expression::Subtract(_, lhs, rhs)) => {
                assert_eq!(**lhs, Expression::Number(2..3, 2.0));
                assert!(matches!(**rhs, Expression::Multiply(..)));
            }
            s => panic!("{:?}", s),
        }
    }

    #[test]
    fn test_printer_list() {
        assert_eq!(
            parse_str("? 1;2,"),
            vec![Statement::Print(
                0..1,
                vec![
                    Expression::Number(2..3, 1.0),
                    Expression::Number(4..5, 2.0),
                    Expression::Char(5..6, '\t'),
                ]
            )]
        );
    }

    #[test]
    fn test_if_then_line_else_statements() {
        let stmts = parse_str("IF A THEN 100 ELSE PRINT 1: B=2");
        match &stmts[0] {
            Statement::If(_, _, then_stmts, else_stmts) => {
                assert!(matches!(then_stmts[0], Statement::Goto(_, Target { line: 100, .. })));
                assert_eq!(else_stmts.len(), 2);
            }
            s => panic!("{:?}", s),
        }
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn test_native_call_statement() {
        let stmts = parse_str("CLS: BEEP 440, 2");
        assert!(matches!(&stmts[0], Statement::Call(_, name, args) if name == "CLS" && args.is_empty()));
        assert!(matches!(&stmts[1], Statement::Call(_, name, args) if name == "BEEP" && args.len() == 2));
    }

    #[test]
    fn test_error_has_line_and_column() {
        let lexed = lex("10 PRINT 1\n20 A=").unwrap();
        let e = parse(&lexed).unwrap_err();
        assert_eq!(e.line_number(), Some(20));
        assert!(e.to_string().starts_with("SYNTAX ERROR IN 20"));
    }
}
