use super::{token::*, Column, Error, LineNumber, MAX_LINE_NUMBER};

type Result<T> = std::result::Result<T, Error>;

/// One numbered source line broken into tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexed {
    pub number: LineNumber,
    pub tokens: Vec<(Column, Token)>,
}

/// Lex program text in the persisted `"<number> <content>"` form.
pub fn lex(source: &str) -> Result<Vec<Lexed>> {
    let mut lines = Vec::new();
    let mut previous: Option<LineNumber> = None;
    for text in source.lines() {
        if text.trim().is_empty() {
            continue;
        }
        let (number, content) = split_line_number(text)?;
        if let Some(prev) = previous {
            if number <= prev {
                return Err(error!(SyntaxError, number; "LINES OUT OF ORDER"));
            }
        }
        previous = Some(number);
        let tokens = lex_line(content).map_err(|e| e.in_line_number(number))?;
        lines.push(Lexed { number, tokens });
    }
    Ok(lines)
}

/// Lex the content of a single line, columns are byte offsets into `s`.
pub fn lex_line(s: &str) -> Result<Vec<(Column, Token)>> {
    BasicLexer {
        src: s,
        chars: s.char_indices().peekable(),
        remark: false,
    }
    .collect()
}

fn split_line_number(text: &str) -> Result<(LineNumber, &str)> {
    let trimmed = text.trim_start();
    let digits = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or_else(|| trimmed.len());
    if digits == 0 {
        return Err(error!(SyntaxError; "MISSING LINE NUMBER"));
    }
    let number = match trimmed[..digits].parse::<LineNumber>() {
        Ok(n) if n <= MAX_LINE_NUMBER => n,
        _ => return Err(error!(Overflow; "LINE NUMBER")),
    };
    let mut rest = &trimmed[digits..];
    if rest.starts_with(' ') {
        rest = &rest[1..];
    }
    Ok((number, rest))
}

fn is_basic_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

struct BasicLexer<'a> {
    src: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    remark: bool,
}

impl<'a> BasicLexer<'a> {
    fn pos(&mut self) -> usize {
        match self.chars.peek() {
            Some((i, _)) => *i,
            None => self.src.len(),
        }
    }

    fn number(&mut self, start: usize) -> Result<(Column, Token)> {
        let mut decimal = false;
        let mut exp = false;
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_ascii_digit() {
                self.chars.next();
            } else if ch == '.' && !decimal && !exp {
                decimal = true;
                self.chars.next();
            } else if (ch == 'E' || ch == 'e') && !exp {
                exp = true;
                self.chars.next();
                if let Some(&(_, sign)) = self.chars.peek() {
                    if sign == '+' || sign == '-' {
                        self.chars.next();
                    }
                }
            } else {
                break;
            }
        }
        let end = self.pos();
        let text = self.src[start..end].to_ascii_uppercase();
        if text.parse::<f64>().is_err() {
            return Err(error!(SyntaxError, ..&(start..end); "MALFORMED NUMBER"));
        }
        Ok((start..end, Token::Literal(Literal::Number(text))))
    }

    fn string(&mut self, start: usize) -> Result<(Column, Token)> {
        self.chars.next();
        let mut s = String::new();
        while let Some((_, ch)) = self.chars.next() {
            if ch == '"' {
                let end = self.pos();
                return Ok((start..end, Token::Literal(Literal::String(s))));
            }
            s.push(ch);
        }
        let end = self.pos();
        Err(error!(SyntaxError, ..&(start..end); "UNTERMINATED STRING"))
    }

    fn alphabetic(&mut self, start: usize) -> Result<(Column, Token)> {
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_ascii_alphabetic() {
                self.chars.next();
            } else {
                break;
            }
        }
        let word = self.src[start..self.pos()].to_ascii_uppercase();
        if let Some(token) = Token::from_word(&word) {
            if token.is_word(Word::Rem) {
                self.remark = true;
            }
            return Ok((start..self.pos(), token));
        }
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_ascii_alphanumeric() {
                self.chars.next();
            } else {
                break;
            }
        }
        if let Some(&(_, '$')) = self.chars.peek() {
            self.chars.next();
        }
        let end = self.pos();
        let name = self.src[start..end].to_ascii_uppercase();
        Ok((start..end, Token::Ident(name)))
    }

    fn minutia(&mut self, start: usize, ch: char) -> Result<(Column, Token)> {
        use Operator::*;
        self.chars.next();
        let peek = self.chars.peek().map(|&(_, c)| c);
        let token = match (ch, peek) {
            ('<', Some('>')) => {
                self.chars.next();
                Token::Operator(NotEqual)
            }
            ('<', Some('=')) => {
                self.chars.next();
                Token::Operator(LessEqual)
            }
            ('>', Some('=')) => {
                self.chars.next();
                Token::Operator(GreaterEqual)
            }
            ('<', _) => Token::Operator(Less),
            ('>', _) => Token::Operator(Greater),
            ('=', _) => Token::Operator(Equal),
            ('+', _) => Token::Operator(Plus),
            ('-', _) => Token::Operator(Minus),
            ('*', _) => Token::Operator(Multiply),
            ('/', _) => Token::Operator(Divide),
            ('^', _) => Token::Operator(Caret),
            ('(', _) => Token::LParen,
            (')', _) => Token::RParen,
            (',', _) => Token::Comma,
            (':', _) => Token::Colon,
            (';', _) => Token::Semicolon,
            ('?', _) => Token::Word(Word::Print),
            _ => {
                let end = self.pos();
                return Err(error!(SyntaxError, ..&(start..end); "UNEXPECTED CHARACTER"));
            }
        };
        Ok((start..self.pos(), token))
    }
}

impl<'a> Iterator for BasicLexer<'a> {
    type Item = Result<(Column, Token)>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&(_, ch)) = self.chars.peek() {
            if !is_basic_whitespace(ch) || self.remark {
                break;
            }
            self.chars.next();
        }
        let &(start, ch) = self.chars.peek()?;
        if self.remark || ch == '\'' {
            self.remark = false;
            let end = self.src.len();
            while self.chars.next().is_some() {}
            return Some(Ok((start..end, Token::Remark(self.src[start..end].to_string()))));
        }
        if ch.is_ascii_digit() || ch == '.' {
            return Some(self.number(start));
        }
        if ch.is_ascii_alphabetic() {
            return Some(self.alphabetic(start));
        }
        if ch == '"' {
            return Some(self.string(start));
        }
        Some(self.minutia(start, ch))
    }
}
