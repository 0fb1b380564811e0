use super::{lex_line, token::*, Error, LineNumber, MAX_LINE_LEN, MAX_LINE_NUMBER};
use std::collections::HashMap;

/// ## One numbered line of the stored program

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    number: LineNumber,
    content: String,
}

impl Line {
    pub fn new(number: LineNumber, content: &str) -> Line {
        Line {
            number,
            content: content.to_string(),
        }
    }

    /// Parse the persisted `"<number> <content>"` form. One separating
    /// space is consumed, any further indentation belongs to the content.
    pub fn parse(s: &str) -> Result<Line, Error> {
        let s = s.trim_end_matches(|c| c == '\r' || c == '\n');
        if s.len() > MAX_LINE_LEN {
            return Err(error!(LineBufferOverflow));
        }
        let trimmed = s.trim_start();
        let digits = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or_else(|| trimmed.len());
        if digits == 0 {
            return Err(error!(DirectStatementInFile));
        }
        let number = match trimmed[..digits].parse::<LineNumber>() {
            Ok(n) if n <= MAX_LINE_NUMBER => n,
            _ => return Err(error!(Overflow; "LINE NUMBER")),
        };
        let mut content = &trimmed[digits..];
        if content.starts_with(' ') {
            content = &content[1..];
        }
        Ok(Line::new(number, content.trim_end()))
    }

    pub fn number(&self) -> LineNumber {
        self.number
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Line numbers this line refers to, with their byte range in the content.
    pub fn references(&self) -> Vec<(std::ops::Range<usize>, LineNumber)> {
        let tokens = match lex_line(&self.content) {
            Ok(tokens) => tokens,
            Err(_) => return vec![],
        };
        let mut refs = vec![];
        let mut target_list = false;
        for (col, token) in tokens {
            match &token {
                Token::Word(Word::Goto) | Token::Word(Word::Gosub) => target_list = true,
                Token::Word(Word::Then) | Token::Word(Word::Else) => target_list = true,
                Token::Literal(Literal::Number(s)) if target_list => {
                    if let Ok(n) = s.parse::<LineNumber>() {
                        refs.push((col, n));
                    }
                }
                Token::Comma if target_list => {}
                _ => target_list = false,
            }
        }
        refs
    }

    /// A copy of this line under its new number with every reference found
    /// in `changes` rewritten. Unknown references are left alone.
    pub fn renum(&self, changes: &HashMap<LineNumber, LineNumber>) -> Line {
        let number = *changes.get(&self.number).unwrap_or(&self.number);
        let mut content = self.content.clone();
        for (col, old) in self.references().into_iter().rev() {
            if let Some(new) = changes.get(&old) {
                content.replace_range(col, &new.to_string());
            }
        }
        Line { number, content }
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.content.is_empty() {
            write!(f, "{}", self.number)
        } else {
            write!(f, "{} {}", self.number, self.content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_persisted_form() {
        let l = Line::parse("10 PRINT 1\r\n").unwrap();
        assert_eq!(l.number(), 10);
        assert_eq!(l.content(), "PRINT 1");
        assert_eq!(l.to_string(), "10 PRINT 1");
    }

    #[test]
    fn test_parse_keeps_indentation() {
        let l = Line::parse("20   NEXT I").unwrap();
        assert_eq!(l.content(), "  NEXT I");
    }

    #[test]
    fn test_parse_direct_statement() {
        assert!(Line::parse("PRINT 1").is_err());
    }

    #[test]
    fn test_renum_rewrites_targets() {
        let mut changes = HashMap::new();
        changes.insert(10, 100);
        changes.insert(20, 110);
        let l = Line::new(20, "IF A THEN 10 ELSE 20: GOSUB 10: PRINT 10");
        let r = l.renum(&changes);
        assert_eq!(r.number(), 110);
        assert_eq!(r.content(), "IF A THEN 100 ELSE 110: GOSUB 100: PRINT 10");
    }

    #[test]
    fn test_renum_leaves_unknown_targets() {
        let mut changes = HashMap::new();
        changes.insert(10, 100);
        let l = Line::new(10, "GOTO 999");
        assert_eq!(l.renum(&changes).content(), "GOTO 999");
    }
}
