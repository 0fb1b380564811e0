use super::Val;
use crate::error;
use crate::lang::{Error, LineNumber};
use std::str::FromStr;

pub type Label = String;

/// ## Virtual machine instruction set
///
/// The BASIC virtual machine has no registers.
/// Every operation is performed on the stack.
///
/// For example: `LET A=3*B` compiles to `[LIT 3, PUSH B, MUL, POP A]`
///
/// Branch operands are symbolic labels until the program is linked, after
/// which they are addresses. Only the symbolic form has a text encoding.

#[derive(Debug, Clone, PartialEq)]
pub enum Opcode<T = Label> {
    /// Branch target. Removed by the linker.
    Label(Label),
    /// Source line marker used for error reports.
    Line(LineNumber),

    // *** Stack manipulation
    /// Push literal value on to the stack.
    Literal(Val),
    /// Push stack value of named variable. Infallible.
    Push(String),
    /// Pop stack value to named variable.
    Pop(String),

    // *** Branch control
    Jump(T),
    /// Pop stack and branch if zero.
    IfNot(T),
    Gosub(T),
    /// Branch to the address saved by the last GOSUB or error
    /// with RETURN WITHOUT GOSUB.
    Return,
    /// Step the loop variable and branch back to the body
    /// while it has not passed the limit: `var limit step body`.
    Next(String, String, String, T),
    End,

    // *** Natives
    /// Call a native and keep its result.
    Call(String, usize),
    /// Call a native for effect.
    Exec(String, usize),

    // *** Expression operations
    Neg,
    Not,
    Pow,
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl<T> Opcode<T> {
    /// Rewrite every branch operand.
    pub fn resolve<U, F>(self, mut f: F) -> Result<Opcode<U>, Error>
    where
        F: FnMut(T) -> Result<U, Error>,
    {
        use Opcode::*;
        Ok(match self {
            Label(s) => Label(s),
            Line(n) => Line(n),
            Literal(v) => Literal(v),
            Push(s) => Push(s),
            Pop(s) => Pop(s),
            Jump(t) => Jump(f(t)?),
            IfNot(t) => IfNot(f(t)?),
            Gosub(t) => Gosub(f(t)?),
            Return => Return,
            Next(v, l, s, t) => Next(v, l, s, f(t)?),
            End => End,
            Call(s, n) => Call(s, n),
            Exec(s, n) => Exec(s, n),
            Neg => Neg,
            Not => Not,
            Pow => Pow,
            Mul => Mul,
            Div => Div,
            Mod => Mod,
            Add => Add,
            Sub => Sub,
            Eq => Eq,
            NotEq => NotEq,
            Lt => Lt,
            LtEq => LtEq,
            Gt => Gt,
            GtEq => GtEq,
            And => And,
            Or => Or,
        })
    }

    pub fn target(&self) -> Option<&T> {
        match self {
            Opcode::Jump(t) | Opcode::IfNot(t) | Opcode::Gosub(t) | Opcode::Next(_, _, _, t) => {
                Some(t)
            }
            _ => None,
        }
    }
}

fn write_str(f: &mut std::fmt::Formatter, s: &str) -> std::fmt::Result {
    write!(f, "\"")?;
    for ch in s.chars() {
        match ch {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            _ => write!(f, "{}", ch)?,
        }
    }
    write!(f, "\"")
}

impl<T: std::fmt::Display> std::fmt::Display for Opcode<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Opcode::*;
        match self {
            Label(s) => write!(f, "{}:", s),
            Line(n) => write!(f, ".LINE {}", n),

            Literal(Val::Number(n)) => write!(f, "LIT {}", n),
            Literal(Val::String(s)) => {
                write!(f, "LIT ")?;
                write_str(f, s)
            }
            Push(s) => write!(f, "PUSH {}", s),
            Pop(s) => write!(f, "POP {}", s),

            Jump(t) => write!(f, "JUMP {}", t),
            IfNot(t) => write!(f, "IFNOT {}", t),
            Gosub(t) => write!(f, "GOSUB {}", t),
            Return => write!(f, "RETURN"),
            Next(v, l, s, t) => write!(f, "NEXT {} {} {} {}", v, l, s, t),
            End => write!(f, "END"),

            Call(s, n) => write!(f, "CALL {} {}", s, n),
            Exec(s, n) => write!(f, "EXEC {} {}", s, n),

            Neg => write!(f, "NEG"),
            Not => write!(f, "NOT"),
            Pow => write!(f, "POW"),
            Mul => write!(f, "MUL"),
            Div => write!(f, "DIV"),
            Mod => write!(f, "MOD"),
            Add => write!(f, "ADD"),
            Sub => write!(f, "SUB"),
            Eq => write!(f, "EQ"),
            NotEq => write!(f, "NOTEQ"),
            Lt => write!(f, "LT"),
            LtEq => write!(f, "LTEQ"),
            Gt => write!(f, "GT"),
            GtEq => write!(f, "GTEQ"),
            And => write!(f, "AND"),
            Or => write!(f, "OR"),
        }
    }
}

fn malformed(s: &str) -> Error {
    error!(SyntaxError; &format!("MALFORMED INSTRUCTION {}", s))
}

fn parse_str(s: &str) -> Option<String> {
    let inner = s.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            other => out.push(other),
        }
    }
    Some(out)
}

impl FromStr for Opcode {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        use Opcode::*;
        let line = line.trim();
        if let Some(label) = line.strip_suffix(':') {
            if label.is_empty() || label.contains(char::is_whitespace) {
                return Err(malformed(line));
            }
            return Ok(Label(label.to_string()));
        }
        let (mnemonic, rest) = match line.find(' ') {
            Some(idx) => (&line[..idx], line[idx + 1..].trim()),
            None => (line, ""),
        };
        if mnemonic == "LIT" {
            if rest.starts_with('"') {
                return parse_str(rest)
                    .map(|s| Literal(Val::String(s)))
                    .ok_or_else(|| malformed(line));
            }
            return rest
                .parse::<f64>()
                .map(|n| Literal(Val::Number(n)))
                .map_err(|_| malformed(line));
        }
        let args: Vec<&str> = rest.split_whitespace().collect();
        let op = match (mnemonic, args.as_slice()) {
            (".LINE", [n]) => Line(n.parse().map_err(|_| malformed(line))?),
            ("PUSH", [v]) => Push(v.to_string()),
            ("POP", [v]) => Pop(v.to_string()),
            ("JUMP", [t]) => Jump(t.to_string()),
            ("IFNOT", [t]) => IfNot(t.to_string()),
            ("GOSUB", [t]) => Gosub(t.to_string()),
            ("RETURN", []) => Return,
            ("NEXT", [v, l, s, t]) => Next(v.to_string(), l.to_string(), s.to_string(), t.to_string()),
            ("END", []) => End,
            ("CALL", [name, n]) => Call(name.to_string(), n.parse().map_err(|_| malformed(line))?),
            ("EXEC", [name, n]) => Exec(name.to_string(), n.parse().map_err(|_| malformed(line))?),
            ("NEG", []) => Neg,
            ("NOT", []) => Not,
            ("POW", []) => Pow,
            ("MUL", []) => Mul,
            ("DIV", []) => Div,
            ("MOD", []) => Mod,
            ("ADD", []) => Add,
            ("SUB", []) => Sub,
            ("EQ", []) => Eq,
            ("NOTEQ", []) => NotEq,
            ("LT", []) => Lt,
            ("LTEQ", []) => LtEq,
            ("GT", []) => Gt,
            ("GTEQ", []) => GtEq,
            ("AND", []) => And,
            ("OR", []) => Or,
            _ => return Err(malformed(line)),
        };
        Ok(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_form() {
        let op: Opcode = Opcode::Next("I".into(), "%L1".into(), "%S1".into(), "F1".into());
        assert_eq!(op.to_string(), "NEXT I %L1 %S1 F1");
        assert_eq!("NEXT I %L1 %S1 F1".parse::<Opcode>().unwrap(), op);
        assert_eq!("L10:".parse::<Opcode>().unwrap(), Opcode::Label("L10".into()));
        assert_eq!("  .LINE 10".parse::<Opcode>().unwrap(), Opcode::Line(10));
    }

    #[test]
    fn test_string_literal_escapes() {
        let op: Opcode = Opcode::Literal(Val::from("SAY \"HI\"\n"));
        assert_eq!(op.to_string(), r#"LIT "SAY \"HI\"\n""#);
        assert_eq!(op.to_string().parse::<Opcode>().unwrap(), op);
    }

    #[test]
    fn test_malformed() {
        assert!("JUMP".parse::<Opcode>().is_err());
        assert!("FROB 1".parse::<Opcode>().is_err());
        assert!("LIT \"open".parse::<Opcode>().is_err());
    }
}
