use super::{Link, Opcode};
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// Label every script starts executing at.
pub const ENTRY: &str = "MAIN";

/// ## Target script
///
/// The text form handed to an engine. One instruction per line, labels
/// flush left and instructions indented. Lines starting with `;` are
/// comments.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Script {
    text: String,
}

/// Render intermediate code as a script. The code is linked first so a
/// script with a dangling or duplicate label is never produced.
pub fn emit(program: &[Opcode]) -> Result<Script> {
    Link::link(program.to_vec())?;
    let mut text = String::new();
    for op in program {
        match op {
            Opcode::Label(_) => text.push_str(&format!("{}\n", op)),
            _ => text.push_str(&format!("    {}\n", op)),
        }
    }
    Ok(Script { text })
}

impl Script {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Decode the text form back into instructions.
    pub fn parse(text: &str) -> Result<Vec<Opcode>> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with(';'))
            .enumerate()
            .map(|(index, line)| {
                line.parse::<Opcode>()
                    .map_err(|e| e.message(&format!("{} AT INSTRUCTION {}", e.text(), index)))
            })
            .collect()
    }
}

impl From<String> for Script {
    fn from(text: String) -> Self {
        Script { text }
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_and_parse() {
        let program: Vec<Opcode> = vec![
            Opcode::Label(ENTRY.into()),
            Opcode::Line(10),
            Opcode::Literal(1.0.into()),
            Opcode::Exec("PRINT".into(), 1),
            Opcode::End,
        ];
        let script = emit(&program).unwrap();
        assert_eq!(
            script.as_str(),
            "MAIN:\n    .LINE 10\n    LIT 1\n    EXEC PRINT 1\n    END\n"
        );
        assert_eq!(Script::parse(script.as_str()).unwrap(), program);
    }

    #[test]
    fn test_emit_rejects_dangling_label() {
        assert!(emit(&[Opcode::Jump("L99".into())]).is_err());
    }
}
