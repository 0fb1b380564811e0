use crate::error;
use crate::lang::Error;

/// ## Runtime value
///
/// Numbers are double precision. Truth is -1, falsehood 0.

#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Number(f64),
    String(String),
}

impl Val {
    pub const TRUE: Val = Val::Number(-1.0);
    pub const FALSE: Val = Val::Number(0.0);

    pub fn from_bool(b: bool) -> Val {
        if b {
            Val::TRUE
        } else {
            Val::FALSE
        }
    }

    pub fn number(&self) -> Result<f64, Error> {
        match self {
            Val::Number(n) => Ok(*n),
            Val::String(_) => Err(error!(TypeMismatch)),
        }
    }

    pub fn string(&self) -> Result<&str, Error> {
        match self {
            Val::String(s) => Ok(s),
            Val::Number(_) => Err(error!(TypeMismatch)),
        }
    }

    pub fn is_true(&self) -> Result<bool, Error> {
        Ok(self.number()? != 0.0)
    }
}

impl From<f64> for Val {
    fn from(n: f64) -> Self {
        Val::Number(n)
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Self {
        Val::String(s.to_string())
    }
}

impl std::fmt::Display for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Val::String(s) => write!(f, "{}", s),
            Val::Number(n) => {
                let s = if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                };
                if *n >= 0.0 {
                    write!(f, " {}", s)
                } else {
                    write!(f, "{}", s)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Val::Number(3.0).to_string(), " 3");
        assert_eq!(Val::Number(-2.5).to_string(), "-2.5");
        assert_eq!(Val::from("HI").to_string(), "HI");
    }
}
