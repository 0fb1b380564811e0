use super::Val;
use crate::error;
use crate::lang::{Error, Signature, Type};
use rand::Rng;

type Result<T> = std::result::Result<T, Error>;

/// A built-in function body.
pub type Body = fn(&[Val]) -> Result<Val>;

/// ## Built-in functions
///
/// Pure functions of their arguments, bound into every engine by the
/// standard native set.

pub struct Function {}

impl Function {
    pub fn table() -> Vec<(&'static str, Signature, Body)> {
        use Type::*;
        vec![
            ("ABS", Signature::function(1..=1, &[Number], Number), Function::abs as Body),
            ("INT", Signature::function(1..=1, &[Number], Number), Function::int as Body),
            ("SQR", Signature::function(1..=1, &[Number], Number), Function::sqr as Body),
            ("SIN", Signature::function(1..=1, &[Number], Number), Function::sin as Body),
            ("COS", Signature::function(1..=1, &[Number], Number), Function::cos as Body),
            ("RND", Signature::function(0..=1, &[Number], Number), Function::rnd as Body),
            ("LEN", Signature::function(1..=1, &[String], Number), Function::len as Body),
            ("STR$", Signature::function(1..=1, &[Number], String), Function::str as Body),
            ("CHR$", Signature::function(1..=1, &[Number], String), Function::chr as Body),
        ]
    }

    fn number(args: &[Val]) -> Result<f64> {
        match args.first() {
            Some(val) => val.number(),
            None => Err(error!(IllegalFunctionCall)),
        }
    }

    pub fn abs(args: &[Val]) -> Result<Val> {
        Ok(Val::Number(Function::number(args)?.abs()))
    }

    pub fn int(args: &[Val]) -> Result<Val> {
        Ok(Val::Number(Function::number(args)?.floor()))
    }

    pub fn sqr(args: &[Val]) -> Result<Val> {
        let n = Function::number(args)?;
        if n < 0.0 {
            return Err(error!(IllegalFunctionCall));
        }
        Ok(Val::Number(n.sqrt()))
    }

    pub fn sin(args: &[Val]) -> Result<Val> {
        Ok(Val::Number(Function::number(args)?.sin()))
    }

    pub fn cos(args: &[Val]) -> Result<Val> {
        Ok(Val::Number(Function::number(args)?.cos()))
    }

    /// Uniform in `[0, 1)`. The argument is accepted and ignored.
    pub fn rnd(_args: &[Val]) -> Result<Val> {
        Ok(Val::Number(rand::thread_rng().gen::<f64>()))
    }

    pub fn len(args: &[Val]) -> Result<Val> {
        match args.first() {
            Some(val) => Ok(Val::Number(val.string()?.chars().count() as f64)),
            None => Err(error!(IllegalFunctionCall)),
        }
    }

    pub fn str(args: &[Val]) -> Result<Val> {
        let n = Function::number(args)?;
        Ok(Val::String(Val::Number(n).to_string()))
    }

    pub fn chr(args: &[Val]) -> Result<Val> {
        let n = Function::number(args)?;
        if n < 0.0 || n > u32::max_value() as f64 {
            return Err(error!(IllegalFunctionCall));
        }
        match std::char::from_u32(n as u32) {
            Some(ch) => Ok(Val::String(ch.to_string())),
            None => Err(error!(IllegalFunctionCall)),
        }
    }
}
