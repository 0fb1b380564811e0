use super::Val;
use crate::error;
use crate::lang::Error;
use std::cmp::Ordering;

type Result<T> = std::result::Result<T, Error>;

/// Arithmetic shared by the machine and the constant folder.
pub struct Operation {}

fn finite(n: f64) -> Result<Val> {
    if n.is_finite() {
        Ok(Val::Number(n))
    } else {
        Err(error!(Overflow))
    }
}

fn integer(val: &Val) -> Result<i32> {
    let n = val.number()?.round();
    if n < i32::min_value() as f64 || n > i32::max_value() as f64 {
        Err(error!(Overflow))
    } else {
        Ok(n as i32)
    }
}

impl Operation {
    pub fn negate(val: Val) -> Result<Val> {
        Ok(Val::Number(-val.number()?))
    }

    pub fn not(val: Val) -> Result<Val> {
        Ok(Val::Number(!integer(&val)? as f64))
    }

    pub fn power(lhs: Val, rhs: Val) -> Result<Val> {
        let (l, r) = (lhs.number()?, rhs.number()?);
        if l == 0.0 && r < 0.0 {
            return Err(error!(DivisionByZero));
        }
        let n = l.powf(r);
        if n.is_nan() {
            return Err(error!(IllegalFunctionCall));
        }
        finite(n)
    }

    pub fn multiply(lhs: Val, rhs: Val) -> Result<Val> {
        finite(lhs.number()? * rhs.number()?)
    }

    pub fn divide(lhs: Val, rhs: Val) -> Result<Val> {
        let r = rhs.number()?;
        if r == 0.0 {
            return Err(error!(DivisionByZero));
        }
        finite(lhs.number()? / r)
    }

    pub fn modulus(lhs: Val, rhs: Val) -> Result<Val> {
        let (l, r) = (integer(&lhs)?, integer(&rhs)?);
        match l.checked_rem(r) {
            Some(n) => Ok(Val::Number(n as f64)),
            None if r == 0 => Err(error!(DivisionByZero)),
            None => Err(error!(Overflow)),
        }
    }

    pub fn sum(lhs: Val, rhs: Val) -> Result<Val> {
        match (lhs, rhs) {
            (Val::String(l), Val::String(r)) => Ok(Val::String(l + &r)),
            (Val::Number(l), Val::Number(r)) => finite(l + r),
            _ => Err(error!(TypeMismatch)),
        }
    }

    pub fn subtract(lhs: Val, rhs: Val) -> Result<Val> {
        finite(lhs.number()? - rhs.number()?)
    }

    pub fn and(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::Number((integer(&lhs)? & integer(&rhs)?) as f64))
    }

    pub fn or(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::Number((integer(&lhs)? | integer(&rhs)?) as f64))
    }

    pub fn equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(Operation::compare(&lhs, &rhs)? == Ordering::Equal))
    }

    pub fn not_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(Operation::compare(&lhs, &rhs)? != Ordering::Equal))
    }

    pub fn less(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(Operation::compare(&lhs, &rhs)? == Ordering::Less))
    }

    pub fn less_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(Operation::compare(&lhs, &rhs)? != Ordering::Greater))
    }

    pub fn greater(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(Operation::compare(&lhs, &rhs)? == Ordering::Greater))
    }

    pub fn greater_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(Operation::compare(&lhs, &rhs)? != Ordering::Less))
    }

    fn compare(lhs: &Val, rhs: &Val) -> Result<Ordering> {
        match (lhs, rhs) {
            (Val::String(l), Val::String(r)) => Ok(l.cmp(r)),
            (Val::Number(l), Val::Number(r)) => match l.partial_cmp(r) {
                Some(ord) => Ok(ord),
                None => Err(error!(IllegalFunctionCall)),
            },
            _ => Err(error!(TypeMismatch)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    #[test]
    fn test_division_by_zero() {
        let e = Operation::divide(Val::Number(1.0), Val::Number(0.0)).unwrap_err();
        assert!(e.is(ErrorCode::DivisionByZero));
    }

    #[test]
    fn test_string_concat_and_compare() {
        let s = Operation::sum(Val::from("A"), Val::from("B")).unwrap();
        assert_eq!(s, Val::from("AB"));
        assert_eq!(Operation::less(Val::from("A"), Val::from("B")).unwrap(), Val::TRUE);
        assert!(Operation::sum(Val::from("A"), Val::Number(1.0)).is_err());
    }

    #[test]
    fn test_logic_is_bitwise() {
        assert_eq!(Operation::and(Val::TRUE, Val::FALSE).unwrap(), Val::FALSE);
        assert_eq!(Operation::or(Val::TRUE, Val::FALSE).unwrap(), Val::TRUE);
        assert_eq!(Operation::not(Val::FALSE).unwrap(), Val::TRUE);
        assert_eq!(
            Operation::modulus(Val::Number(7.0), Val::Number(3.0)).unwrap(),
            Val::Number(1.0)
        );
    }
}
