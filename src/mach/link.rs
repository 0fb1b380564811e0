use super::{Address, Label, Opcode};
use crate::error;
use crate::lang::Error;
use std::collections::HashMap;

type Result<T> = std::result::Result<T, Error>;

/// An instruction with its branch resolved to an address.
pub type Op = Opcode<Address>;

/// ## Label resolution
///
/// Labels are removed from the instruction stream and every branch is
/// rewritten to the address of the instruction following its label.

#[derive(Debug, Default)]
pub struct Link {
    pub ops: Vec<Op>,
    pub labels: HashMap<Label, Address>,
}

impl Link {
    pub fn link(program: Vec<Opcode>) -> Result<Link> {
        let mut labels: HashMap<Label, Address> = HashMap::default();
        let mut addr: Address = 0;
        for op in &program {
            match op {
                Opcode::Label(label) => {
                    if labels.insert(label.clone(), addr).is_some() {
                        return Err(error!(InternalError; &format!("DUPLICATE LABEL {}", label)));
                    }
                }
                _ => addr += 1,
            }
        }
        let mut ops: Vec<Op> = Vec::with_capacity(addr);
        for op in program {
            if let Opcode::Label(_) = op {
                continue;
            }
            ops.push(op.resolve(|label| match labels.get(&label) {
                Some(addr) => Ok(*addr),
                None => Err(error!(InternalError; &format!("UNDEFINED LABEL {}", label))),
            })?);
        }
        Ok(Link { ops, labels })
    }

    pub fn address_of(&self, label: &str) -> Option<Address> {
        self.labels.get(label).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    #[test]
    fn test_link_resolves_labels() {
        let program: Vec<Opcode> = vec![
            Opcode::Label("MAIN".into()),
            Opcode::Jump("L20".into()),
            Opcode::Label("L10".into()),
            Opcode::End,
            Opcode::Label("L20".into()),
            Opcode::Jump("L10".into()),
        ];
        let link = Link::link(program).unwrap();
        assert_eq!(link.ops, vec![Opcode::Jump(2), Opcode::End, Opcode::Jump(1)]);
        assert_eq!(link.address_of("MAIN"), Some(0));
    }

    #[test]
    fn test_link_errors() {
        let e = Link::link(vec![Opcode::Jump("NOWHERE".into())]).unwrap_err();
        assert!(e.is(ErrorCode::InternalError));
        let e = Link::link(vec![Opcode::Label("A".into()), Opcode::Label("A".into())]);
        assert!(e.is_err());
    }
}
