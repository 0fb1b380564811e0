use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Value types known to the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Number,
    String,
}

/// Compile-time description of one native.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub arity: RangeInclusive<usize>,
    /// Parameter types; the last one repeats for variadic natives.
    pub params: Vec<Type>,
    /// `None` for natives that may only be used as statements.
    pub returns: Option<Type>,
}

impl Signature {
    pub fn statement(arity: RangeInclusive<usize>, params: &[Type]) -> Signature {
        Signature {
            arity,
            params: params.to_vec(),
            returns: None,
        }
    }

    pub fn function(arity: RangeInclusive<usize>, params: &[Type], returns: Type) -> Signature {
        Signature {
            arity,
            params: params.to_vec(),
            returns: Some(returns),
        }
    }

    pub fn param(&self, index: usize) -> Option<Type> {
        self.params
            .get(index)
            .or_else(|| self.params.last())
            .copied()
    }
}

/// ## Native command table
///
/// Owned by whoever builds the compiler and passed in at construction.
/// Names are stored upper case.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<String, Signature>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    pub fn insert(&mut self, name: &str, signature: Signature) -> Option<Signature> {
        self.entries.insert(name.to_ascii_uppercase(), signature)
    }

    pub fn get(&self, name: &str) -> Option<&Signature> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
