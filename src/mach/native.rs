use super::{Engine, Function, Val};
use crate::lang::{Registry, Signature};
use std::sync::Arc;

/// Where program output goes.
pub type Output = Arc<dyn Fn(&str) + Send + Sync>;

/// ## Native capability set
///
/// The compile side declares signatures so the semantic pass can check
/// calls; the run side binds implementations into each fresh engine.
pub trait NativeSet: Send + Sync {
    fn declare(&self, registry: &mut Registry);
    fn bind(&self, engine: &mut dyn Engine, output: &Output);
}

/// Console and math natives every shell has.
#[derive(Debug, Default, Clone, Copy)]
pub struct Standard;

impl NativeSet for Standard {
    fn declare(&self, registry: &mut Registry) {
        registry.insert("PRINT", Signature::statement(0..=255, &[]));
        registry.insert("CLS", Signature::statement(0..=0, &[]));
        for (name, signature, _) in Function::table() {
            registry.insert(name, signature);
        }
    }

    fn bind(&self, engine: &mut dyn Engine, output: &Output) {
        let out = output.clone();
        engine.register_native(
            "PRINT",
            Box::new(move |args: &[Val]| {
                let mut s = String::new();
                for arg in args {
                    match arg {
                        Val::String(text) => s.push_str(text),
                        Val::Number(_) => s.push_str(&format!("{} ", arg)),
                    }
                }
                out(&s);
                Ok(Val::FALSE)
            }),
        );
        let out = output.clone();
        engine.register_native(
            "CLS",
            Box::new(move |_: &[Val]| {
                out("\x1b[2J\x1b[H");
                Ok(Val::FALSE)
            }),
        );
        for (name, _, body) in Function::table() {
            engine.register_native(name, Box::new(body));
        }
    }
}

/// Build the registry for a list of native sets.
pub fn registry(sets: &[Arc<dyn NativeSet>]) -> Registry {
    let mut registry = Registry::new();
    for set in sets {
        set.declare(&mut registry);
    }
    registry
}
