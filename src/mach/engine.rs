use super::Val;
use crate::lang::Error;
use std::sync::Arc;

type Result<T> = std::result::Result<T, Error>;

/// A native bound into an engine. Receives its evaluated arguments.
pub type Native = Box<dyn FnMut(&[Val]) -> Result<Val> + Send>;

/// Polled by the engine at its safe points. Returning `true` stops the
/// program with a BREAK error.
pub type Hook = Box<dyn FnMut() -> bool + Send>;

/// Builds a fresh engine for every run.
pub type EngineFactory = Arc<dyn Fn() -> Result<Box<dyn Engine>> + Send + Sync>;

/// ## Embedded execution engine
///
/// An engine loads one script and runs it from a label. It is moved to
/// the worker thread for the run and dropped when the run ends, so it
/// never outlives a single program.
pub trait Engine: Send {
    fn load(&mut self, script: &str) -> Result<()>;
    fn call(&mut self, entry: &str) -> Result<()>;
    fn register_native(&mut self, name: &str, native: Native);
    fn set_interrupt_hook(&mut self, hook: Option<Hook>);
}
