/*!
## Rust Machine Module

This Rust module is the back half of the compiler and the virtual machine
that runs its output. It also holds the program store and the execution
controller the shell drives.

*/

pub type Address = usize;

mod codegen;
mod compile;
mod controller;
mod engine;
mod function;
mod link;
mod listing;
mod machine;
mod opcode;
mod operation;
mod stack;
mod val;

pub mod flow;
pub mod native;
pub mod script;

pub use codegen::codegen;
pub use compile::{CompileError, Compiler, Flags, Stage};
pub use controller::{Controller, Outcome, Phase, StopHandle};
pub use engine::{Engine, EngineFactory, Hook, Native};
pub use function::Function;
pub use link::{Link, Op};
pub use listing::Listing;
pub use machine::{Machine, POLL_INTERVAL};
pub use native::{NativeSet, Output, Standard};
pub use opcode::{Label, Opcode};
pub use operation::Operation;
pub use script::{Script, ENTRY};
pub use stack::Stack;
pub use val::Val;
