//! # cartbasic
//!
//! An interactive shell for line-numbered BASIC. Programs are typed in with
//! line numbers, edited, listed and saved the old way. `RUN` compiles the
//! whole program through a staged pipeline into a small textual script and
//! runs that on a stack machine in the background, where CTRL-C can stop it.
//! Programs and their assets can be packed into carts.
//!
//! ```text
//! cartbasic
//! READY.
//! █
//! ```
//!
//! The shell can also be embedded. [`shell::Shell`] takes one line at a
//! time and reports through a reply and callbacks, never the console.

#[path = "doc/introduction.rs"]
#[allow(non_snake_case)]
pub mod _Introduction;

#[path = "doc/commands.rs"]
#[allow(non_snake_case)]
pub mod __Commands;

#[path = "doc/carts.rs"]
#[allow(non_snake_case)]
pub mod __Carts;

pub mod lang;
pub mod mach;
pub mod shell;
pub mod term;
