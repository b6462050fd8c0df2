//! Edit scripts: a small text language for driving an editor session
//! without a pointer.
//!
//! ```text
//! move E7 -> E2 [with_children: false]
//! bulk E8, E9 -> E3
//! swap E2 <-> E3
//! undo
//! save
//! ```

pub mod ast;
pub mod error;
mod grammar;
pub mod lexer;
mod run;

pub use ast::{Command, Script, Spanned};
pub use error::{ParseError, ScriptError};
pub use grammar::parse;
pub use run::{execute, run_script, ScriptReport};
