//! Front end for the GRCI structural hardware description language.
//!
//! The language declares modules whose bodies instantiate previously declared
//! modules ("parts") and aggregate bits into buses ("wires"). This crate
//! lexes source text into spanned tokens and parses it into a spanned AST;
//! width inference and netlist lowering live in `grci_elaborate`.

#![warn(missing_docs)]

pub mod ast;
pub mod expr;
pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::lex;
pub use parser::HdlParser;
pub use token::{lookup_keyword, HdlToken, Token};
