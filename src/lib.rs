pub mod api;
pub mod ast;
pub mod config;
pub mod error;
pub mod grouper;
pub mod lexer;
pub mod parser;
pub mod range;
pub mod resolver;
pub mod serialization;

pub use api::{compile, compile_with, Compilation};
pub use config::Limits;
pub use error::{CompileError, ErrorKind};
pub use serialization::{Definition, FontDefinition, FontStyle, ResolvedValue, ThemeDefinition};
