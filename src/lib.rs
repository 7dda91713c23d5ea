pub mod api;
pub mod diagnostics;
pub mod error;
pub mod formatter;
pub mod html;
pub mod lexer;
pub mod notion;
pub mod parser;
pub mod printer;
pub mod source;
pub mod utils;
mod serialization;

pub use api::{compile, CompileResult, Compiler, CompilerOptions};
pub use error::MonoError;
pub use source::SourceFile;
