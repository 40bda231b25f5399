//! Naftah core runtime — value model, numeric tower, Arabic temporal values,
//! operation engine, scope/declaration model, host interop bridge, tree-walking
//! evaluator, concurrency runtime, and error taxonomy, plus the lexer/parser that
//! turns source text into the tree the evaluator walks.
//!
//! # Running a program
//!
//! ```rust,no_run
//! use naftah_core::concurrency::run_to_completion;
//! use naftah_core::config::RuntimeConfig;
//! use naftah_core::eval::Interpreter;
//! use naftah_core::host::HostClassDirectory;
//! use naftah_core::parser::Parser;
//!
//! # fn example() -> naftah_core::error::Result<()> {
//! let mut parser = Parser::new("1 + 2;")?;
//! let program = parser.parse_program()?;
//! let result = run_to_completion(async {
//!     let mut interp = Interpreter::new(RuntimeConfig::from_env(), HostClassDirectory::new());
//!     interp.run_program(&program).await
//! })?;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

pub mod ast;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod eval;
pub mod host;
pub mod lexer;
pub mod locale;
pub mod numeric;
pub mod ops;
pub mod parser;
pub mod scope;
pub mod temporal;
pub mod temporal_parse;
pub mod token;
pub mod value;

pub use config::RuntimeConfig;
pub use error::{Error, ErrorKind, Position, Result};
pub use eval::Interpreter;
pub use host::HostClassDirectory;
pub use parser::Parser;
pub use value::Value;
