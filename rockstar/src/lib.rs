//! Rockstar Runtime Library
//!
//! Values, scopes and a tree-walking evaluator for the Rockstar programming
//! language. Parsing is pluggable through [`parser::Parse`].

pub mod ast;
pub mod config;
pub mod error;
pub mod interp;
pub mod io;
pub mod logging;
pub mod parser;

pub use ast::Program;
pub use config::{Config, ConfigError};
pub use error::{ParseError, Result, RockstarError};
pub use interp::{EnvRef, Environment, Interpreter, Outcome, RuntimeError, Value};
pub use io::{BufferIo, IoRef, RockstarIo, StdIo};
pub use parser::{JsonParser, Parse};

/// Parse and run a program in `env`.
///
/// A parse error is rendered to the environment's output before it is
/// returned; runtime errors are returned as-is for the host to report.
pub fn run_source<P>(parser: &P, source: &str, env: &EnvRef, config: &Config) -> Result<Outcome>
where
    P: Parse + ?Sized,
{
    let program = match parser.parse(source) {
        Ok(program) => program,
        Err(e) => {
            tracing::debug!(line = e.line, column = e.column, "parse failed");
            env.borrow().write(&e.render(source));
            return Err(e.into());
        }
    };
    let outcome = Interpreter::with_config(config.clone()).execute(&program, env)?;
    Ok(outcome)
}
