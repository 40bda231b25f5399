//! Naftah command-line front door.
//!
//! A thin collaborator over `naftah-core` (§6 EXTERNAL INTERFACES "CLI surface"): run a
//! script file, evaluate a single expression, or enter a line-reading loop when given no
//! argument. This is deliberately not the full bidirectional-text REPL terminal front
//! end — that's out of scope here, same as the grammar front end and the Markdown help
//! renderer.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser as ClapParser;
use naftah_core::concurrency::run_to_completion;
use naftah_core::config::RuntimeConfig;
use naftah_core::error::Error;
use naftah_core::eval::Interpreter;
use naftah_core::host::HostClassDirectory;
use naftah_core::lexer::Lexer;
use naftah_core::parser::Parser;

#[derive(ClapParser, Debug)]
#[clap(name = "naftah")]
#[clap(about = "Run Naftah scripts")]
struct Args {
    /// Run the script at PATH.
    #[clap(long)]
    file: Option<String>,

    /// Evaluate a single expression and print its result.
    #[clap(long)]
    expression: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse();
    let config = RuntimeConfig::from_env();

    let outcome = if let Some(path) = &args.file {
        run_source_from_file(path, &config)
    } else if let Some(expression) = &args.expression {
        run_source(expression, &config)
    } else {
        run_repl(&config)
    };

    match outcome {
        Ok(()) => ExitCode::from(0),
        Err(CliError::User(message)) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
        Err(CliError::Internal(message)) => {
            eprintln!("{message}");
            ExitCode::from(2)
        }
    }
}

enum CliError {
    User(String),
    Internal(String),
}

/// Converts a language-level [`Error`] into the CLI's two-way exit-code split (§6 "Exit
/// codes: 0 success, 1 user error, 2 internal bug"), rendering it through `config`'s
/// locale rather than always falling back to Arabic.
fn cli_error(err: Error, config: &RuntimeConfig) -> CliError {
    let message = err.localized(config.locale);
    if err.kind.is_internal() {
        CliError::Internal(message)
    } else {
        CliError::User(message)
    }
}

fn run_source_from_file(path: &str, config: &RuntimeConfig) -> Result<(), CliError> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| CliError::User(format!("تعذرت قراءة الملف {path}: {e}")))?;
    run_source(&source, config)
}

fn run_source(source: &str, config: &RuntimeConfig) -> Result<(), CliError> {
    if config.debug {
        dump_tokens(source, config)?;
    }
    let mut parser = Parser::new(source).map_err(|e| cli_error(e, config))?;
    let program = parser.parse_program().map_err(|e| cli_error(e, config))?;
    let result = run_to_completion(async {
        let mut interp = Interpreter::new(config.clone(), HostClassDirectory::new());
        interp.run_program(&program).await
    })
    .map_err(|e| cli_error(e, config))?;
    println!("{result}");
    Ok(())
}

fn dump_tokens(source: &str, config: &RuntimeConfig) -> Result<(), CliError> {
    let tokens = Lexer::new(source).tokenize().map_err(|e| cli_error(e, config))?;
    for token in &tokens {
        tracing::debug!(token = %token.kind, line = token.span.line, column = token.span.column, "token");
    }
    Ok(())
}

/// Bare invocation: a line-reading loop, not the excluded bidirectional-text REPL.
fn run_repl(config: &RuntimeConfig) -> Result<(), CliError> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush().map_err(|e| CliError::Internal(e.to_string()))?;
        let mut line = String::new();
        let bytes_read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| CliError::Internal(e.to_string()))?;
        if bytes_read == 0 {
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match run_source(trimmed, config) {
            Ok(()) => {}
            Err(CliError::User(message)) => eprintln!("{message}"),
            Err(CliError::Internal(message)) => eprintln!("{message}"),
        }
    }
}
