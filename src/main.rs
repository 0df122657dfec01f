mod ast;
mod ast_printer;
mod callable;
mod config;
mod diagnostics;
mod environment;
mod error;
mod interpreter;
mod lexer;
mod parser;
mod token;
mod value;

use clap::Parser as ClapParser;
use config::{WELCOME_MESSAGE, WELCOME_SUBTITLE};
use diagnostics::Diagnostics;
use interpreter::Interpreter;
use lexer::Lexer;
use parser::Parser;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// A tree-walking interpreter for Lox
#[derive(ClapParser, Debug)]
#[command(name = "lox")]
#[command(version = config::VERSION)]
#[command(about = "A tree-walking interpreter for Lox")]
struct CliArgs {
    /// Script file to execute (optional - if not provided, starts REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

const EXIT_PARSE_ERROR: u8 = 65;
const EXIT_RUNTIME_ERROR: u8 = 70;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    match args.script {
        Some(path) => run_file(&path),
        None => {
            run_repl();
            ExitCode::SUCCESS
        }
    }
}

fn run_file(path: &PathBuf) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Cannot read script file {}: {e}", path.display());
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    };

    let stderr = io::stderr();
    let mut diagnostics = Diagnostics::new(stderr);
    let tokens = Lexer::new(&source, &mut diagnostics).scan_tokens();
    let statements = Parser::new(&tokens, &mut diagnostics).parse();

    if diagnostics.had_parse_error() {
        return ExitCode::from(EXIT_PARSE_ERROR);
    }

    let stdout = io::stdout();
    let mut interpreter = Interpreter::new(stdout);
    interpreter.interpret(&statements, &mut diagnostics);

    if diagnostics.had_runtime_error() {
        return ExitCode::from(EXIT_RUNTIME_ERROR);
    }

    ExitCode::SUCCESS
}

fn run_repl() {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<(), rustyline::history::DefaultHistory> = match Editor::with_config(config) {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Failed to initialize REPL: {e}");
            return;
        }
    };

    let history_file = ".lox_history";
    let _ = rl.load_history(history_file);

    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");

    let stdout = io::stdout();
    let mut interpreter = Interpreter::new(stdout);

    loop {
        let readline = rl.readline("lox> ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                run_line(&line, &mut interpreter);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
}

/// Runs one REPL line, resetting the diagnostic sink afterward so an error
/// on one line never suppresses the next.
fn run_line(line: &str, interpreter: &mut Interpreter<io::Stdout>) {
    let mut diagnostics = Diagnostics::new(io::stderr());
    let tokens = Lexer::new(line, &mut diagnostics).scan_tokens();
    let statements = Parser::new(&tokens, &mut diagnostics).parse();
    if diagnostics.had_parse_error() {
        return;
    }
    interpreter.interpret(&statements, &mut diagnostics);
}
