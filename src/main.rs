use clap::Parser;
use corny::{Session, SessionError};
use std::io::{self, Write};
use std::{fs, process};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const PROMPT: &str = ">> ";
const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

#[derive(Parser, Debug)]
#[clap(name = "corny", version, author, about)]
struct Args {
    /// Script to run. Starts the interactive shell when omitted.
    script: Option<String>,

    /// Print the parsed program before evaluating it
    #[clap(long)]
    print_ast: bool,

    /// Log filter, overriding CORNY_LOG and RUST_LOG (e.g. `debug`)
    #[clap(long)]
    log_level: Option<String>,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    match &args.script {
        Some(path) => run_file(path, args.print_ast),
        None => run_prompt(args.print_ast),
    }
}

fn init_logging(level: Option<&str>) {
    // Default to WARN if nothing is configured.
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).ok(),
        None => EnvFilter::try_from_env("CORNY_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .ok(),
    }
    .unwrap_or_else(|| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_prompt(print_ast: bool) -> io::Result<()> {
    let mut session = Session::new();
    println!("CornyLang v{}", VERSION);
    println!("Type an expression, or `quit` to leave.");

    let stdin = io::stdin();
    loop {
        print!("{}", PROMPT);
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }

        let line = input.trim();
        match line {
            "" => continue,
            "quit" => break,
            "version" => println!("{}", VERSION),
            "author" => println!("{}", AUTHORS),
            _ => {
                if print_ast {
                    print_program(line);
                }
                println!("{}", session.eval_line(line));
            }
        }
    }

    Ok(())
}

fn run_file(path: &str, print_ast: bool) -> io::Result<()> {
    let source = fs::read_to_string(path)?;
    info!(path, "running script");

    if print_ast {
        print_program(&source);
    }

    let mut session = Session::new();
    match session.eval_source(&source) {
        Ok(value) => {
            println!("{}", value);
            Ok(())
        }
        Err(SessionError::Syntax(errors)) => {
            for error in errors.iter() {
                eprintln!("{}", error.render(&source));
            }
            process::exit(65);
        }
        Err(e @ SessionError::Runtime(_)) => {
            eprintln!("{}", e);
            process::exit(70);
        }
    }
}

fn print_program(source: &str) {
    if let Ok(program) = Session::parse(source) {
        println!("{}", program);
    }
}
