//! Kotazy CLI

use clap::{Parser, Subcommand};
use kotazy::error::report_error;
use kotazy::repl::Repl;
use kotazy::{Config, Console, Value};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "kotazy", version, about = "Kotazy call-language engine")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a source file
    Run {
        /// Source file to run
        file: PathBuf,
    },
    /// Run code given on the command line
    Exec {
        /// Code block, e.g. `{ out("hi") }`
        code: String,
    },
    /// Evaluate a restricted expression
    Eval {
        /// Expression, e.g. `2 + 3 * 4`
        expr: String,
    },
    /// Parse and dump the AST as JSON (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
        /// Dump the concrete tree instead of the AST
        #[arg(long)]
        concrete: bool,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
    /// Start the interactive REPL
    Repl,
}

fn main() {
    kotazy::init_tracing();
    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::Run { file } => run_file(&config, &file),
        Command::Exec { code } => run_source(&config, "<exec>", &code),
        Command::Eval { expr } => eval_expression(&config, &expr),
        Command::Parse { file, concrete } => parse_file(&file, concrete),
        Command::Tokens { file } => tokenize_file(&file),
        Command::Repl => start_repl(&config),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Config::load_from_file(path)?),
        None => Ok(Config::default()),
    }
}

fn run_file(config: &Config, path: &Path) -> CliResult {
    let source = std::fs::read_to_string(path)?;
    run_source(config, &path.display().to_string(), &source)
}

fn run_source(config: &Config, filename: &str, source: &str) -> CliResult {
    let mut runner = config.runner(Console::stdout())?;
    match runner.run(source) {
        Ok(Value::None) => Ok(()),
        Ok(value) => {
            println!("{value}");
            Ok(())
        }
        Err(err) => {
            report_error(filename, source, &err)?;
            std::process::exit(1);
        }
    }
}

fn eval_expression(config: &Config, expr: &str) -> CliResult {
    let runner = config.runner(Console::stdout())?;
    match runner.eval_in_environment(expr) {
        Ok(value) => {
            println!("{value}");
            Ok(())
        }
        Err(err) => {
            report_error("<expr>", expr, &err)?;
            std::process::exit(1);
        }
    }
}

fn parse_file(path: &Path, concrete: bool) -> CliResult {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    let tree = match kotazy::parse(&source) {
        Ok(tree) => tree,
        Err(err) => {
            report_error(&filename, &source, &err)?;
            std::process::exit(1);
        }
    };

    if concrete {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&kotazy::lower(&tree))?);
    }
    Ok(())
}

fn tokenize_file(path: &Path) -> CliResult {
    let source = std::fs::read_to_string(path)?;

    let tokens = kotazy::lexer::tokenize(&source)?;
    for (tok, span) in &tokens {
        println!("{:?} @ {}..{}", tok, span.start, span.end);
    }

    Ok(())
}

fn start_repl(config: &Config) -> CliResult {
    let runner = config.runner(Console::stdout())?;
    let mut repl = Repl::new(runner, &config.repl)?;
    repl.run()?;
    Ok(())
}
