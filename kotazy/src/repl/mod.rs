//! REPL (Read-Eval-Print Loop) for the call language

use crate::config::ReplConfig;
use crate::interp::Value;
use crate::runner::Runner;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const HISTORY_FILE: &str = ".kotazy_history";

/// What a line of input produced
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Nothing,
    Value(String),
    Text(String),
    Error(String),
    Clear,
    Quit,
}

/// Line handling, independent of the terminal
pub struct ReplEngine {
    runner: Runner,
}

impl ReplEngine {
    pub fn new(runner: Runner) -> Self {
        ReplEngine { runner }
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    pub fn handle(&mut self, line: &str) -> Reply {
        let line = line.trim();
        if line.is_empty() {
            return Reply::Nothing;
        }
        if line.starts_with(':') {
            return self.handle_command(line);
        }
        if let Some(expr) = line.strip_prefix('=') {
            return reply(self.runner.eval_in_environment(expr));
        }
        if line.starts_with('{') {
            return reply(self.runner.run(line));
        }
        Reply::Error("expected a code block `{ ... }`, `=expression` or a :command".to_string())
    }

    /// Handle REPL commands (starting with :)
    fn handle_command(&mut self, cmd: &str) -> Reply {
        match cmd {
            ":quit" | ":q" | ":exit" => Reply::Quit,
            ":help" | ":h" | ":?" => Reply::Text(help_text()),
            ":env" => Reply::Text(self.runner.environment().borrow().to_string()),
            ":reset" => {
                self.runner.reset_environment();
                Reply::Text("environment reset".to_string())
            }
            ":clear" => Reply::Clear,
            _ => Reply::Error(format!("Unknown command: {cmd}\nType :help for help.")),
        }
    }
}

fn reply(result: crate::Result<Value>) -> Reply {
    match result {
        Ok(Value::None) => Reply::Nothing,
        Ok(value) => Reply::Value(value.repr()),
        Err(err) => Reply::Error(err.to_string()),
    }
}

fn help_text() -> String {
    [
        "Kotazy REPL Commands:",
        "  :help, :h, :?   Show this help",
        "  :quit, :q       Exit the REPL",
        "  :env            Show the environment",
        "  :reset          Reset the environment to its defaults",
        "  :clear          Clear the screen",
        "",
        "You can enter:",
        "  - Code blocks: { set(x, 5); out(x) }",
        "  - Expressions over the environment: =x * 2",
        "",
        "Built-in functions:",
        "  out(a, ...)      Print values",
        "  set(name, v)     Bind a name",
        "  ret(a, ...)      Return a value (or a list)",
        "  def(name, {..})  Define a zero-argument function",
        "  lse() / fle()    List names / dump the environment",
        "  clc(\"e\") / pcl(\"e\") / ecl(\"e\")  Evaluate an expression",
    ]
    .join("\n")
}

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    engine: ReplEngine,
    prompt: String,
    history_path: Option<PathBuf>,
}

impl Repl {
    pub fn new(runner: Runner, config: &ReplConfig) -> RlResult<Self> {
        let mut editor = DefaultEditor::new()?;
        let history_path = config
            .history_file
            .clone()
            .or_else(|| dirs_home().map(|h| h.join(HISTORY_FILE)));

        if let Some(path) = &history_path {
            // A missing history file is normal on first start
            let _ = editor.load_history(path);
        }

        Ok(Repl {
            editor,
            engine: ReplEngine::new(runner),
            prompt: config.prompt.clone(),
            history_path,
        })
    }

    /// Run the REPL
    pub fn run(&mut self) -> RlResult<()> {
        println!("Kotazy REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.\n");

        loop {
            match self.editor.readline(&self.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = self.editor.add_history_entry(line.trim());
                    }
                    match self.engine.handle(&line) {
                        Reply::Nothing => {}
                        Reply::Value(text) | Reply::Text(text) => println!("{text}"),
                        Reply::Error(text) => eprintln!("{text}"),
                        Reply::Clear => print!("\x1B[2J\x1B[1;1H"),
                        Reply::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        if let Some(path) = &self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }
}

/// Get home directory
fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::Console;

    fn engine() -> ReplEngine {
        ReplEngine::new(Runner::with_console(Console::capture()))
    }

    #[test]
    fn test_handle_command_quit() {
        let mut engine = engine();
        assert_eq!(engine.handle(":quit"), Reply::Quit);
        assert_eq!(engine.handle(":q"), Reply::Quit);
        assert_eq!(engine.handle(":exit"), Reply::Quit);
    }

    #[test]
    fn test_handle_command_help() {
        let mut engine = engine();
        assert!(matches!(engine.handle(":help"), Reply::Text(t) if t.contains(":reset")));
        assert!(matches!(engine.handle(":?"), Reply::Text(_)));
    }

    #[test]
    fn test_handle_command_unknown() {
        let mut engine = engine();
        assert!(matches!(engine.handle(":nope"), Reply::Error(e) if e.contains(":nope")));
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(engine().handle("   "), Reply::Nothing);
    }

    #[test]
    fn test_block_value_and_output() {
        let mut engine = engine();
        assert_eq!(engine.handle("{ set(x, 5); out(x) }"), Reply::Nothing);
        assert_eq!(engine.runner().console().lines(), vec!["5.0"]);
        assert_eq!(engine.handle("{ ret(\"s\") }"), Reply::Value("'s'".to_string()));
    }

    #[test]
    fn test_expression_against_environment() {
        let mut engine = engine();
        engine.handle("{ set(x, 5) }");
        assert_eq!(engine.handle("= x * 2"), Reply::Value("10.0".to_string()));
    }

    #[test]
    fn test_reset_and_env() {
        let mut engine = engine();
        engine.handle("{ set(x, 5) }");
        assert!(matches!(engine.handle(":env"), Reply::Text(t) if t.contains("'x': 5.0")));
        engine.handle(":reset");
        assert!(matches!(engine.handle(":env"), Reply::Text(t) if !t.contains("'x'")));
    }

    #[test]
    fn test_errors_reported() {
        let mut engine = engine();
        assert!(matches!(engine.handle("{ out(y) }"), Reply::Error(e) if e.contains("undefined name: y")));
        assert!(matches!(engine.handle("out(1)"), Reply::Error(_)));
        assert!(matches!(engine.handle("{ out(1"), Reply::Error(e) if e.starts_with("Syntax error")));
    }
}
