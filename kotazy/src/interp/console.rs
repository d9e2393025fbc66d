//! Output sink for printing built-ins

use std::cell::RefCell;
use std::rc::Rc;

/// Where `out`, `lse` and `fle` write their lines
#[derive(Debug, Clone, Default)]
pub struct Console {
    captured: Option<Rc<RefCell<Vec<String>>>>,
}

impl Console {
    /// Print to standard output
    pub fn stdout() -> Self {
        Self::default()
    }

    /// Collect lines in memory
    pub fn capture() -> Self {
        Console {
            captured: Some(Rc::new(RefCell::new(Vec::new()))),
        }
    }

    pub fn is_captured(&self) -> bool {
        self.captured.is_some()
    }

    pub fn write_line(&self, line: &str) {
        match &self.captured {
            Some(lines) => lines.borrow_mut().push(line.to_string()),
            None => println!("{line}"),
        }
    }

    /// Captured lines so far; empty for stdout
    pub fn lines(&self) -> Vec<String> {
        self.captured
            .as_ref()
            .map(|lines| lines.borrow().clone())
            .unwrap_or_default()
    }

    /// Drain captured lines
    pub fn take_lines(&self) -> Vec<String> {
        self.captured
            .as_ref()
            .map(|lines| std::mem::take(&mut *lines.borrow_mut()))
            .unwrap_or_default()
    }
}
