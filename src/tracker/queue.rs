//! Ordered command log consumed by the external Piwik/Matomo script.
//!
//! The browser original appends tuples to the global `window._paq` array.
//! Here the queue is an explicit object owned by the page context so tests
//! and embedders can inspect it without ambient globals.

use std::fmt;
use std::sync::Mutex;

use serde_json::Value;

/// A single tracking directive: a command name plus its arguments, the
/// equivalent of one `_paq` tuple such as `['setSiteId', 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    name: String,
    args: Vec<Value>,
}

impl Command {
    pub fn new(name: impl Into<String>, args: impl IntoIterator<Item = Value>) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }

    /// A bare command with no arguments, e.g. `enableLinkTracking`.
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, [])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Append-only command queue. Push order is preserved exactly; the external
/// tracking script drains it asynchronously on its own schedule.
#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Mutex<Vec<Command>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, command: Command) {
        log::debug!("queue push: {command}");
        self.commands.lock().unwrap().push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.lock().unwrap().is_empty()
    }

    pub fn contains(&self, command: &Command) -> bool {
        self.commands.lock().unwrap().iter().any(|c| c == command)
    }

    pub fn snapshot(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }
}
