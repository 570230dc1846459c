//! Execution context threaded through every command.

use std::fmt::Display;
use std::io::Write;

use crate::config::C6Config;

/// Configuration plus the two output sinks of one invocation.
///
/// `out` receives answers, `log` receives status lines meant for the user.
pub struct Context<'a> {
    pub config: &'a C6Config,
    pub out: &'a mut dyn Write,
    pub log: &'a mut dyn Write,
}

impl<'a> Context<'a> {
    pub fn new(config: &'a C6Config, out: &'a mut dyn Write, log: &'a mut dyn Write) -> Self {
        Self { config, out, log }
    }

    /// Write one status line. Failures to write are ignored.
    pub fn log_line(&mut self, message: impl Display) {
        let _ = writeln!(self.log, "{}", message);
    }
}
