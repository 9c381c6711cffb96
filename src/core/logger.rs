// src/core/logger.rs

use crate::constants::DEFAULT_LOG_FILTER;
use colored::Colorize;
use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

/// Sink for the user-facing messages a dispatcher and its actions produce.
pub trait Logger: fmt::Debug {
    fn info(&self, args: fmt::Arguments<'_>);
    fn warning(&self, args: fmt::Arguments<'_>);
    fn error(&self, args: fmt::Arguments<'_>);
}

/// Forwards to the `log` facade. Nothing is shown unless the binary installs
/// a logger (see [`init_env_logger`]) whose filter lets the level through.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLogger;

impl Logger for LogLogger {
    fn info(&self, args: fmt::Arguments<'_>) {
        log::info!("{}", args);
    }

    fn warning(&self, args: fmt::Arguments<'_>) {
        log::warn!("{}", args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        log::error!("{}", args);
    }
}

type Sink = Rc<RefCell<dyn Write>>;

/// Writes info to stdout and warnings and errors to stderr, with coloured
/// level labels when enabled. This is the dispatcher's default.
#[derive(Clone)]
pub struct ConsoleLogger {
    color: bool,
    out: Sink,
    err: Sink,
}

impl ConsoleLogger {
    pub fn new(color: bool) -> Self {
        Self::with_writers(color, io::stdout(), io::stderr())
    }

    /// Writes info to `out` and warnings and errors to `err` instead of the
    /// standard streams.
    pub fn with_writers(color: bool, out: impl Write + 'static, err: impl Write + 'static) -> Self {
        Self {
            color,
            out: Rc::new(RefCell::new(out)),
            err: Rc::new(RefCell::new(err)),
        }
    }

    pub fn color(&self) -> bool {
        self.color
    }

    fn label(&self, text: &str, paint: fn(&str) -> colored::ColoredString) -> String {
        if self.color {
            paint(text).bold().to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new(true)
    }
}

impl fmt::Debug for ConsoleLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleLogger")
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

// Write failures on the console streams are dropped; there is nowhere left to
// report them.
impl Logger for ConsoleLogger {
    fn info(&self, args: fmt::Arguments<'_>) {
        let _ = writeln!(self.out.borrow_mut(), "{}", args);
    }

    fn warning(&self, args: fmt::Arguments<'_>) {
        let label = self.label("Warning", |s| s.yellow());
        let _ = writeln!(self.err.borrow_mut(), "{}: {}", label, args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        let label = self.label("Error", |s| s.red());
        let _ = writeln!(self.err.borrow_mut(), "{}: {}", label, args);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: Level,
    pub message: String,
}

/// Records every message in memory. Clones share the same record, so a test
/// can keep one handle and give another to the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    lines: Rc<RefCell<Vec<LogLine>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.borrow().clone()
    }

    /// Messages of one level, oldest first.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter(|line| line.level == level)
            .map(|line| line.message.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }

    fn push(&self, level: Level, args: fmt::Arguments<'_>) {
        self.lines.borrow_mut().push(LogLine {
            level,
            message: args.to_string(),
        });
    }
}

impl Logger for MemoryLogger {
    fn info(&self, args: fmt::Arguments<'_>) {
        self.push(Level::Info, args);
    }

    fn warning(&self, args: fmt::Arguments<'_>) {
        self.push(Level::Warning, args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.push(Level::Error, args);
    }
}

/// Installs `env_logger` for binaries built on this crate. `RUST_LOG` wins
/// over the default filter. Calling it twice is harmless.
pub fn init_env_logger() {
    let env = env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized.");
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_logger_shares_record_between_clones() {
        let logger = MemoryLogger::new();
        let handle = logger.clone();
        logger.info(format_args!("one {}", 1));
        logger.error(format_args!("two"));

        assert_eq!(handle.messages(Level::Info), ["one 1"]);
        assert_eq!(handle.messages(Level::Error), ["two"]);
        assert_eq!(handle.lines().len(), 2);

        handle.clear();
        assert!(logger.lines().is_empty());
    }

    #[derive(Clone, Default)]
    struct Captured(Rc<RefCell<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    #[test]
    fn test_console_label_without_color_is_plain() {
        let logger = ConsoleLogger::new(false);
        assert_eq!(logger.label("Error", |s| s.red()), "Error");
        assert!(!logger.color());
    }

    #[test]
    fn test_console_splits_streams() {
        let (out, err) = (Captured::default(), Captured::default());
        let logger = ConsoleLogger::with_writers(false, out.clone(), err.clone());
        logger.info(format_args!("help {}", 1));
        logger.warning(format_args!("careful"));
        logger.error(format_args!("bad"));

        assert_eq!(out.text(), "help 1\n");
        assert_eq!(err.text(), "Warning: careful\nError: bad\n");
    }

    #[test]
    fn test_init_env_logger_twice() {
        init_env_logger();
        init_env_logger();
    }
}
