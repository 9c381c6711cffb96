// src/core/dispatcher.rs

use crate::config::Settings;
use crate::core::command::{Command, Context, Resolution};
use crate::core::conventions::{Conventions, HyphenConventions};
use crate::core::help::{CommandInfo, HelpWriter, TextHelpWriter};
use crate::core::logger::{ConsoleLogger, Logger};
use crate::core::parsers::{ParserFactory, ParserRegistry};
use crate::core::validator;
use crate::models::ValidationResult;
use std::fmt;

/// Entry point of a command tree: owns the root command and the tree-wide
/// collaborators, and turns token lists into exit codes.
pub struct Dispatcher {
    root: Command,
    conventions: Box<dyn Conventions>,
    logger: Box<dyn Logger>,
    help: Box<dyn HelpWriter>,
    registry: ParserRegistry,
    settings: Settings,
}

impl Dispatcher {
    /// Hyphen conventions, console output and text help.
    pub fn new(root: Command) -> Self {
        Self {
            root,
            conventions: Box::new(HyphenConventions),
            logger: Box::new(ConsoleLogger::default()),
            help: Box::new(TextHelpWriter::default()),
            registry: ParserRegistry::new(),
            settings: Settings::default(),
        }
    }

    pub fn with_conventions(mut self, conventions: impl Conventions + 'static) -> Self {
        self.conventions = Box::new(conventions);
        self
    }

    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Box::new(logger);
        self
    }

    pub fn with_help_writer(mut self, help: impl HelpWriter + 'static) -> Self {
        self.help = Box::new(help);
        self
    }

    /// Applies the convention family, colour and failure code of `settings`.
    /// The console logger and text help writer are replaced to honour the
    /// colour choice, so call this before [`Dispatcher::with_logger`] and
    /// [`Dispatcher::with_help_writer`].
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.conventions = settings.conventions.conventions();
        self.logger = Box::new(ConsoleLogger::new(settings.color));
        self.help = Box::new(TextHelpWriter::new(settings.color));
        self.settings = settings;
        self
    }

    /// Makes a parser available to parameters declared with
    /// [`crate::ParameterDef::parser_named`].
    pub fn register_parser(mut self, tag: impl Into<String>, factory: ParserFactory) -> Self {
        self.registry.register(tag, factory);
        self
    }

    pub fn root(&self) -> &Command {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Command {
        &mut self.root
    }

    pub fn conventions(&self) -> &dyn Conventions {
        self.conventions.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn context(&self) -> Context<'_> {
        Context {
            conventions: self.conventions.as_ref(),
            logger: self.logger.as_ref(),
            registry: &self.registry,
            failure_code: self.settings.failure_exit_code,
        }
    }

    /// Resolves `tokens` without running anything.
    pub fn resolve(&self, tokens: &[String]) -> Resolution {
        self.root.resolve(tokens, &self.context())
    }

    /// Resolves and runs `tokens`, returning the process exit code.
    ///
    /// # Logic:
    /// 1. Resolve the tokens against the tree (sub-commands, then actions,
    ///    then the default action).
    /// 2. When nothing invokable comes out, log one error line naming the
    ///    tokens and the reason, print help for the deepest command reached
    ///    and return the failure code.
    /// 3. Otherwise write shared values back, run the before hook, the
    ///    action and the after hook, and return the resulting code.
    pub fn execute(&mut self, tokens: &[String]) -> i32 {
        let resolution = self.resolve(tokens);
        log::debug!(
            "Resolved {:?} to path {:?}, action {:?}.",
            tokens,
            resolution.path(),
            resolution.action_index()
        );

        if let Some(error) = resolution.error() {
            self.logger.error(format_args!(
                t!("dispatch.error.unrecognized"),
                tokens = tokens.join(" "),
                reason = error
            ));
            self.print_help(&resolution);
            return self.settings.failure_exit_code;
        }

        let ctx = Context {
            conventions: self.conventions.as_ref(),
            logger: self.logger.as_ref(),
            registry: &self.registry,
            failure_code: self.settings.failure_exit_code,
        };
        self.root
            .invoke(&resolution, &ctx)
            .unwrap_or(self.settings.failure_exit_code)
    }

    pub fn execute_args<I, S>(&mut self, args: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = args.into_iter().map(Into::into).collect();
        self.execute(&tokens)
    }

    /// Splits a shell-like line (quotes, escapes) and executes it.
    pub fn execute_line(&mut self, line: &str) -> i32 {
        match shlex::split(line) {
            Some(tokens) => self.execute(&tokens),
            None => {
                self.logger
                    .error(format_args!(t!("dispatch.error.bad_line"), line = line));
                self.settings.failure_exit_code
            }
        }
    }

    fn print_help(&self, resolution: &Resolution) {
        if !self.settings.help_on_failure {
            return;
        }
        let Some(command) = self.root.descendant(resolution.path()) else {
            return;
        };
        let action = resolution
            .action_index()
            .and_then(|i| command.actions().get(i))
            .map(|a| a.conventional_name(self.conventions.as_ref()));
        let info = CommandInfo::new(command, self.conventions.as_ref());
        self.logger
            .info(format_args!("{}", self.help.write(&info, action.as_deref())));
    }

    /// Help text for the command reached by following `path` (command names)
    /// from the root, optionally narrowed to one action.
    pub fn help(&self, path: &[&str], action: Option<&str>) -> Option<String> {
        let conventions = self.conventions.as_ref();
        let command = path
            .iter()
            .try_fold(&self.root, |node, name| node.child(name, conventions))?;
        Some(self.help.write(&CommandInfo::new(command, conventions), action))
    }

    /// The root command as plain data.
    pub fn describe(&self) -> CommandInfo {
        CommandInfo::new(&self.root, self.conventions.as_ref())
    }

    pub fn validate(&self) -> Vec<ValidationResult> {
        validator::validate(&self.root, self.conventions.as_ref())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("root", &self.root.raw_name())
            .field("conventions", &self.conventions.family())
            .field("logger", &self.logger)
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::ActionDef;
    use crate::core::command::{Call, Handler};
    use crate::core::logger::{Level, MemoryLogger};
    use crate::core::parameter::ParameterDef;
    use crate::models::Outcome;
    use std::cell::RefCell;
    use std::io::{self, Write};
    use std::rc::Rc;

    struct Echo;

    impl Handler for Echo {
        fn actions(&self) -> Vec<ActionDef> {
            vec![ActionDef::new("say").parameter(ParameterDef::string("text"))]
        }

        fn invoke(&mut self, call: &Call<'_>) -> anyhow::Result<Outcome> {
            let text: String = call.args().get("text")?;
            call.logger().info(format_args!("{}", text));
            Ok(Outcome::Unit)
        }
    }

    fn dispatcher(logger: &MemoryLogger) -> Dispatcher {
        Dispatcher::new(Command::new(Echo))
            .with_logger(logger.clone())
            .with_help_writer(TextHelpWriter::new(false))
    }

    #[test]
    fn test_execute_line_splits_quotes() {
        let logger = MemoryLogger::new();
        let mut d = dispatcher(&logger);
        assert_eq!(d.execute_line("say \"hello world\""), 0);
        assert_eq!(logger.messages(Level::Info), ["hello world"]);
    }

    #[test]
    fn test_execute_line_unbalanced_quote() {
        let logger = MemoryLogger::new();
        let mut d = dispatcher(&logger);
        assert_eq!(d.execute_line("say \"oops"), -1);
        assert_eq!(logger.messages(Level::Error).len(), 1);
    }

    #[test]
    fn test_failure_prints_action_help() {
        let logger = MemoryLogger::new();
        let mut d = dispatcher(&logger);
        assert_eq!(d.execute_args(["say"]), -1);
        let errors = logger.messages(Level::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'say'"), "{}", errors[0]);
        assert!(errors[0].contains("text"), "{}", errors[0]);
        let info = logger.messages(Level::Info);
        assert_eq!(info.len(), 1);
        assert!(info[0].contains("--text <string>"));
    }

    #[test]
    fn test_settings_change_failure_code_and_help() {
        let logger = MemoryLogger::new();
        let settings = Settings {
            failure_exit_code: 9,
            help_on_failure: false,
            ..Settings::default()
        };
        let mut d = Dispatcher::new(Command::new(Echo))
            .with_settings(settings)
            .with_logger(logger.clone());
        assert_eq!(d.execute_args(["nope"]), 9);
        assert!(logger.messages(Level::Info).is_empty());
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
    fn test_default_logger_is_console() {
        let d = Dispatcher::new(Command::new(Echo));
        assert!(format!("{:?}", d).contains("ConsoleLogger { color: true"));

        let plain = Dispatcher::new(Command::new(Echo)).with_settings(Settings {
            color: false,
            ..Settings::default()
        });
        assert!(format!("{:?}", plain).contains("ConsoleLogger { color: false"));
    }

    #[test]
    fn test_console_failure_writes_error_and_help() {
        let (out, err) = (Captured::default(), Captured::default());
        let mut d = Dispatcher::new(Command::new(Echo))
            .with_logger(ConsoleLogger::with_writers(false, out.clone(), err.clone()))
            .with_help_writer(TextHelpWriter::new(false));
        assert_eq!(d.execute_args(["nope"]), -1);

        let err = err.text();
        assert_eq!(err.lines().count(), 1, "{}", err);
        assert!(err.starts_with("Error: Unrecognized command sequence: 'nope'."), "{}", err);
        assert!(out.text().contains("say"), "{}", out.text());
    }

    #[test]
    fn test_help_by_path() {
        let d = Dispatcher::new(Command::new(Echo)).with_help_writer(TextHelpWriter::new(false));
        assert!(d.help(&[], None).is_some_and(|h| h.contains("say")));
        assert!(d.help(&["missing"], None).is_none());
        assert_eq!(d.describe().name, "echo");
    }
}
