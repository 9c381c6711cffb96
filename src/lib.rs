//! # cmdlet
//!
//! A library for building command-line applications out of a tree of commands.
//! Each command exposes a set of actions (callable operations) with typed
//! parameters, and the [`Dispatcher`] turns a raw argv-style token list into a
//! validated invocation of one of them, or reports precisely why it could not.
//!
//! ```no_run
//! use cmdlet::{ActionDef, Call, Command, Dispatcher, Handler, Outcome, ParameterDef};
//!
//! struct GreetCommand;
//!
//! impl Handler for GreetCommand {
//!     fn actions(&self) -> Vec<ActionDef> {
//!         vec![ActionDef::new("hello")
//!             .default_action()
//!             .parameter(ParameterDef::string("name").default_value("world"))]
//!     }
//!
//!     fn invoke(&mut self, call: &Call<'_>) -> anyhow::Result<Outcome> {
//!         let name: String = call.args().get("name")?;
//!         call.logger().info(format_args!("Hello, {}!", name));
//!         Ok(Outcome::Unit)
//!     }
//! }
//!
//! let mut dispatcher = Dispatcher::new(Command::new(GreetCommand));
//! let code = dispatcher.execute_args(std::env::args().skip(1));
//! std::process::exit(code);
//! ```

include!(concat!(env!("OUT_DIR"), "/messages.rs"));

pub mod config;
pub mod constants;
pub mod core;
pub mod models;

pub use crate::config::{ConventionStyle, Settings};
pub use crate::core::action::{Action, ActionDef};
pub use crate::core::coercion::coerce;
pub use crate::core::command::{Call, Command, Context, Handler, Resolution};
pub use crate::core::conventions::{Conventions, HyphenConventions, SlashConventions};
pub use crate::core::dispatcher::Dispatcher;
pub use crate::core::engine::{Arguments, Bindings, Slot};
pub use crate::core::error::{
    ArgumentError, CoercionError, ConfigError, ParseError, ResolveError,
};
pub use crate::core::help::{
    ActionInfo, CommandInfo, CommandSummary, HelpWriter, JsonHelpWriter, ParameterInfo,
    TextHelpWriter,
};
pub use crate::core::logger::{
    ConsoleLogger, Level, LogLine, LogLogger, Logger, MemoryLogger, init_env_logger,
};
pub use crate::core::parameter::{Origin, Parameter, ParameterDef};
pub use crate::core::parsers::{Parsed, Parser, ParserFactory, ParserRegistry, parser_factory};
pub use crate::core::validator::validate;
pub use crate::models::{FromValue, Outcome, TypeSpec, ValidationResult, Value, ValueKind};
