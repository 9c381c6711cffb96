// src/core/command.rs

use crate::core::action::{Action, ActionDef};
use crate::core::conventions::Conventions;
use crate::core::engine::{Arguments, Bindings, Engine};
use crate::core::error::ResolveError;
use crate::core::logger::Logger;
use crate::core::parameter::{Origin, Parameter, ParameterDef};
use crate::core::parsers::ParserRegistry;
use crate::models::{Outcome, Value};
use anyhow::Result;
use std::fmt;

// --- HANDLER CONTRACT ---

/// What a command type implements to take part in a command tree.
///
/// Actions and shared parameters are declared explicitly, once, when the
/// [`Command`] is built. The dispatcher then calls [`Handler::invoke`] with
/// the parsed arguments of whichever action the tokens selected.
pub trait Handler {
    /// Raw name the command's conventional name is derived from. Defaults to
    /// the implementing type's name.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn description(&self) -> &str {
        ""
    }

    fn actions(&self) -> Vec<ActionDef>;

    /// Parameters available to every action of this command.
    fn shared_parameters(&self) -> Vec<ParameterDef> {
        Vec::new()
    }

    /// Receives each shared parameter's value right before an action of this
    /// command runs. A missing value arrives as its declared default.
    fn apply_shared(&mut self, _name: &str, _value: &Value) -> Result<()> {
        Ok(())
    }

    fn before_execute(&mut self, _call: &Call<'_>) {}

    fn invoke(&mut self, call: &Call<'_>) -> Result<Outcome>;

    /// Runs after the action body; may replace the exit code.
    fn after_execute(&mut self, _call: &Call<'_>, exit_code: i32) -> i32 {
        exit_code
    }
}

/// Everything an action body gets to see about its invocation.
pub struct Call<'a> {
    action: &'a Action,
    args: &'a Arguments,
    logger: &'a dyn Logger,
    conventions: &'a dyn Conventions,
}

impl<'a> Call<'a> {
    /// Raw name of the selected action, as registered.
    pub fn action(&self) -> &'a str {
        self.action.name()
    }

    pub fn action_def(&self) -> &'a Action {
        self.action
    }

    pub fn args(&self) -> &'a Arguments {
        self.args
    }

    pub fn logger(&self) -> &'a dyn Logger {
        self.logger
    }

    pub fn conventions(&self) -> &'a dyn Conventions {
        self.conventions
    }
}

impl fmt::Debug for Call<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("action", &self.action.name())
            .field("args", self.args)
            .finish_non_exhaustive()
    }
}

// --- CONTEXT ---

/// The tree-wide collaborators, passed down explicitly instead of being
/// looked up through parent links.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub conventions: &'a dyn Conventions,
    pub logger: &'a dyn Logger,
    pub registry: &'a ParserRegistry,
    pub failure_code: i32,
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("conventions", &self.conventions.family())
            .field("failure_code", &self.failure_code)
            .finish_non_exhaustive()
    }
}

/// Where resolution ended: the path of child indices walked from the root,
/// the selected action (if any) and the parse result.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    path: Vec<usize>,
    action: Option<usize>,
    result: std::result::Result<Bindings, ResolveError>,
}

impl Resolution {
    /// True when an action was selected and all of its parameters are set.
    pub fn can_invoke(&self) -> bool {
        self.action.is_some() && self.result.is_ok()
    }

    /// Child indices from the root to the deepest resolved command.
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub fn action_index(&self) -> Option<usize> {
        self.action
    }

    pub fn bindings(&self) -> Option<&Bindings> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ResolveError> {
        self.result.as_ref().err()
    }
}

// --- COMMAND NODE ---

/// A node of the command tree: a handler, its declared actions and shared
/// parameters, and its sub-commands.
pub struct Command {
    raw_name: String,
    handler: Box<dyn Handler>,
    actions: Vec<Action>,
    shared: Vec<Parameter>,
    children: Vec<Command>,
}

impl Command {
    /// Builds a command whose name derives from the handler's type name.
    pub fn new(handler: impl Handler + 'static) -> Self {
        let raw_name = handler.type_name().to_string();
        Self::build(raw_name, Box::new(handler))
    }

    /// Builds a command registered under an explicit raw name.
    pub fn named(name: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::build(name.into(), Box::new(handler))
    }

    fn build(raw_name: String, handler: Box<dyn Handler>) -> Self {
        let actions = handler.actions().into_iter().map(Action::from).collect();
        let shared = handler
            .shared_parameters()
            .into_iter()
            .enumerate()
            .map(|(position, def)| Parameter::new(def, Origin::Command, position))
            .collect();
        Self {
            raw_name,
            handler,
            actions,
            shared,
            children: Vec::new(),
        }
    }

    /// Registers `child` as a sub-command. A previously registered child with
    /// the same raw name is replaced.
    pub fn register(&mut self, child: Command) -> &mut Self {
        if let Some(existing) = self
            .children
            .iter_mut()
            .find(|c| c.raw_name == child.raw_name)
        {
            log::warn!("Sub-command '{}' registered twice; keeping the last one.", child.raw_name);
            *existing = child;
        } else {
            self.children.push(child);
        }
        self
    }

    /// Builder form of [`Command::register`].
    pub fn with(mut self, child: Command) -> Self {
        self.register(child);
        self
    }

    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    pub fn name(&self, conventions: &dyn Conventions) -> String {
        conventions.command_name(&self.raw_name)
    }

    pub fn description(&self) -> &str {
        self.handler.description()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn shared_parameters(&self) -> &[Parameter] {
        &self.shared
    }

    pub fn children(&self) -> &[Command] {
        &self.children
    }

    pub fn child(&self, name: &str, conventions: &dyn Conventions) -> Option<&Command> {
        self.children.iter().find(|c| c.name(conventions) == name)
    }

    /// The command at `path` (child indices) below this one.
    pub fn descendant(&self, path: &[usize]) -> Option<&Command> {
        path.iter()
            .try_fold(self, |node, &i| node.children.get(i))
    }

    fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut Command> {
        path.iter()
            .try_fold(self, |node, &i| node.children.get_mut(i))
    }

    /// The first action marked default, if any.
    pub fn default_action(&self) -> Option<&Action> {
        self.actions.iter().find(|a| a.is_default())
    }

    pub fn find_action(&self, token: &str, conventions: &dyn Conventions) -> Option<&Action> {
        self.actions
            .iter()
            .find(|a| a.is_identified_by(token, conventions))
    }

    // --- RESOLUTION ---

    /// Resolves `tokens` against this command and its sub-tree.
    ///
    /// # Logic:
    /// - A leading token naming a sub-command descends into it, before any
    ///   action of this command is considered.
    /// - A leading token naming an action (or an alias of one) selects it and
    ///   the rest of the tokens are parsed against it.
    /// - Otherwise the default action gets the whole token list, head included.
    pub fn resolve(&self, tokens: &[String], ctx: &Context<'_>) -> Resolution {
        let mut path = Vec::new();
        self.resolve_into(tokens, ctx, &mut path)
    }

    fn resolve_into(&self, tokens: &[String], ctx: &Context<'_>, path: &mut Vec<usize>) -> Resolution {
        let conventions = ctx.conventions;

        if let Some((head, rest)) = tokens.split_first() {
            if let Some(i) = self
                .children
                .iter()
                .position(|c| c.name(conventions) == *head)
            {
                log::debug!("'{}' selects sub-command of '{}'.", head, self.raw_name);
                path.push(i);
                if let Some(child) = self.children.get(i) {
                    return child.resolve_into(rest, ctx, path);
                }
            }
            if let Some(i) = self
                .actions
                .iter()
                .position(|a| a.is_identified_by(head, conventions))
            {
                log::debug!("'{}' selects action of '{}'.", head, self.raw_name);
                return self.bind(i, rest, ctx, path);
            }
        }

        if let Some(i) = self.actions.iter().position(Action::is_default) {
            log::debug!("Falling back to default action of '{}'.", self.raw_name);
            return self.bind(i, tokens, ctx, path);
        }

        let command = self.name(conventions);
        let error = match tokens.first() {
            None => ResolveError::NoAction { command },
            Some(token) => ResolveError::Unrecognized {
                command,
                token: token.clone(),
            },
        };
        Resolution {
            path: path.clone(),
            action: None,
            result: Err(error),
        }
    }

    fn bind(&self, index: usize, tokens: &[String], ctx: &Context<'_>, path: &[usize]) -> Resolution {
        let engine = Engine::new(ctx.conventions, ctx.registry);
        let result = self.actions.get(index).map_or_else(
            || {
                Err(ResolveError::NoAction {
                    command: self.name(ctx.conventions),
                })
            },
            |action| {
                let bindings = engine.parse(tokens, action, &self.shared)?;
                if action.can_invoke(&bindings) {
                    Ok(bindings)
                } else {
                    Err(ResolveError::NotInvokable {
                        action: action.conventional_name(ctx.conventions),
                        missing: action.missing_parameters(&bindings),
                    })
                }
            },
        );
        Resolution {
            path: path.to_vec(),
            action: Some(index),
            result,
        }
    }

    // --- INVOCATION ---

    /// Runs a resolved, invokable action on the command at the resolution's
    /// path. Returns `None` when the resolution cannot be invoked.
    pub(crate) fn invoke(&mut self, resolution: &Resolution, ctx: &Context<'_>) -> Option<i32> {
        let bindings = resolution.bindings()?;
        let index = resolution.action_index()?;
        let node = self.descendant_mut(resolution.path())?;
        node.run(index, bindings, ctx)
    }

    fn run(&mut self, index: usize, bindings: &Bindings, ctx: &Context<'_>) -> Option<i32> {
        let Self {
            handler,
            actions,
            shared,
            ..
        } = self;
        let action = actions.get(index)?;

        for (parameter, slot) in shared.iter().zip(bindings.shared_slots()) {
            let value = match (slot.value(), parameter.default()) {
                (Value::Missing, Some(default)) => default,
                (value, _) => value,
            };
            if let Err(e) = handler.apply_shared(parameter.name(), value) {
                ctx.logger.error(format_args!(
                    t!("dispatch.error.action_failed"),
                    action = action.conventional_name(ctx.conventions),
                    error = e
                ));
                return Some(ctx.failure_code);
            }
        }

        let args = Arguments::new(action, bindings);
        let call = Call {
            action,
            args: &args,
            logger: ctx.logger,
            conventions: ctx.conventions,
        };

        handler.before_execute(&call);
        let exit_code = match handler.invoke(&call) {
            Ok(outcome) => outcome.exit_code(ctx.failure_code),
            Err(e) => {
                ctx.logger.error(format_args!(
                    t!("dispatch.error.action_failed"),
                    action = action.conventional_name(ctx.conventions),
                    error = e
                ));
                ctx.failure_code
            }
        };
        Some(handler.after_execute(&call, exit_code))
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("raw_name", &self.raw_name)
            .field("actions", &self.actions)
            .field("shared", &self.shared)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conventions::HyphenConventions;
    use crate::core::logger::MemoryLogger;

    struct Books {
        verbose: bool,
        seen: Vec<String>,
    }

    impl Handler for Books {
        fn actions(&self) -> Vec<ActionDef> {
            vec![
                ActionDef::new("search")
                    .default_action()
                    .parameter(ParameterDef::string("title")),
                ActionDef::new("count").alias("n"),
            ]
        }

        fn shared_parameters(&self) -> Vec<ParameterDef> {
            vec![ParameterDef::boolean("verbose").alias("v")]
        }

        fn apply_shared(&mut self, name: &str, value: &Value) -> Result<()> {
            if name == "verbose" {
                self.verbose = *value == Value::Bool(true);
            }
            Ok(())
        }

        fn invoke(&mut self, call: &Call<'_>) -> Result<Outcome> {
            self.seen.push(call.action().to_string());
            Ok(Outcome::Code(if self.verbose { 2 } else { 0 }))
        }
    }

    struct Sub;

    impl Handler for Sub {
        fn actions(&self) -> Vec<ActionDef> {
            vec![ActionDef::new("action")]
        }

        fn invoke(&mut self, _call: &Call<'_>) -> Result<Outcome> {
            Ok(Outcome::Code(7))
        }
    }

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn tree() -> Command {
        Command::new(Books {
            verbose: false,
            seen: Vec::new(),
        })
        .with(Command::named("search", Sub))
        .with(Command::new(Sub))
    }

    fn with_ctx<R>(f: impl FnOnce(&Context<'_>) -> R) -> R {
        let logger = MemoryLogger::new();
        let registry = ParserRegistry::new();
        let ctx = Context {
            conventions: &HyphenConventions,
            logger: &logger,
            registry: &registry,
            failure_code: -1,
        };
        f(&ctx)
    }

    #[test]
    fn test_name_derives_from_type() {
        let command = Command::new(Sub);
        assert_eq!(command.name(&HyphenConventions), "sub");
        assert_eq!(Command::named("BookStoreCommand", Sub).name(&HyphenConventions), "book-store");
    }

    #[test]
    fn test_register_replaces_same_raw_name() {
        let mut root = Command::named("root", Sub);
        root.register(Command::named("x", Sub));
        root.register(Command::named("x", Sub));
        assert_eq!(root.children().len(), 1);
    }

    #[test]
    fn test_sub_command_precedence() {
        with_ctx(|ctx| {
            let root = tree();
            // "search" is both an action and a sub-command name; the sub-command wins.
            let resolution = root.resolve(&tokens(&["search", "action"]), ctx);
            assert_eq!(resolution.path(), &[0]);
            assert!(resolution.can_invoke());
        });
    }

    #[test]
    fn test_action_by_alias_and_default_fallback() {
        with_ctx(|ctx| {
            let root = tree();
            let by_alias = root.resolve(&tokens(&["n"]), ctx);
            assert_eq!(by_alias.action_index(), Some(1));
            assert!(by_alias.path().is_empty());

            let fallback = root.resolve(&tokens(&["dune"]), ctx);
            assert_eq!(fallback.action_index(), Some(0));
            assert!(fallback.can_invoke());
        });
    }

    #[test]
    fn test_unresolved_cases() {
        with_ctx(|ctx| {
            let leaf = Command::new(Sub);
            let empty = leaf.resolve(&[], ctx);
            assert_eq!(
                empty.error(),
                Some(&ResolveError::NoAction {
                    command: "sub".into()
                })
            );

            let unknown = leaf.resolve(&tokens(&["nope"]), ctx);
            assert!(!unknown.can_invoke());
            assert!(matches!(unknown.error(), Some(ResolveError::Unrecognized { .. })));

            let root = tree();
            let missing = root.resolve(&[], ctx);
            assert!(matches!(
                missing.error(),
                Some(ResolveError::NotInvokable { .. })
            ));
        });
    }

    #[test]
    fn test_shared_values_written_back_before_invoke() {
        with_ctx(|ctx| {
            let mut root = tree();
            let resolution = root.resolve(&tokens(&["count", "-v"]), ctx);
            assert_eq!(root.invoke(&resolution, ctx), Some(2));

            // Fresh bindings each call: verbose is written back as false again.
            let resolution = root.resolve(&tokens(&["count"]), ctx);
            assert_eq!(root.invoke(&resolution, ctx), Some(0));
        });
    }

    #[test]
    fn test_invoke_refuses_unresolved() {
        with_ctx(|ctx| {
            let mut root = tree();
            let resolution = root.resolve(&[], ctx);
            assert_eq!(root.invoke(&resolution, ctx), None);
        });
    }
}
