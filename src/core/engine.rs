// src/core/engine.rs

//! The parse pass: binds a token list to an action's parameters and its
//! command's shared parameters.
//!
//! Values are written into a fresh [`Bindings`] table for every pass, so
//! nothing parsed for one invocation leaks into the next. Only the shared
//! values are later written back to the long-lived command.

use crate::core::action::Action;
use crate::core::conventions::Conventions;
use crate::core::error::{ArgumentError, ParseError};
use crate::core::parameter::{CustomParser, Parameter};
use crate::core::parsers::{Parser, ParserRegistry};
use crate::models::{FromValue, Value};

// --- VALUE SLOTS ---

/// The value of one parameter during one invocation, and whether it counts
/// as set.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    value: Value,
    set: bool,
}

impl Slot {
    pub fn set(value: Value) -> Self {
        Self { value, set: true }
    }

    pub fn unset() -> Self {
        Self {
            value: Value::Missing,
            set: false,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// True once a value has been written, including an explicit null.
    pub fn is_set(&self) -> bool {
        self.set
    }
}

/// Which parameter table a token was bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Action(usize),
    Shared(usize),
}

/// Per-invocation values for an action's parameters and its command's
/// shared parameters, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Bindings {
    action: Vec<Slot>,
    shared: Vec<Slot>,
}

impl Bindings {
    /// Every slot in its unset state.
    pub fn fresh(action: &Action, shared: &[Parameter]) -> Self {
        Self {
            action: action.parameters().iter().map(Parameter::unset_slot).collect(),
            shared: shared.iter().map(Parameter::unset_slot).collect(),
        }
    }

    pub fn action_slots(&self) -> &[Slot] {
        &self.action
    }

    pub fn shared_slots(&self) -> &[Slot] {
        &self.shared
    }

    pub fn write(&mut self, target: Target, value: Value) {
        let slot = match target {
            Target::Action(i) => self.action.get_mut(i),
            Target::Shared(i) => self.shared.get_mut(i),
        };
        if let Some(slot) = slot {
            *slot = Slot::set(value);
        }
    }
}

// --- PARSE PASS ---

/// Runs the parse pass under one set of conventions.
pub struct Engine<'a> {
    conventions: &'a dyn Conventions,
    registry: &'a ParserRegistry,
}

impl<'a> Engine<'a> {
    pub fn new(conventions: &'a dyn Conventions, registry: &'a ParserRegistry) -> Self {
        Self {
            conventions,
            registry,
        }
    }

    /// Binds `tokens` to `action`'s parameters and the command's `shared`
    /// parameters in one left-to-right pass.
    ///
    /// # Logic:
    /// - A token naming a parameter (long form, negation or alias) selects it;
    ///   the action's own parameters are searched before the shared ones.
    /// - Otherwise a token that does not look like an option binds to the
    ///   action parameter declared at the token's position. Shared parameters
    ///   are never positional.
    /// - The selected parameter's parser consumes one or more tokens.
    /// - Any unmapped token or conversion failure aborts the whole pass.
    pub fn parse(
        &self,
        tokens: &[String],
        action: &Action,
        shared: &[Parameter],
    ) -> Result<Bindings, ParseError> {
        let mut bindings = Bindings::fresh(action, shared);
        let mut index = 0;

        while let Some(token) = tokens.get(index) {
            let target = self.match_target(token, index, action, shared).ok_or_else(|| {
                ParseError::UnmappedParameter {
                    token: token.clone(),
                    index,
                }
            })?;
            let parameter = match target {
                Target::Action(i) => action.parameters().get(i),
                Target::Shared(i) => shared.get(i),
            }
            .ok_or_else(|| ParseError::UnmappedParameter {
                token: token.clone(),
                index,
            })?;

            let parsed = self
                .parser_for(parameter)
                .parse(tokens, index)
                .map_err(|source| ParseError::Conversion {
                    parameter: parameter.name().to_string(),
                    token: source.offending_token().unwrap_or(token.as_str()).to_string(),
                    source,
                })?;

            if parsed.consumed == 0 {
                log::trace!("Token '{}' not applicable to '{}'.", token, parameter.name());
                index += 1;
                continue;
            }

            log::trace!(
                "Bound '{}' = {} ({} token(s) at {}).",
                parameter.name(),
                parsed.value,
                parsed.consumed,
                index
            );
            bindings.write(target, parsed.value);
            index += parsed.consumed;
        }

        Ok(bindings)
    }

    fn match_target(
        &self,
        token: &str,
        index: usize,
        action: &Action,
        shared: &[Parameter],
    ) -> Option<Target> {
        let conventions = self.conventions;
        if let Some(i) = action
            .parameters()
            .iter()
            .position(|p| p.is_identified_by(token, conventions))
        {
            return Some(Target::Action(i));
        }
        if let Some(i) = shared
            .iter()
            .position(|p| p.is_identified_by(token, conventions))
        {
            return Some(Target::Shared(i));
        }
        if !conventions.is_parameter_name(token) && index < action.parameters().len() {
            return Some(Target::Action(index));
        }
        None
    }

    /// The parameter's custom parser if it declares one, else the
    /// convention's parser.
    fn parser_for<'p>(&'p self, parameter: &'p Parameter) -> Box<dyn Parser + 'p> {
        match parameter.custom_parser() {
            Some(CustomParser::Factory(factory)) => factory(parameter),
            Some(CustomParser::Named(tag)) => match self.registry.get(tag) {
                Some(factory) => factory(parameter),
                None => {
                    log::warn!(
                        "No parser registered as '{}' for parameter '{}'; using the {} convention parser.",
                        tag,
                        parameter.name(),
                        self.conventions.family()
                    );
                    self.conventions.create_parser(parameter)
                }
            },
            None => self.conventions.create_parser(parameter),
        }
    }
}

// --- ARGUMENTS ---

#[derive(Debug, Clone, PartialEq)]
struct Argument {
    name: String,
    value: Value,
    default: Option<Value>,
}

/// The values an action body reads: its own parameters, by declared name.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    entries: Vec<Argument>,
}

impl Arguments {
    pub fn new(action: &Action, bindings: &Bindings) -> Self {
        let entries = action
            .parameters()
            .iter()
            .zip(bindings.action_slots())
            .map(|(p, slot)| Argument {
                name: p.name().to_string(),
                value: slot.value().clone(),
                default: p.default().cloned(),
            })
            .collect();
        Self { entries }
    }

    fn entry(&self, name: &str) -> Result<&Argument, ArgumentError> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| ArgumentError::Unknown(name.to_string()))
    }

    /// The value exactly as parsed, including the `Missing` sentinel.
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|e| e.name == name).map(|e| &e.value)
    }

    pub fn is_missing(&self, name: &str) -> bool {
        self.raw(name).is_some_and(Value::is_missing)
    }

    pub fn is_null(&self, name: &str) -> bool {
        self.raw(name).is_some_and(Value::is_null)
    }

    /// Reads a parameter as `T`. A missing optional parameter reads as its
    /// declared default.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, ArgumentError> {
        let entry = self.entry(name)?;
        let value = match (&entry.value, &entry.default) {
            (Value::Missing, Some(default)) => default,
            (value, _) => value,
        };
        T::from_value(value).ok_or_else(|| {
            if value.is_missing() {
                ArgumentError::Missing(name.to_string())
            } else {
                ArgumentError::Type {
                    name: name.to_string(),
                    expected: std::any::type_name::<T>(),
                    actual: value.to_string(),
                }
            }
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|e| (e.name.as_str(), &e.value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// MARK: --- UNIT TESTS ---
