// src/core/action.rs

use crate::core::conventions::Conventions;
use crate::core::engine::Bindings;
use crate::core::parameter::{Origin, Parameter, ParameterDef};

/// Declarative description of one invokable operation on a command.
#[derive(Debug, Clone)]
pub struct ActionDef {
    name: String,
    is_default: bool,
    aliases: Vec<String>,
    description: String,
    parameters: Vec<ParameterDef>,
}

impl ActionDef {
    /// `name` is the raw method-like name (e.g. `fizzBuzz`); the conventions
    /// turn it into the token users type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_default: false,
            aliases: Vec::new(),
            description: String::new(),
            parameters: Vec::new(),
        }
    }

    /// Marks this action as the one selected when no action or sub-command
    /// name matches.
    pub fn default_action(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends a parameter. Declaration order is positional order.
    pub fn parameter(mut self, parameter: ParameterDef) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// A registered action. Immutable once its command is built.
#[derive(Debug, Clone)]
pub struct Action {
    name: String,
    is_default: bool,
    aliases: Vec<String>,
    description: String,
    parameters: Vec<Parameter>,
}

impl From<ActionDef> for Action {
    fn from(def: ActionDef) -> Self {
        let parameters = def
            .parameters
            .into_iter()
            .enumerate()
            .map(|(position, p)| Parameter::new(p, Origin::Action, position))
            .collect();
        Self {
            name: def.name,
            is_default: def.is_default,
            aliases: def.aliases,
            description: def.description,
            parameters,
        }
    }
}

impl Action {
    /// The raw name, as registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn conventional_name(&self, conventions: &dyn Conventions) -> String {
        conventions.action_name(&self.name)
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    /// True when `token` is this action's conventional name or one of its
    /// aliases.
    pub fn is_identified_by(&self, token: &str, conventions: &dyn Conventions) -> bool {
        self.conventional_name(conventions) == token || self.aliases.iter().any(|a| a == token)
    }

    /// An action can run once every one of its own parameters holds a value.
    /// Shared parameters never gate invocation.
    pub fn can_invoke(&self, bindings: &Bindings) -> bool {
        bindings.action_slots().len() == self.parameters.len()
            && bindings.action_slots().iter().all(|slot| slot.is_set())
    }

    /// Names of the parameters that still block invocation.
    pub fn missing_parameters(&self, bindings: &Bindings) -> Vec<String> {
        self.parameters
            .iter()
            .zip(bindings.action_slots())
            .filter(|(_, slot)| !slot.is_set())
            .map(|(p, _)| p.name().to_string())
            .collect()
    }
}

// MARK: --- UNIT TESTS ---
