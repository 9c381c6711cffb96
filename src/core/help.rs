// src/core/help.rs

//! Help output. A command is first described as plain data ([`CommandInfo`])
//! and a [`HelpWriter`] renders that; rendering has no side effects, so the
//! same description always produces the same text.

use crate::core::action::Action;
use crate::core::command::Command;
use crate::core::conventions::Conventions;
use crate::core::parameter::Parameter;
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterInfo {
    pub name: String,
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negated: Option<String>,
    #[serde(rename = "type")]
    pub type_name: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub description: String,
}

impl ParameterInfo {
    pub fn new(parameter: &Parameter, conventions: &dyn Conventions) -> Self {
        let mut names = parameter.option_names(conventions).into_iter();
        let name = names.next().unwrap_or_default();
        Self {
            name,
            aliases: names.collect(),
            negated: parameter
                .spec()
                .is_boolean()
                .then(|| conventions.negated_long_option_name(parameter.name())),
            type_name: parameter.spec().to_string(),
            required: parameter.is_required(),
            default: parameter.default().map(ToString::to_string),
            description: parameter.description().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionInfo {
    pub name: String,
    pub aliases: Vec<String>,
    pub is_default: bool,
    pub description: String,
    pub parameters: Vec<ParameterInfo>,
}

impl ActionInfo {
    pub fn new(action: &Action, conventions: &dyn Conventions) -> Self {
        Self {
            name: action.conventional_name(conventions),
            aliases: action.aliases().to_vec(),
            is_default: action.is_default(),
            description: action.description().to_string(),
            parameters: action
                .parameters()
                .iter()
                .map(|p| ParameterInfo::new(p, conventions))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandSummary {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandInfo {
    pub name: String,
    pub description: String,
    pub actions: Vec<ActionInfo>,
    pub shared: Vec<ParameterInfo>,
    pub commands: Vec<CommandSummary>,
}

impl CommandInfo {
    pub fn new(command: &Command, conventions: &dyn Conventions) -> Self {
        Self {
            name: command.name(conventions),
            description: command.description().to_string(),
            actions: command
                .actions()
                .iter()
                .map(|a| ActionInfo::new(a, conventions))
                .collect(),
            shared: command
                .shared_parameters()
                .iter()
                .map(|p| ParameterInfo::new(p, conventions))
                .collect(),
            commands: command
                .children()
                .iter()
                .map(|c| CommandSummary {
                    name: c.name(conventions),
                    description: c.description().to_string(),
                })
                .collect(),
        }
    }

    pub fn action(&self, name: &str) -> Option<&ActionInfo> {
        self.actions.iter().find(|a| a.name == name)
    }
}

/// Renders help for a command, or for one of its actions when `action`
/// names one. An unknown action name falls back to the whole command.
pub trait HelpWriter {
    fn write(&self, command: &CommandInfo, action: Option<&str>) -> String;
}

// --- TEXT ---

#[derive(Debug, Clone, Copy)]
pub struct TextHelpWriter {
    color: bool,
}

impl TextHelpWriter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            format!("{}:", text).yellow().bold().to_string()
        } else {
            format!("{}:", text)
        }
    }

    fn name(&self, text: &str) -> String {
        if self.color {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }

    fn write_parameter(&self, out: &mut String, parameter: &ParameterInfo, indent: &str) {
        let mut names = vec![parameter.name.clone()];
        names.extend(parameter.negated.iter().cloned());
        names.extend(parameter.aliases.iter().cloned());
        let _ = write!(
            out,
            "{}{} <{}>",
            indent,
            self.name(&names.join(", ")),
            parameter.type_name
        );
        if parameter.required {
            let _ = write!(out, " [{}]", t!("help.label.required"));
        }
        if let Some(default) = &parameter.default {
            let _ = write!(out, " [{}: {}]", t!("help.label.default_value"), default);
        }
        if !parameter.description.is_empty() {
            let _ = write!(out, "  {}", parameter.description);
        }
        out.push('\n');
    }

    fn write_action(&self, out: &mut String, action: &ActionInfo) {
        let _ = write!(out, "  {}", self.name(&action.name));
        if action.is_default {
            let _ = write!(out, " {}", t!("help.label.default"));
        }
        if !action.aliases.is_empty() {
            let _ = write!(
                out,
                " ({}: {})",
                t!("help.label.aliases"),
                action.aliases.join(", ")
            );
        }
        if !action.description.is_empty() {
            let _ = write!(out, "  {}", action.description);
        }
        out.push('\n');
        for parameter in &action.parameters {
            self.write_parameter(out, parameter, "      ");
        }
    }
}

impl Default for TextHelpWriter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl HelpWriter for TextHelpWriter {
    fn write(&self, command: &CommandInfo, action: Option<&str>) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} {} [command] <action> [options]",
            self.heading(t!("help.label.usage")),
            command.name
        );
        if !command.description.is_empty() {
            let _ = writeln!(out, "\n{}", command.description);
        }

        if let Some(selected) = action.and_then(|name| command.action(name)) {
            let _ = writeln!(out, "\n{}", self.heading(t!("help.label.parameters")));
            self.write_action(&mut out, selected);
        } else {
            if !command.actions.is_empty() {
                let _ = writeln!(out, "\n{}", self.heading(t!("help.label.actions")));
                for action in &command.actions {
                    self.write_action(&mut out, action);
                }
            }
            if !command.commands.is_empty() {
                let _ = writeln!(out, "\n{}", self.heading(t!("help.label.commands")));
                for child in &command.commands {
                    let _ = writeln!(out, "  {}  {}", self.name(&child.name), child.description);
                }
            }
        }

        if !command.shared.is_empty() {
            let _ = writeln!(out, "\n{}", self.heading(t!("help.label.shared")));
            for parameter in &command.shared {
                self.write_parameter(&mut out, parameter, "  ");
            }
        }
        out
    }
}

// --- JSON ---

/// Machine-readable help, for shells and editors that build completions.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonHelpWriter;

impl HelpWriter for JsonHelpWriter {
    fn write(&self, command: &CommandInfo, action: Option<&str>) -> String {
        let rendered = match action.and_then(|name| command.action(name)) {
            Some(selected) => serde_json::to_string_pretty(selected),
            None => serde_json::to_string_pretty(command),
        };
        rendered.unwrap_or_else(|e| {
            log::error!("Help serialization failed: {}", e);
            String::new()
        })
    }
}

// MARK: --- UNIT TESTS ---
