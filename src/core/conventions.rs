// src/core/conventions.rs

//! Token vocabulary of a command tree.
//!
//! A [`Conventions`] implementation decides how semantic names (a handler's
//! type name, an action, a parameter, an alias) are spelled on the command
//! line, and hands out the [`Parser`] that consumes tokens for a parameter.
//! Swapping the conventions of a tree changes nothing else: the engine, the
//! actions and the commands only ever ask these questions.

use crate::constants::{COMMAND_TYPE_SUFFIX, NEGATION_PREFIX};
use crate::core::parameter::Parameter;
use crate::core::parsers::{HyphenParser, Parser, SlashParser};
use heck::ToKebabCase;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HYPHEN_OPTION_RE: Regex =
        Regex::new(r"^--?[A-Za-z][A-Za-z0-9_-]*(?:=.*)?$").expect("static regex");
    static ref SLASH_OPTION_RE: Regex =
        Regex::new(r"^/[A-Za-z][A-Za-z0-9_-]*(?:[:=].*)?$").expect("static regex");
}

/// The pluggable naming and token strategy of a command tree.
pub trait Conventions {
    /// Short identifier of the family, used in diagnostics.
    fn family(&self) -> &'static str;

    /// Command-line name of a command, from its raw (usually type) name.
    fn command_name(&self, raw: &str) -> String;

    fn action_name(&self, raw: &str) -> String;

    fn long_option_name(&self, parameter: &str) -> String;

    /// The spelling that sets a switch to `false`.
    fn negated_long_option_name(&self, parameter: &str) -> String;

    fn short_option_name(&self, alias: &str) -> String;

    /// Splits an option token into its name part and inline value, if any.
    /// Tokens that are not options come back whole with no value.
    fn split_value<'t>(&self, token: &'t str) -> (&'t str, Option<&'t str>);

    /// True when `token` names `parameter` in its long form, with or without
    /// an inline value.
    fn is_matching_parameter_name(&self, parameter: &str, token: &str) -> bool {
        self.split_value(token).0 == self.long_option_name(parameter)
    }

    /// True when `token` looks like an option identifier. Positional matching
    /// and array runs stop at such tokens.
    fn is_parameter_name(&self, token: &str) -> bool;

    /// The token-consuming strategy for `parameter` under this convention.
    fn create_parser<'a>(&'a self, parameter: &'a Parameter) -> Box<dyn Parser + 'a>;
}

/// Drops the module path, generic arguments and a trailing `Command` from a
/// Rust type name: `app::cmds::FizzBuzzCommand<T>` becomes `FizzBuzz`.
fn bare_type_name(raw: &str) -> &str {
    let without_generics = raw.split('<').next().unwrap_or(raw);
    let last = without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics);
    match last.strip_suffix(COMMAND_TYPE_SUFFIX) {
        Some(stem) if !stem.is_empty() => stem,
        _ => last,
    }
}

// --- HYPHEN FAMILY ---

/// `--long-option value`, `--long-option=value`, `-x` aliases and
/// `--no-switch` negation. Names are kebab-case.
#[derive(Debug, Clone, Copy, Default)]
pub struct HyphenConventions;

impl Conventions for HyphenConventions {
    fn family(&self) -> &'static str {
        "hyphen"
    }

    fn command_name(&self, raw: &str) -> String {
        bare_type_name(raw).to_kebab_case()
    }

    fn action_name(&self, raw: &str) -> String {
        raw.to_kebab_case()
    }

    fn long_option_name(&self, parameter: &str) -> String {
        format!("--{}", parameter.to_kebab_case())
    }

    fn negated_long_option_name(&self, parameter: &str) -> String {
        format!("--{}{}", NEGATION_PREFIX, parameter.to_kebab_case())
    }

    fn short_option_name(&self, alias: &str) -> String {
        format!("-{}", alias)
    }

    fn split_value<'t>(&self, token: &'t str) -> (&'t str, Option<&'t str>) {
        if !token.starts_with('-') {
            return (token, None);
        }
        match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        }
    }

    fn is_parameter_name(&self, token: &str) -> bool {
        HYPHEN_OPTION_RE.is_match(token)
    }

    fn create_parser<'a>(&'a self, parameter: &'a Parameter) -> Box<dyn Parser + 'a> {
        Box::new(HyphenParser::new(self, parameter))
    }
}

// --- SLASH FAMILY ---

/// `/option:value` or `/option=value`, `/x` aliases and `/switch-` negation.
/// Names are lower case without separators.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlashConventions;

impl SlashConventions {
    fn flatten(name: &str) -> String {
        name.to_kebab_case().replace('-', "")
    }
}

impl Conventions for SlashConventions {
    fn family(&self) -> &'static str {
        "slash"
    }

    fn command_name(&self, raw: &str) -> String {
        Self::flatten(bare_type_name(raw))
    }

    fn action_name(&self, raw: &str) -> String {
        Self::flatten(raw)
    }

    fn long_option_name(&self, parameter: &str) -> String {
        format!("/{}", Self::flatten(parameter))
    }

    fn negated_long_option_name(&self, parameter: &str) -> String {
        format!("/{}-", Self::flatten(parameter))
    }

    fn short_option_name(&self, alias: &str) -> String {
        format!("/{}", alias)
    }

    fn split_value<'t>(&self, token: &'t str) -> (&'t str, Option<&'t str>) {
        if !token.starts_with('/') {
            return (token, None);
        }
        match token.split_once([':', '=']) {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        }
    }

    fn is_parameter_name(&self, token: &str) -> bool {
        SLASH_OPTION_RE.is_match(token)
    }

    fn create_parser<'a>(&'a self, parameter: &'a Parameter) -> Box<dyn Parser + 'a> {
        Box::new(SlashParser::new(self, parameter))
    }
}

// MARK: --- UNIT TESTS ---
