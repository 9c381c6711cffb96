// src/core/parsers.rs

use crate::core::coercion::{coerce, coerce_absent, coerce_all, parse_bool};
use crate::core::conventions::Conventions;
use crate::core::error::CoercionError;
use crate::core::parameter::{OptionForm, Parameter};
use crate::models::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What a parser produced at one position: a value and how many tokens it
/// used. A count of zero means the token was not applicable.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub value: Value,
    pub consumed: usize,
}

impl Parsed {
    pub fn new(value: Value, consumed: usize) -> Self {
        Self { value, consumed }
    }
}

/// Consumes tokens for one parameter, starting at `index`.
pub trait Parser {
    fn parse(&self, tokens: &[String], index: usize) -> Result<Parsed, CoercionError>;
}

/// Builds a parser for a parameter from that parameter's metadata.
pub type ParserFactory = Arc<dyn Fn(&Parameter) -> Box<dyn Parser> + Send + Sync>;

/// Wraps a closure as a [`ParserFactory`].
pub fn parser_factory<F>(factory: F) -> ParserFactory
where
    F: Fn(&Parameter) -> Box<dyn Parser> + Send + Sync + 'static,
{
    Arc::new(factory)
}

/// Custom parsers addressable by tag, so descriptors can name a parser
/// instead of carrying its factory.
#[derive(Clone, Default)]
pub struct ParserRegistry {
    factories: HashMap<String, ParserFactory>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tag: impl Into<String>, factory: ParserFactory) -> &mut Self {
        self.factories.insert(tag.into(), factory);
        self
    }

    pub fn get(&self, tag: &str) -> Option<&ParserFactory> {
        self.factories.get(tag)
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&String> = self.factories.keys().collect();
        tags.sort();
        f.debug_struct("ParserRegistry").field("tags", &tags).finish()
    }
}

// --- SHARED TOKEN RULES ---

/// Length of the run of tokens starting at `start` that do not look like
/// option names.
fn value_run(conventions: &dyn Conventions, tokens: &[String], start: usize) -> usize {
    tokens
        .iter()
        .skip(start)
        .take_while(|token| !conventions.is_parameter_name(token))
        .count()
}

/// An array named by an option: the inline value (if any) followed by the
/// greedy run of plain tokens after the option.
fn parse_named_array(
    conventions: &dyn Conventions,
    parameter: &Parameter,
    tokens: &[String],
    index: usize,
    inline: Option<&str>,
) -> Result<Parsed, CoercionError> {
    let run = value_run(conventions, tokens, index + 1);
    let values = inline
        .into_iter()
        .chain(tokens.iter().skip(index + 1).take(run).map(String::as_str));
    let value = coerce_all(parameter.spec(), values)?;
    Ok(Parsed::new(value, 1 + run))
}

/// A token bound by position: one value, or the greedy run for arrays.
fn parse_positional(
    conventions: &dyn Conventions,
    parameter: &Parameter,
    tokens: &[String],
    index: usize,
) -> Result<Parsed, CoercionError> {
    if parameter.spec().array {
        let run = value_run(conventions, tokens, index);
        let values = tokens.iter().skip(index).take(run).map(String::as_str);
        return Ok(Parsed::new(coerce_all(parameter.spec(), values)?, run));
    }
    match tokens.get(index) {
        Some(token) => Ok(Parsed::new(coerce(parameter.spec(), token)?, 1)),
        None => Ok(Parsed::new(Value::Missing, 0)),
    }
}

// --- HYPHEN PARSER ---

/// `--name value`, `--name=value`, `--switch [true|false]`, `--no-switch`.
pub struct HyphenParser<'a> {
    conventions: &'a dyn Conventions,
    parameter: &'a Parameter,
}

impl<'a> HyphenParser<'a> {
    pub fn new(conventions: &'a dyn Conventions, parameter: &'a Parameter) -> Self {
        Self {
            conventions,
            parameter,
        }
    }
}

impl Parser for HyphenParser<'_> {
    fn parse(&self, tokens: &[String], index: usize) -> Result<Parsed, CoercionError> {
        let Some(token) = tokens.get(index) else {
            return Ok(Parsed::new(Value::Missing, 0));
        };
        let Some(form) = self.parameter.identify(token, self.conventions) else {
            return parse_positional(self.conventions, self.parameter, tokens, index);
        };

        let spec = self.parameter.spec();
        let (_, inline) = self.conventions.split_value(token);

        if spec.array {
            return parse_named_array(self.conventions, self.parameter, tokens, index, inline);
        }
        if form == OptionForm::Negated {
            return Ok(Parsed::new(Value::Bool(false), 1));
        }
        if let Some(raw) = inline {
            return Ok(Parsed::new(coerce(spec, raw)?, 1));
        }

        let next = tokens.get(index + 1);
        if spec.is_boolean() {
            // A boolean only takes the next token when it is a boolean literal.
            return Ok(match next.and_then(|n| parse_bool(n)) {
                Some(flag) => Parsed::new(Value::Bool(flag), 2),
                None => Parsed::new(Value::Bool(true), 1),
            });
        }
        match next {
            Some(raw) if !self.conventions.is_parameter_name(raw) => {
                Ok(Parsed::new(coerce(spec, raw)?, 2))
            }
            _ => Ok(Parsed::new(coerce_absent(spec)?, 1)),
        }
    }
}

// --- SLASH PARSER ---

/// `/name:value`, `/name=value`, `/switch`, `/switch-`. A value is always
/// inline; a bare non-switch option has no value.
pub struct SlashParser<'a> {
    conventions: &'a dyn Conventions,
    parameter: &'a Parameter,
}

impl<'a> SlashParser<'a> {
    pub fn new(conventions: &'a dyn Conventions, parameter: &'a Parameter) -> Self {
        Self {
            conventions,
            parameter,
        }
    }
}

impl Parser for SlashParser<'_> {
    fn parse(&self, tokens: &[String], index: usize) -> Result<Parsed, CoercionError> {
        let Some(token) = tokens.get(index) else {
            return Ok(Parsed::new(Value::Missing, 0));
        };
        let Some(form) = self.parameter.identify(token, self.conventions) else {
            return parse_positional(self.conventions, self.parameter, tokens, index);
        };

        let spec = self.parameter.spec();
        let (_, inline) = self.conventions.split_value(token);

        if spec.array {
            return parse_named_array(self.conventions, self.parameter, tokens, index, inline);
        }
        let value = match (form, inline) {
            (OptionForm::Negated, _) => Value::Bool(false),
            (_, Some(raw)) => coerce(spec, raw)?,
            (_, None) if spec.is_boolean() => Value::Bool(true),
            (_, None) => coerce_absent(spec)?,
        };
        Ok(Parsed::new(value, 1))
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conventions::{HyphenConventions, SlashConventions};
    use crate::core::parameter::{Origin, ParameterDef};
    use crate::models::ValueKind;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn param(def: ParameterDef) -> Parameter {
        Parameter::new(def, Origin::Action, 0)
    }

    fn hyphen(def: ParameterDef, raw: &[&str], index: usize) -> Result<Parsed, CoercionError> {
        let p = param(def);
        let conventions = HyphenConventions;
        let parser = conventions.create_parser(&p);
        parser.parse(&tokens(raw), index)
    }

    fn slash(def: ParameterDef, raw: &[&str], index: usize) -> Result<Parsed, CoercionError> {
        let p = param(def);
        let conventions = SlashConventions;
        let parser = conventions.create_parser(&p);
        parser.parse(&tokens(raw), index)
    }

    // --- Hyphen ---

    #[test]
    fn test_hyphen_name_then_value() {
        let parsed = hyphen(ParameterDef::int32("count"), &["--count", "3"], 0).unwrap();
        assert_eq!(parsed, Parsed::new(Value::Int32(3), 2));
    }

    #[test]
    fn test_hyphen_inline_value() {
        let parsed = hyphen(ParameterDef::int32("count").alias("c"), &["-c=3"], 0).unwrap();
        assert_eq!(parsed, Parsed::new(Value::Int32(3), 1));
    }

    #[test]
    fn test_hyphen_switch_forms() {
        let flag = || ParameterDef::boolean("flag");
        assert_eq!(
            hyphen(flag(), &["--flag"], 0).unwrap(),
            Parsed::new(Value::Bool(true), 1)
        );
        assert_eq!(
            hyphen(flag(), &["--no-flag"], 0).unwrap(),
            Parsed::new(Value::Bool(false), 1)
        );
        assert_eq!(
            hyphen(flag(), &["--flag", "false"], 0).unwrap(),
            Parsed::new(Value::Bool(false), 2)
        );
        // A non-literal next token is left for someone else.
        assert_eq!(
            hyphen(flag(), &["--flag", "file.txt"], 0).unwrap(),
            Parsed::new(Value::Bool(true), 1)
        );
    }

    #[test]
    fn test_hyphen_option_without_value() {
        let nullable = hyphen(ParameterDef::int32("limit").nullable(), &["--limit"], 0).unwrap();
        assert_eq!(nullable, Parsed::new(Value::Null, 1));

        let err = hyphen(ParameterDef::int32("limit"), &["--limit", "--other"], 0).unwrap_err();
        assert!(matches!(err, CoercionError::MissingValue { .. }));
    }

    #[test]
    fn test_hyphen_negative_number_is_a_value() {
        let parsed = hyphen(ParameterDef::int32("offset"), &["--offset", "-5"], 0).unwrap();
        assert_eq!(parsed, Parsed::new(Value::Int32(-5), 2));
    }

    #[test]
    fn test_hyphen_array_stops_at_next_option() {
        let numbers = ParameterDef::array("numbers", ValueKind::Int32);
        let parsed = hyphen(numbers, &["--numbers", "4", "8", "15", "--other", "1"], 0).unwrap();
        assert_eq!(parsed, Parsed::new(Value::from(vec![4, 8, 15]), 4));
    }

    #[test]
    fn test_hyphen_array_inline_and_empty() {
        let numbers = || ParameterDef::array("numbers", ValueKind::Int32);
        let parsed = hyphen(numbers(), &["--numbers=4", "8"], 0).unwrap();
        assert_eq!(parsed, Parsed::new(Value::from(vec![4, 8]), 2));

        let empty = hyphen(numbers(), &["--numbers", "--other"], 0).unwrap();
        assert_eq!(empty, Parsed::new(Value::Array(vec![]), 1));
    }

    #[test]
    fn test_positional_value_and_array() {
        let single = hyphen(ParameterDef::string("name"), &["x", "alice"], 1).unwrap();
        assert_eq!(single, Parsed::new(Value::from("alice"), 1));

        let numbers = ParameterDef::array("numbers", ValueKind::Int32);
        let run = hyphen(numbers, &["1", "2", "-v"], 0).unwrap();
        assert_eq!(run, Parsed::new(Value::from(vec![1, 2]), 2));
    }

    #[test]
    fn test_conversion_failure_surfaces() {
        let err = hyphen(ParameterDef::int32("count"), &["--count", "many"], 0).unwrap_err();
        assert!(matches!(err, CoercionError::Invalid { .. }));
    }

    // --- Slash ---

    #[test]
    fn test_slash_inline_values() {
        assert_eq!(
            slash(ParameterDef::int32("count"), &["/count:3"], 0).unwrap(),
            Parsed::new(Value::Int32(3), 1)
        );
        assert_eq!(
            slash(ParameterDef::int32("count"), &["/count=3"], 0).unwrap(),
            Parsed::new(Value::Int32(3), 1)
        );
    }

    #[test]
    fn test_slash_never_takes_the_next_token() {
        let err = slash(ParameterDef::int32("count"), &["/count", "3"], 0).unwrap_err();
        assert!(matches!(err, CoercionError::MissingValue { .. }));
    }

    #[test]
    fn test_slash_switches() {
        let flag = || ParameterDef::boolean("flag");
        assert_eq!(
            slash(flag(), &["/flag"], 0).unwrap(),
            Parsed::new(Value::Bool(true), 1)
        );
        assert_eq!(
            slash(flag(), &["/flag-"], 0).unwrap(),
            Parsed::new(Value::Bool(false), 1)
        );
        assert_eq!(
            slash(flag(), &["/flag:false"], 0).unwrap(),
            Parsed::new(Value::Bool(false), 1)
        );
    }

    #[test]
    fn test_slash_array() {
        let numbers = ParameterDef::array("numbers", ValueKind::Int32);
        let parsed = slash(numbers, &["/numbers:4", "8", "15", "/other:1"], 0).unwrap();
        assert_eq!(parsed, Parsed::new(Value::from(vec![4, 8, 15]), 3));
    }

    #[test]
    fn test_registry_lookup() {
        struct Fixed;
        impl Parser for Fixed {
            fn parse(&self, _tokens: &[String], _index: usize) -> Result<Parsed, CoercionError> {
                Ok(Parsed::new(Value::Int32(7), 1))
            }
        }

        let mut registry = ParserRegistry::new();
        registry.register("fixed", parser_factory(|_| Box::new(Fixed) as Box<dyn Parser>));
        let p = param(ParameterDef::int32("n"));
        let parser = (registry.get("fixed").unwrap())(&p);
        assert_eq!(parser.parse(&[], 0).unwrap(), Parsed::new(Value::Int32(7), 1));
        assert!(registry.get("other").is_none());
    }
}
