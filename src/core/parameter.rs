// src/core/parameter.rs

use crate::core::conventions::Conventions;
use crate::core::engine::Slot;
use crate::core::parsers::ParserFactory;
use crate::models::{TypeSpec, Value, ValueKind};
use std::fmt;

// --- DECLARATION ---

/// How a parameter replaces the convention's built-in parser.
#[derive(Clone)]
pub(crate) enum CustomParser {
    /// A factory attached directly to the descriptor.
    Factory(ParserFactory),
    /// A tag looked up in the dispatcher's parser registry at parse time.
    Named(String),
}

impl fmt::Debug for CustomParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomParser::Factory(_) => f.write_str("Factory(..)"),
            CustomParser::Named(tag) => f.debug_tuple("Named").field(tag).finish(),
        }
    }
}

/// Declarative description of one parameter, as a handler registers it.
///
/// ```
/// use cmdlet::{ParameterDef, ValueKind};
///
/// let count = ParameterDef::int32("count").alias("c").default_value(1);
/// let tags = ParameterDef::array("tags", ValueKind::String);
/// let when = ParameterDef::datetime("when").nullable();
/// # let _ = (count, tags, when);
/// ```
#[derive(Debug, Clone)]
pub struct ParameterDef {
    name: String,
    spec: TypeSpec,
    default: Option<Value>,
    aliases: Vec<String>,
    description: String,
    parser: Option<CustomParser>,
}

impl ParameterDef {
    pub fn new(name: impl Into<String>, spec: TypeSpec) -> Self {
        Self {
            name: name.into(),
            spec,
            default: None,
            aliases: Vec::new(),
            description: String::new(),
            parser: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, TypeSpec::new(ValueKind::String))
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, TypeSpec::new(ValueKind::Bool))
    }

    pub fn int32(name: impl Into<String>) -> Self {
        Self::new(name, TypeSpec::new(ValueKind::Int32))
    }

    pub fn int64(name: impl Into<String>) -> Self {
        Self::new(name, TypeSpec::new(ValueKind::Int64))
    }

    pub fn double(name: impl Into<String>) -> Self {
        Self::new(name, TypeSpec::new(ValueKind::Double))
    }

    pub fn decimal(name: impl Into<String>) -> Self {
        Self::new(name, TypeSpec::new(ValueKind::Decimal))
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, TypeSpec::new(ValueKind::DateTime))
    }

    /// An enumeration parameter accepting exactly the given member names.
    pub fn enumeration<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variants = variants.into_iter().map(Into::into).collect();
        Self::new(name, TypeSpec::new(ValueKind::Enum(variants)))
    }

    /// An array of `kind` elements.
    pub fn array(name: impl Into<String>, kind: ValueKind) -> Self {
        let mut spec = TypeSpec::new(kind);
        spec.array = true;
        Self::new(name, spec)
    }

    /// Makes the element type nullable: an empty token becomes `null`, and
    /// an unmentioned parameter is `null` rather than required.
    pub fn nullable(mut self) -> Self {
        self.spec.nullable = true;
        self
    }

    /// Declares a default, which also makes the parameter optional.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
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

    /// Replaces the convention's parser with one built by `factory`.
    pub fn parser(mut self, factory: ParserFactory) -> Self {
        self.parser = Some(CustomParser::Factory(factory));
        self
    }

    /// Replaces the convention's parser with the one registered under `tag`
    /// in the dispatcher's [`crate::ParserRegistry`].
    pub fn parser_named(mut self, tag: impl Into<String>) -> Self {
        self.parser = Some(CustomParser::Named(tag.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

// --- RUNTIME PARAMETER ---

/// Where a parameter was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Declared on one action; matched by name, alias or position.
    Action,
    /// Shared by every action of a command; matched by name or alias only,
    /// and written back to the command before invocation.
    Command,
}

/// Which spelling of a parameter a token used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionForm {
    Long,
    Negated,
    Alias,
}

/// A registered parameter: its declaration plus where it lives.
#[derive(Debug, Clone)]
pub struct Parameter {
    def: ParameterDef,
    origin: Origin,
    position: usize,
}

impl Parameter {
    pub(crate) fn new(def: ParameterDef, origin: Origin, position: usize) -> Self {
        Self {
            def,
            origin,
            position,
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn spec(&self) -> &TypeSpec {
        &self.def.spec
    }

    pub fn default(&self) -> Option<&Value> {
        self.def.default.as_ref()
    }

    pub fn aliases(&self) -> &[String] {
        &self.def.aliases
    }

    pub fn description(&self) -> &str {
        &self.def.description
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Declaration index within its action (or among the shared parameters).
    pub fn position(&self) -> usize {
        self.position
    }

    /// Only shared parameters are written back to their command.
    pub fn writes_back(&self) -> bool {
        self.origin == Origin::Command
    }

    pub fn is_optional(&self) -> bool {
        self.def.default.is_some()
    }

    /// Parameters that must be given a value for their action to run.
    pub fn is_required(&self) -> bool {
        !self.is_optional() && !self.def.spec.is_switch() && !self.def.spec.nullable
    }

    pub(crate) fn custom_parser(&self) -> Option<&CustomParser> {
        self.def.parser.as_ref()
    }

    /// The state of this parameter before any token has been applied.
    pub fn unset_slot(&self) -> Slot {
        if self.is_optional() {
            Slot::set(Value::Missing)
        } else if self.def.spec.is_switch() {
            Slot::set(Value::Bool(false))
        } else if self.def.spec.nullable {
            Slot::set(Value::Null)
        } else {
            Slot::unset()
        }
    }

    /// Which of this parameter's spellings `token` uses, if any. The negated
    /// form only exists for `bool` and `bool?`.
    pub fn identify(&self, token: &str, conventions: &dyn Conventions) -> Option<OptionForm> {
        if conventions.is_matching_parameter_name(&self.def.name, token) {
            return Some(OptionForm::Long);
        }
        let (stem, _) = conventions.split_value(token);
        if self.def.spec.is_boolean() && stem == conventions.negated_long_option_name(&self.def.name)
        {
            return Some(OptionForm::Negated);
        }
        self.def
            .aliases
            .iter()
            .any(|alias| stem == conventions.short_option_name(alias))
            .then_some(OptionForm::Alias)
    }

    pub fn is_identified_by(&self, token: &str, conventions: &dyn Conventions) -> bool {
        self.identify(token, conventions).is_some()
    }

    /// Every spelling of this parameter under `conventions`, long form first.
    pub fn option_names(&self, conventions: &dyn Conventions) -> Vec<String> {
        std::iter::once(conventions.long_option_name(&self.def.name))
            .chain(
                self.def
                    .aliases
                    .iter()
                    .map(|alias| conventions.short_option_name(alias)),
            )
            .collect()
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conventions::{HyphenConventions, SlashConventions};

    fn action_param(def: ParameterDef) -> Parameter {
        Parameter::new(def, Origin::Action, 0)
    }

    #[test]
    fn test_identified_by_long_alias_and_negation() {
        let c = HyphenConventions;
        let verbose = action_param(ParameterDef::boolean("verbose").alias("v"));
        assert_eq!(verbose.identify("--verbose", &c), Some(OptionForm::Long));
        assert_eq!(verbose.identify("--no-verbose", &c), Some(OptionForm::Negated));
        assert_eq!(verbose.identify("-v", &c), Some(OptionForm::Alias));
        assert_eq!(verbose.identify("--verbosity", &c), None);
        assert_eq!(verbose.identify("verbose", &c), None);
    }

    #[test]
    fn test_negation_only_for_switches() {
        let c = HyphenConventions;
        let name = action_param(ParameterDef::string("name"));
        assert!(!name.is_identified_by("--no-name", &c));

        let maybe = action_param(ParameterDef::boolean("flag").nullable());
        assert_eq!(maybe.identify("--no-flag", &c), Some(OptionForm::Negated));

        let many = action_param(ParameterDef::array("flags", ValueKind::Bool));
        assert!(!many.is_identified_by("--no-flags", &c));
    }

    #[test]
    fn test_identified_by_with_inline_value() {
        let count = action_param(ParameterDef::int32("count").alias("c"));
        assert!(count.is_identified_by("--count=3", &HyphenConventions));
        assert!(count.is_identified_by("-c=3", &HyphenConventions));
        assert!(count.is_identified_by("/count:3", &SlashConventions));
        assert!(count.is_identified_by("/c:3", &SlashConventions));
    }

    #[test]
    fn test_every_option_name_identifies_parameter() {
        let def = ParameterDef::string("outputFile").alias("o").alias("out");
        let families: [&dyn Conventions; 2] = [&HyphenConventions, &SlashConventions];
        for conventions in families {
            let param = action_param(def.clone());
            for name in param.option_names(conventions) {
                assert!(param.is_identified_by(&name, conventions), "{}", name);
            }
        }
    }

    #[test]
    fn test_unset_slots() {
        let switch = action_param(ParameterDef::boolean("flag"));
        assert_eq!(switch.unset_slot(), Slot::set(Value::Bool(false)));

        let optional = action_param(ParameterDef::string("name").default_value("x"));
        assert_eq!(optional.unset_slot(), Slot::set(Value::Missing));

        let nullable = action_param(ParameterDef::int32("limit").nullable());
        assert_eq!(nullable.unset_slot(), Slot::set(Value::Null));

        let required = action_param(ParameterDef::int32("input"));
        assert!(!required.unset_slot().is_set());
        assert!(required.is_required());
    }

    #[test]
    fn test_shared_parameters_write_back() {
        let shared = Parameter::new(ParameterDef::boolean("verbose"), Origin::Command, 0);
        assert!(shared.writes_back());
        assert!(!action_param(ParameterDef::boolean("verbose")).writes_back());
    }
}
