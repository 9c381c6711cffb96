// src/core/validator.rs

use crate::core::command::Command;
use crate::core::conventions::Conventions;
use crate::core::parameter::Parameter;
use crate::models::ValidationResult;

/// Checks a command tree for declarations that make dispatch ambiguous.
/// Returns one result per offending command, depth first; an empty list
/// means the tree is consistent.
pub fn validate(command: &Command, conventions: &dyn Conventions) -> Vec<ValidationResult> {
    let mut results = Vec::new();
    collect(command, conventions, &mut results);
    results
}

fn collect(command: &Command, conventions: &dyn Conventions, results: &mut Vec<ValidationResult>) {
    let messages = check(command, conventions);
    if !messages.is_empty() {
        log::debug!(
            "Command '{}' has {} validation issue(s).",
            command.raw_name(),
            messages.len()
        );
        results.push(ValidationResult::new(command.name(conventions), messages));
    }
    for child in command.children() {
        collect(child, conventions, results);
    }
}

fn check(command: &Command, conventions: &dyn Conventions) -> Vec<String> {
    let mut messages = Vec::new();
    let actions = command.actions();
    let shared = command.shared_parameters();

    let defaults: Vec<String> = actions
        .iter()
        .filter(|a| a.is_default())
        .map(|a| a.conventional_name(conventions))
        .collect();
    if defaults.len() > 1 {
        messages.push(format!(
            t!("validate.multiple_defaults"),
            actions = defaults.join(", ")
        ));
    }

    let mut seen: Vec<String> = Vec::new();
    let mut reported: Vec<String> = Vec::new();
    for child in command.children() {
        let name = child.name(conventions);
        if seen.contains(&name) {
            if !reported.contains(&name) {
                messages.push(format!(t!("validate.duplicate_command"), command = name));
                reported.push(name);
            }
        } else {
            seen.push(name);
        }
    }

    for action in actions {
        let name = action.conventional_name(conventions);
        if command.child(&name, conventions).is_some() {
            messages.push(format!(t!("validate.action_command_conflict"), action = name));
        }
        for alias in duplicate_aliases(action.parameters(), conventions) {
            messages.push(format!(
                t!("validate.duplicate_action_alias"),
                action = name,
                alias = alias
            ));
        }
    }

    for alias in duplicate_aliases(shared, conventions) {
        messages.push(format!(t!("validate.duplicate_shared_alias"), alias = alias));
    }

    for common in shared {
        let common_aliases = short_names(common, conventions);
        for action in actions {
            for parameter in action.parameters() {
                if conventions.long_option_name(common.name())
                    == conventions.long_option_name(parameter.name())
                {
                    messages.push(format!(
                        t!("validate.shared_name_conflict"),
                        shared = common.name(),
                        parameter = parameter.name(),
                        action = action.conventional_name(conventions)
                    ));
                }
                let theirs = short_names(parameter, conventions);
                for alias in common_aliases.iter().filter(|a| theirs.contains(a)) {
                    messages.push(format!(
                        t!("validate.shared_alias_conflict"),
                        alias = alias,
                        shared = common.name(),
                        parameter = parameter.name(),
                        action = action.conventional_name(conventions)
                    ));
                }
            }
        }
    }

    messages
}

fn short_names(parameter: &Parameter, conventions: &dyn Conventions) -> Vec<String> {
    parameter
        .aliases()
        .iter()
        .map(|alias| conventions.short_option_name(alias))
        .collect()
}

/// Alias spellings declared on more than one parameter of `parameters`, each
/// reported once, in order of first repetition.
fn duplicate_aliases(parameters: &[Parameter], conventions: &dyn Conventions) -> Vec<String> {
    let mut seen = Vec::new();
    let mut duplicates = Vec::new();
    for parameter in parameters {
        let mut own = short_names(parameter, conventions);
        own.dedup();
        for alias in own {
            if seen.contains(&alias) {
                if !duplicates.contains(&alias) {
                    duplicates.push(alias);
                }
            } else {
                seen.push(alias);
            }
        }
    }
    duplicates
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::ActionDef;
    use crate::core::command::{Call, Handler};
    use crate::core::conventions::HyphenConventions;
    use crate::core::parameter::ParameterDef;
    use crate::models::Outcome;
    use pretty_assertions::assert_eq;

    struct Declared {
        actions: Vec<ActionDef>,
        shared: Vec<ParameterDef>,
    }

    impl Handler for Declared {
        fn actions(&self) -> Vec<ActionDef> {
            self.actions.clone()
        }

        fn shared_parameters(&self) -> Vec<ParameterDef> {
            self.shared.clone()
        }

        fn invoke(&mut self, _call: &Call<'_>) -> anyhow::Result<Outcome> {
            Ok(Outcome::Unit)
        }
    }

    fn command(name: &str, actions: Vec<ActionDef>, shared: Vec<ParameterDef>) -> Command {
        Command::named(name, Declared { actions, shared })
    }

    #[test]
    fn test_clean_tree_has_no_results() {
        let root = command(
            "Root",
            vec![
                ActionDef::new("run")
                    .default_action()
                    .parameter(ParameterDef::string("path").alias("p")),
                ActionDef::new("list"),
            ],
            vec![ParameterDef::boolean("verbose").alias("v")],
        )
        .with(command("Child", vec![ActionDef::new("go")], Vec::new()));
        assert!(validate(&root, &HyphenConventions).is_empty());
    }

    #[test]
    fn test_two_defaults_reported_once() {
        let root = command(
            "Root",
            vec![
                ActionDef::new("first").default_action(),
                ActionDef::new("second").default_action(),
            ],
            Vec::new(),
        );
        let results = validate(&root, &HyphenConventions);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].command(), "root");
        assert_eq!(results[0].messages().len(), 1);
        assert!(results[0].messages()[0].contains("first, second"));
    }

    #[test]
    fn test_action_named_like_sub_command() {
        let root = command("Root", vec![ActionDef::new("child")], Vec::new())
            .with(command("Child", vec![ActionDef::new("go")], Vec::new()));
        let results = validate(&root, &HyphenConventions);
        assert_eq!(results.len(), 1);
        assert!(results[0].messages()[0].contains("'child'"));
    }

    #[test]
    fn test_alias_and_name_collisions() {
        let root = command(
            "Root",
            vec![ActionDef::new("run")
                .parameter(ParameterDef::string("path").alias("p"))
                .parameter(ParameterDef::string("pattern").alias("p"))
                .parameter(ParameterDef::boolean("verbose"))
                .parameter(ParameterDef::int32("limit").alias("l"))],
            vec![
                ParameterDef::boolean("verbose"),
                ParameterDef::boolean("quiet").alias("q").alias("l"),
                ParameterDef::boolean("silent").alias("q"),
            ],
        );
        let results = validate(&root, &HyphenConventions);
        assert_eq!(results.len(), 1);
        let messages = results[0].messages();
        assert_eq!(messages.len(), 4, "{:#?}", messages);
        assert!(messages[0].contains("alias '-p'"));
        assert!(messages[1].contains("Alias '-q'"));
        assert!(messages[2].contains("'verbose'"));
        assert!(messages[3].contains("Alias '-l'"));
    }

    #[test]
    fn test_sub_commands_with_same_name() {
        let root = command("Root", vec![ActionDef::new("run")], Vec::new())
            .with(command("FooCommand", vec![ActionDef::new("one")], Vec::new()))
            .with(command("Foo", vec![ActionDef::new("two")], Vec::new()))
            .with(command("foo", vec![ActionDef::new("three")], Vec::new()));
        assert_eq!(root.children().len(), 3);

        let results = validate(&root, &HyphenConventions);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].messages().len(), 1, "{:#?}", results[0].messages());
        assert!(results[0].messages()[0].contains("'foo'"));

        let first = root.child("foo", &HyphenConventions);
        assert_eq!(first.map(|c| c.raw_name()), Some("FooCommand"));
    }

    #[test]
    fn test_results_collected_depth_first() {
        let bad = || {
            vec![
                ActionDef::new("a").default_action(),
                ActionDef::new("b").default_action(),
            ]
        };
        let root = command("Root", bad(), Vec::new())
            .with(command("Left", bad(), Vec::new()).with(command("Deep", bad(), Vec::new())))
            .with(command("Right", vec![ActionDef::new("ok")], Vec::new()));
        let names: Vec<String> = validate(&root, &HyphenConventions)
            .iter()
            .map(|r| r.command().to_string())
            .collect();
        assert_eq!(names, ["root", "left", "deep"]);
    }
}
