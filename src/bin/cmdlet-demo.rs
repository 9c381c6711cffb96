// src/bin/cmdlet-demo.rs

use anyhow::{Result, bail};
use cmdlet::{
    ActionDef, Call, Command, Dispatcher, Handler, Outcome, ParameterDef, Settings,
    Value, ValueKind, init_env_logger,
};
use colored::Colorize;

/// Default action plays one FizzBuzz round; `range` plays many.
struct FizzBuzzCommand {
    verbose: bool,
}

fn round(n: i32) -> String {
    match (n % 3, n % 5) {
        (0, 0) => "FizzBuzz".to_string(),
        (0, _) => "Fizz".to_string(),
        (_, 0) => "Buzz".to_string(),
        _ => n.to_string(),
    }
}

impl Handler for FizzBuzzCommand {
    fn description(&self) -> &str {
        "Plays FizzBuzz"
    }

    fn actions(&self) -> Vec<ActionDef> {
        vec![
            ActionDef::new("fizzBuzz")
                .default_action()
                .describe("Prints the answer for one number")
                .parameter(ParameterDef::int32("input").describe("The number to play")),
            ActionDef::new("range")
                .alias("r")
                .describe("Prints the answers from 1 up to a limit")
                .parameter(ParameterDef::int32("to").alias("t").default_value(15)),
        ]
    }

    fn shared_parameters(&self) -> Vec<ParameterDef> {
        vec![ParameterDef::boolean("verbose").alias("v")]
    }

    fn apply_shared(&mut self, name: &str, value: &Value) -> Result<()> {
        if name == "verbose" {
            self.verbose = matches!(value, Value::Bool(true));
        }
        Ok(())
    }

    fn invoke(&mut self, call: &Call<'_>) -> Result<Outcome> {
        match call.action() {
            "fizzBuzz" => {
                let input: i32 = call.args().get("input")?;
                if self.verbose {
                    call.logger().info(format_args!("Playing {}", input));
                }
                call.logger().info(format_args!("{}", round(input)));
                Ok(Outcome::Unit)
            }
            "range" => {
                let to: i32 = call.args().get("to")?;
                if to < 1 {
                    bail!("the limit must be positive, got {}", to);
                }
                for n in 1..=to {
                    call.logger().info(format_args!("{}", round(n)));
                }
                Ok(Outcome::Unit)
            }
            other => bail!("unknown action '{}'", other),
        }
    }
}

/// A sub-command showing enums, arrays and nullable values.
struct BooksCommand;

impl Handler for BooksCommand {
    fn description(&self) -> &str {
        "Searches a tiny catalogue"
    }

    fn actions(&self) -> Vec<ActionDef> {
        vec![
            ActionDef::new("search")
                .default_action()
                .parameter(ParameterDef::array("words", ValueKind::String))
                .parameter(
                    ParameterDef::enumeration("format", ["Paper", "Ebook"])
                        .default_value(Value::Enum("Paper".into())),
                )
                .parameter(ParameterDef::int32("year").nullable()),
        ]
    }

    fn invoke(&mut self, call: &Call<'_>) -> Result<Outcome> {
        let words: Vec<String> = call.args().get("words")?;
        let format: String = call.args().get("format")?;
        let year: Option<i32> = call.args().get("year")?;
        let year = year.map_or_else(|| "any year".to_string(), |y| y.to_string());
        call.logger()
            .info(format_args!("{} ({}, {})", words.join(" "), format, year));
        Ok(Outcome::Flag(!words.is_empty()))
    }
}

fn main() {
    init_env_logger();

    let settings = match Settings::default().with_env_overrides() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    };

    let root = Command::new(FizzBuzzCommand { verbose: false }).with(Command::new(BooksCommand));
    let mut dispatcher = Dispatcher::new(root).with_settings(settings);

    for result in dispatcher.validate() {
        eprintln!("{}: {}", "Warning".yellow().bold(), result);
    }

    std::process::exit(dispatcher.execute_args(std::env::args().skip(1)));
}
