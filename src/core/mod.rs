// src/core/mod.rs

pub mod action;
pub mod coercion;
pub mod command;
pub mod conventions;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod help;
pub mod logger;
pub mod parameter;
pub mod parsers;
pub mod validator;
