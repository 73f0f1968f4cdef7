pub mod assistant;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod logging;
pub mod render;
pub mod state;
pub mod store;
pub mod synth;
pub mod web;

#[cfg(test)]
mod testing;

pub use assistant::{AskOutcome, AskRequest, FaqAssistant};
pub use error::{FaqError, FaqResult};
