//! Output formatting for CLI commands

use serde::Serialize;

use crate::domain::Outcome;
use crate::storage;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<storage::OutputFormat> for OutputFormat {
    fn from(format: storage::OutputFormat) -> Self {
        match format {
            storage::OutputFormat::Text => OutputFormat::Text,
            storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Reports the outcome of a mutation
    ///
    /// `id` is the entity the mutation created or touched, if any.
    pub fn outcome(&self, action: &str, outcome: &Outcome, id: Option<&str>, message: &str) {
        match (self.format, outcome) {
            (OutputFormat::Json, Outcome::Changed) => self.data(&serde_json::json!({
                "action": action,
                "changed": true,
                "id": id,
            })),
            (OutputFormat::Json, Outcome::Unchanged(reason)) => self.data(&serde_json::json!({
                "action": action,
                "changed": false,
                "id": id,
                "unchanged": reason,
            })),
            (OutputFormat::Text, Outcome::Changed) => println!("{}", message),
            (OutputFormat::Text, Outcome::Unchanged(reason)) => {
                println!("No change: {}", reason)
            }
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}
