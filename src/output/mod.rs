// Output sinks for command results, warnings and terminating errors

pub mod format;

pub use format::{JsonFormatter, TableData, TextFormatter};

use crate::dispatch::{Payload, TerminatingError};
use clap::ValueEnum;
use log::warn;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Mutex;

/// Rendering of result objects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// The one thing a command execution reports
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    /// Result object
    Result(Payload),
    /// Informational warning with a null result
    Warning(String),
    /// Terminating error
    Terminating(TerminatingError),
}

impl Emission {
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Emission::Result(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn terminating_error(&self) -> Option<&TerminatingError> {
        match self {
            Emission::Terminating(error) => Some(error),
            _ => None,
        }
    }
}

/// Receives what command executions report
pub trait OutputSink: Send + Sync {
    fn emit(&self, emission: &Emission);

    /// Diagnostic text shown only in verbose mode
    fn verbose(&self, line: &str);
}

/// Writes results to stdout and warnings/errors to stderr
pub struct ConsoleSink {
    format: OutputFormat,
    verbose: bool,
}

impl ConsoleSink {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    fn render_payload(&self, payload: &Payload) -> Result<String, serde_json::Error> {
        match self.format {
            OutputFormat::Json => JsonFormatter::format(payload),
            OutputFormat::Text => TextFormatter::format(payload),
        }
    }

    fn render_error(&self, error: &TerminatingError) -> String {
        if self.format == OutputFormat::Json {
            if let Ok(json) = JsonFormatter::format_error(error) {
                return json;
            }
        }
        match error.error_id_str() {
            Some(id) => format!("ERROR [{}]: {}", id, error.message),
            None => format!("ERROR: {}", error.message),
        }
    }
}

impl OutputSink for ConsoleSink {
    fn emit(&self, emission: &Emission) {
        match emission {
            Emission::Result(payload) => match self.render_payload(payload) {
                Ok(text) => {
                    let mut stdout = std::io::stdout().lock();
                    if let Err(e) = writeln!(stdout, "{}", text) {
                        warn!("failed to write result: {}", e);
                    }
                }
                Err(e) => warn!("failed to render result: {}", e),
            },
            Emission::Warning(message) => eprintln!("WARNING: {}", message),
            Emission::Terminating(error) => eprintln!("{}", self.render_error(error)),
        }
    }

    fn verbose(&self, line: &str) {
        if self.verbose {
            eprintln!("VERBOSE: {}", line);
        }
    }
}

/// Records everything it receives
#[derive(Default)]
pub struct CollectingSink {
    emissions: Mutex<Vec<Emission>>,
    verbose: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emissions(&self) -> Vec<Emission> {
        self.emissions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn verbose_lines(&self) -> Vec<String> {
        self.verbose
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl OutputSink for CollectingSink {
    fn emit(&self, emission: &Emission) {
        self.emissions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(emission.clone());
    }

    fn verbose(&self, line: &str) {
        self.verbose
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_records_in_order() {
        let sink = CollectingSink::new();
        sink.verbose("resolving");
        sink.emit(&Emission::Warning("Node is not configured.".to_string()));

        assert_eq!(
            sink.emissions(),
            vec![Emission::Warning("Node is not configured.".to_string())]
        );
        assert_eq!(sink.verbose_lines(), vec!["resolving".to_string()]);
    }

    #[test]
    fn test_output_format_parses() {
        assert_eq!(OutputFormat::from_str("json", true).unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }
}
