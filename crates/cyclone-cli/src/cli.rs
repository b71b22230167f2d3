use clap::{Parser, ValueEnum};

use crate::commands::Commands;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "cyclone",
    author,
    version,
    about = "Reference-cycle detector for serializable object graphs",
    long_about = "Cyclone reads symbol snapshots of compiled code and reports data members\n\
                  of serializable types that can lead back to the type carrying them,\n\
                  i.e. object graphs that may contain reference cycles once deserialized."
)]
pub struct Cli {
    /// Set the log level (RUST_LOG directives are honored as well)
    #[arg(long, global = true, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}
