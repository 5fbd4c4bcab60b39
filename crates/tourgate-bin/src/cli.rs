// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Command line of the `tourgate` binary.
//!
//! `run` is assumed when no subcommand is given. `validate`, `issue-token`
//! and `run` read the config file named by `--config`; `version` does not.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Cli
// =============================================================================

/// tourgate - stateless token authentication and role-based access gateway
#[derive(Parser, Debug)]
#[command(
    name = "tourgate",
    author = "Sylvex <contact@sylvex.io>",
    version = tourgate_api::VERSION,
    about = "Stateless token authentication and role-based access gateway",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Path to the YAML, TOML or JSON config file
    #[arg(
        short,
        long,
        default_value = "tourgate.yaml",
        env = "TOURGATE_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Log format; overrides the config file
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `run`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the API until SIGTERM or SIGINT
    Run(RunArgs),

    /// Check the config file without serving
    ///
    /// Loads the configuration, compiles the rule table and reports
    /// unreachable rules without starting the server.
    Validate(ValidateArgs),

    /// Issue a signed token
    ///
    /// Uses the configured secret. Intended for manual testing against a
    /// running gateway.
    #[command(name = "issue-token")]
    IssueToken(IssueTokenArgs),

    /// Print crate versions and signing algorithms
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Override the bind address
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Override the bind port
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Print the loaded configuration; secrets and passwords are left out
    #[arg(short, long)]
    pub show_config: bool,

    /// Report format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `issue-token` command.
#[derive(Args, Debug, Clone)]
pub struct IssueTokenArgs {
    /// Token subject, usually the user's email
    #[arg(short, long)]
    pub subject: String,

    /// Role name, e.g. GENERAL_MANAGER
    #[arg(short, long)]
    pub role: String,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Multi-line, colored when attached to a terminal
    #[default]
    Text,
    /// One JSON object per event
    Json,
    /// Single-line text
    Compact,
}

impl From<tourgate_config::LogFormat> for LogFormat {
    fn from(format: tourgate_config::LogFormat) -> Self {
        match format {
            tourgate_config::LogFormat::Text => LogFormat::Text,
            tourgate_config::LogFormat::Json => LogFormat::Json,
            tourgate_config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text; `issue-token` prints only the token
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

// =============================================================================
// Resolution
// =============================================================================

impl Cli {
    /// Parses `std::env::args`, exiting on usage errors.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subcommand, or `run` with no overrides.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Log level to start with.
    ///
    /// `-q` and `-v` win over `--log-level`, which wins over `configured`.
    pub fn effective_log_level<'a>(&'a self, configured: Option<&'a str>) -> &'a str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            self.log_level
                .as_deref()
                .or(configured)
                .unwrap_or("info")
        }
    }

    /// Log format to start with: `--log-format`, then `configured`, then text.
    pub fn effective_log_format(&self, configured: Option<tourgate_config::LogFormat>) -> LogFormat {
        self.log_format
            .or_else(|| configured.map(LogFormat::from))
            .unwrap_or_default()
    }
}

// =============================================================================
// Tests
// =============================================================================
