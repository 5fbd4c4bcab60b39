// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `run`: Start the gateway server
//! - `validate`: Validate configuration file
//! - `issue-token`: Mint a token with the configured secret
//! - `version`: Show version information

mod issue;
mod run;
mod validate;
mod version;

pub use issue::issue_token;
pub use run::run;
pub use validate::validate;
pub use version::version;

use tourgate_config::{ConfigLoader, TourgateConfig};
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::error::{BinError, BinResult};
use crate::logging::init_logging;

/// Executes the appropriate command based on CLI arguments.
///
/// The configuration file is loaded once, before logging starts, so its
/// `logging` section can seed the log level and format.
pub async fn execute(cli: Cli) -> BinResult<()> {
    let command = cli.effective_command();

    if let Commands::Version = command {
        init_logging(cli.effective_log_level(None), cli.effective_log_format(None))?;
        return version::version(&cli);
    }

    let loaded = ConfigLoader::new().load(&cli.config);
    let logging = loaded.as_ref().ok().map(|config| config.logging.clone());
    init_logging(
        cli.effective_log_level(logging.as_ref().map(|l| l.level.as_str())),
        cli.effective_log_format(logging.as_ref().map(|l| l.format)),
    )?;

    if loaded.is_ok() {
        debug!(path = %cli.config.display(), "Configuration loaded");
    }

    match command {
        Commands::Validate(args) => validate::validate(&cli, args, loaded),
        Commands::Run(args) => run::run(args, require(&cli, loaded)?).await,
        Commands::IssueToken(args) => issue::issue_token(args, require(&cli, loaded)?),
        Commands::Version => version::version(&cli),
    }
}

fn require(
    cli: &Cli,
    loaded: tourgate_config::ConfigResult<TourgateConfig>,
) -> BinResult<TourgateConfig> {
    loaded.map_err(|e| {
        BinError::from(e).with_context(format!("Failed to load {}", cli.config.display()))
    })
}
