// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `issue-token` command.

use anyhow::Context;
use tourgate_api::response::LoginResponse;
use tourgate_api::{Identity, Role, TokenService};
use tourgate_config::TourgateConfig;
use tracing::info;

use crate::cli::{IssueTokenArgs, OutputFormat};
use crate::error::{BinError, BinResult};
use crate::runtime::token_config;

/// Executes the `issue-token` command.
///
/// Text output is the bare token so it can be captured by a shell.
pub fn issue_token(args: IssueTokenArgs, config: TourgateConfig) -> BinResult<()> {
    let role: Role = args.role.parse()?;
    let tokens = TokenService::new(token_config(&config.security.token)?)?;

    let subject = args.subject.trim();
    let token = tokens
        .issue(subject, role)
        .map_err(|e| BinError::from(e).with_context("Failed to issue token"))?;

    info!(subject = %subject, role = %role, "Issued token from the command line");

    match args.format {
        OutputFormat::Text => println!("{}", token),
        OutputFormat::Json => {
            let response = LoginResponse::new(
                token,
                tokens.ttl_secs(),
                Identity::new(subject, role),
            );
            let json =
                serde_json::to_string_pretty(&response).context("Failed to serialize output")?;
            println!("{}", json);
        }
    }

    Ok(())
}
