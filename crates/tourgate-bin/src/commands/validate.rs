// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use anyhow::Context;
use tourgate_config::{ConfigResult, TourgateConfig};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};
use crate::runtime::Components;

/// Executes the `validate` command.
///
/// Beyond schema validation this compiles the rule table and user directory,
/// so unknown role names and malformed patterns are reported too.
pub fn validate(cli: &Cli, args: ValidateArgs, loaded: ConfigResult<TourgateConfig>) -> BinResult<()> {
    let config_path = cli.config.display().to_string();

    let checked = loaded
        .map_err(BinError::from)
        .and_then(|config| Components::from_config(&config).map(|c| (config, c)));

    let (config, components) = match checked {
        Ok(pair) => pair,
        Err(e) => {
            if args.format == OutputFormat::Json {
                let output = serde_json::json!({
                    "valid": false,
                    "config_path": config_path,
                    "error": e.to_string(),
                });
                println!("{}", to_pretty(&output)?);
            }
            return Err(e.with_context("Configuration validation failed"));
        }
    };

    let mut warnings: Vec<String> = components
        .rules
        .diagnostics()
        .iter()
        .map(ToString::to_string)
        .collect();
    if components.credentials.is_empty() {
        warnings.push("No users configured; every login will be rejected".to_string());
    }

    let rule_source = if config.security.rules.is_some() {
        "configured"
    } else {
        "built-in"
    };

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path);
            println!();
            println!("Summary:");
            println!("  API: {}", components.api.socket_addr());
            println!("  Algorithm: {}", components.tokens.algorithm());
            println!("  Token TTL: {}s", components.tokens.ttl_secs());
            println!("  Issuer: {}", components.tokens.issuer().unwrap_or("(none)"));
            println!("  Rules: {} ({})", components.rules.len(), rule_source);
            println!("  Users: {}", components.credentials.len());
            println!("  CORS origins: {}", components.api.cors.allowed_origins.len());

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration (secrets omitted):");
                println!("{}", to_pretty(&config)?);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path,
                "summary": {
                    "bind_address": components.api.socket_addr().to_string(),
                    "algorithm": components.tokens.algorithm().as_str(),
                    "token_ttl_secs": components.tokens.ttl_secs(),
                    "issuer": components.tokens.issuer(),
                    "rule_count": components.rules.len(),
                    "rule_source": rule_source,
                    "user_count": components.credentials.len(),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            println!("{}", to_pretty(&output)?);
        }
    }

    Ok(())
}

fn to_pretty<T: serde::Serialize>(value: &T) -> BinResult<String> {
    Ok(serde_json::to_string_pretty(value).context("Failed to serialize output")?)
}
