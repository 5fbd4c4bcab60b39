// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use tourgate_config::TourgateConfig;
use tracing::info;

use crate::cli::RunArgs;
use crate::error::BinResult;
use crate::runtime::RuntimeBuilder;

/// Executes the `run` command to start the gateway.
pub async fn run(args: RunArgs, config: TourgateConfig) -> BinResult<()> {
    info!("Starting tourgate gateway...");

    let runtime = RuntimeBuilder::new()
        .config(config)
        .host(args.host)
        .port(args.port)
        .build()?;

    runtime.run().await
}
