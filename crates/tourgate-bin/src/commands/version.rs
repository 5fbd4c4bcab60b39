// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use tourgate_api::auth::SigningAlgorithm;

use crate::cli::Cli;
use crate::error::BinResult;

/// Executes the `version` command to display version information.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("tourgate - stateless token authentication and role-based access gateway");
    println!();
    println!("Version Information:");
    println!("  tourgate-bin:    {}", crate::VERSION);
    println!("  tourgate-api:    {}", tourgate_api::VERSION);
    println!("  tourgate-config: {}", tourgate_config::VERSION);
    println!();
    println!("Build Information:");
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
    println!();
    println!("Token Algorithms:");
    for algorithm in [
        SigningAlgorithm::Hs256,
        SigningAlgorithm::Hs384,
        SigningAlgorithm::Hs512,
    ] {
        println!(
            "  {}  (secret >= {} bytes)",
            algorithm,
            algorithm.min_secret_len()
        );
    }
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
