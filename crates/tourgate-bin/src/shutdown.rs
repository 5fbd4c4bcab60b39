// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Stops the server on SIGTERM or SIGINT.
//!
//! Every holder of a [`ShutdownCoordinator`] clone can wait on the same
//! one-way flag; the HTTP server drains in-flight requests once it flips.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use crate::error::{BinError, BinResult};

// =============================================================================
// ShutdownCoordinator
// =============================================================================

/// A shared, one-way shutdown flag.
///
/// ```ignore
/// use tourgate_bin::shutdown::ShutdownCoordinator;
///
/// let coordinator = ShutdownCoordinator::new();
/// coordinator.listen_for_signals();
/// server.run_with_shutdown(coordinator.shutdown_signal()).await?;
/// ```
#[derive(Clone)]
pub struct ShutdownCoordinator {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownCoordinator {
    /// Flag starts unset.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Returns a future that resolves when shutdown is initiated.
    ///
    /// Resolves immediately if shutdown already happened.
    pub fn shutdown_signal(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut receiver = self.sender.subscribe();
        async move {
            let _ = receiver.wait_for(|initiated| *initiated).await;
        }
    }

    /// Initiates shutdown. Idempotent.
    pub fn initiate_shutdown(&self) {
        let changed = self.sender.send_if_modified(|initiated| {
            if *initiated {
                false
            } else {
                *initiated = true;
                true
            }
        });
        if changed {
            info!("Shutting down");
        }
    }

    /// Whether the flag is set.
    pub fn is_shutdown_initiated(&self) -> bool {
        *self.sender.borrow()
    }

    /// Spawns a task that initiates shutdown on the first OS signal.
    pub fn listen_for_signals(&self) {
        let coordinator = self.clone();
        tokio::spawn(async move {
            match wait_for_signal().await {
                Ok(name) => {
                    info!("Received {}", name);
                    coordinator.initiate_shutdown();
                }
                Err(e) => error!("Signal handling unavailable: {}", e),
            }
        });
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Signals
// =============================================================================

/// Waits for SIGTERM or SIGINT (Ctrl+C on Windows) and returns its name.
pub async fn wait_for_signal() -> BinResult<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())
            .map_err(|e| BinError::init(format!("Failed to register SIGTERM handler: {}", e)))?;
        let mut sigint = signal(SignalKind::interrupt())
            .map_err(|e| BinError::init(format!("Failed to register SIGINT handler: {}", e)))?;

        tokio::select! {
            _ = sigterm.recv() => Ok("SIGTERM"),
            _ = sigint.recv() => Ok("SIGINT"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| BinError::init(format!("Failed to register Ctrl+C handler: {}", e)))?;
        Ok("Ctrl+C")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn test_initiate_flips_state_once() {
        let coordinator = ShutdownCoordinator::default();
        assert!(!coordinator.is_shutdown_initiated());

        coordinator.initiate_shutdown();
        coordinator.initiate_shutdown();
        assert!(coordinator.is_shutdown_initiated());
    }

    #[tokio::test]
    async fn test_pending_signals_resolve_on_initiate() {
        let coordinator = ShutdownCoordinator::new();
        let server = coordinator.shutdown_signal();
        let runtime = coordinator.shutdown_signal();

        let trigger = coordinator.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.initiate_shutdown();
        });

        assert!(tokio::time::timeout(WAIT, server).await.is_ok());
        assert!(tokio::time::timeout(WAIT, runtime).await.is_ok());
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_shutdown() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.initiate_shutdown();

        assert!(tokio::time::timeout(WAIT, coordinator.shutdown_signal())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_signal_pending_without_initiate() {
        let coordinator = ShutdownCoordinator::new();
        let pending =
            tokio::time::timeout(Duration::from_millis(20), coordinator.shutdown_signal()).await;
        assert!(pending.is_err());
    }
}
