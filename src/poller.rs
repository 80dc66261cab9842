//! Recurring probe scheduling.
//!
//! An explicit scheduled task owned by the composition root: one immediate
//! round at startup, then one round per configured interval until shutdown.
//! The poller reads the interval from settings before every sleep, so setting
//! changes take effect on the next tick; it has no opinion on the value
//! itself.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::SettingsStore;
use crate::selector::FailoverSelector;
use crate::shutdown::ShutdownHandle;

pub struct ProbePoller {
    handle: JoinHandle<()>,
}

impl ProbePoller {
    /// Spawn the polling task.
    pub fn spawn(
        selector: Arc<FailoverSelector>,
        settings: SettingsStore,
        shutdown: ShutdownHandle,
    ) -> Self {
        let handle = tokio::spawn(async move {
            selector.ping_all().await;

            loop {
                let interval = Duration::from_millis(settings.settings().ping_interval_ms.max(1));
                tokio::select! {
                    _ = shutdown.wait() => break,
                    _ = tokio::time::sleep(interval) => {
                        selector.ping_all().await;
                    }
                }
            }
            tracing::debug!(target: "poller", "probe poller stopped");
        });

        Self { handle }
    }

    /// Wait for the polling task to finish after shutdown was signaled.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}
