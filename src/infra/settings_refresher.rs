use std::{sync::Arc, time::Duration};

use tracing::{debug, info, warn};

use crate::use_cases::settings::{SettingsHandle, SettingsRepo};

/// Periodically reloads settings into `handle`. A failed load keeps the last good value.
pub async fn run_settings_refresh_loop(
    repo: Arc<dyn SettingsRepo>,
    handle: SettingsHandle,
    period: Duration,
) {
    info!(period_secs = period.as_secs(), "Settings refresh loop started");
    let mut interval = tokio::time::interval(period);
    // The first tick fires immediately; bootstrap already loaded once.
    interval.tick().await;
    loop {
        interval.tick().await;
        match handle.refresh_from(repo.as_ref()).await {
            Ok(true) => info!(settings = ?handle.current(), "Settings changed"),
            Ok(false) => debug!("Settings unchanged"),
            Err(e) => warn!(error = %e, "Settings refresh failed, keeping last value"),
        }
    }
}
