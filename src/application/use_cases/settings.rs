use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{app_error::AppResult, domain::entities::app_settings::AppSettings};

#[async_trait]
pub trait SettingsRepo: Send + Sync {
    /// `None` when no settings have been saved yet.
    async fn load(&self) -> AppResult<Option<AppSettings>>;
}

/// Shared view of the current settings. Cloned into whatever needs it; never global.
#[derive(Clone)]
pub struct SettingsHandle {
    tx: Arc<watch::Sender<AppSettings>>,
}

impl SettingsHandle {
    pub fn new(initial: AppSettings) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Load once at boot. Absent or unreadable settings start from defaults.
    pub async fn bootstrap(repo: &dyn SettingsRepo) -> Self {
        let initial = match repo.load().await {
            Ok(Some(settings)) => {
                info!(site_name = %settings.site_name, "Loaded settings");
                settings
            }
            Ok(None) => {
                info!("No stored settings, using defaults");
                AppSettings::default()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load settings, using defaults");
                AppSettings::default()
            }
        };
        Self::new(initial)
    }

    pub fn current(&self) -> AppSettings {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppSettings> {
        self.tx.subscribe()
    }

    /// Publishes `next` if it differs from the current value. Returns whether it changed.
    pub fn replace(&self, next: AppSettings) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        })
    }

    /// One refresh step: keep the old value on errors, fall back to defaults on absence.
    pub async fn refresh_from(&self, repo: &dyn SettingsRepo) -> AppResult<bool> {
        let next = repo.load().await?.unwrap_or_default();
        Ok(self.replace(next))
    }
}
