use anyhow::{Context, Result};
use gamever_core::{ConfigStore, DownloadDirStatus};
use gamever_installer::VersionStore;
use gamever_sync::{
    reconcile_selection, ReconcilerHandle, SelectionObserver, SelectionReconciler,
    SelectionSnapshot,
};
use tracing::{debug, warn};

use crate::render::TerminalRenderer;

/// One CLI invocation: the reconciler is started once on open and joined once on close.
pub(crate) struct Session {
    config: ConfigStore,
    reconciler: Option<ReconcilerHandle>,
}

impl Session {
    pub(crate) fn open(config: ConfigStore, renderer: TerminalRenderer) -> Result<Self> {
        Self::open_with_observer(config, renderer, |snapshot: &SelectionSnapshot| {
            debug!(
                selected = %snapshot.selected,
                installed = snapshot.installed.len(),
                "selection snapshot"
            );
        })
    }

    pub(crate) fn open_with_observer<O>(
        config: ConfigStore,
        renderer: TerminalRenderer,
        observer: O,
    ) -> Result<Self>
    where
        O: SelectionObserver + 'static,
    {
        let status = config
            .ensure_download_dir()
            .with_context(|| format!("failed to prepare settings in {}", config.root().display()))?;
        if let DownloadDirStatus::Reset { missing, reset_to } = status {
            renderer.print_status(
                "warn",
                &format!(
                    "download directory {} no longer exists; reset to {}",
                    missing.display(),
                    reset_to.display()
                ),
            );
        }

        // Converge before the command reads or writes the selection.
        if let Err(err) = reconcile_selection(&config) {
            warn!(error = %err, "initial selection reconciliation failed");
        }

        let reconciler = SelectionReconciler::new(config.clone())
            .spawn(observer)
            .context("failed to start selection reconciler")?;

        Ok(Self {
            config,
            reconciler: Some(reconciler),
        })
    }

    pub(crate) fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub(crate) fn store(&self) -> Result<VersionStore> {
        let download_dir = self
            .config
            .download_dir()
            .context("failed to read download directory from config")?;
        Ok(VersionStore::new(download_dir))
    }

    pub(crate) fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(reconciler) = self.reconciler.take() {
            if !reconciler.is_running() {
                warn!("selection reconciler exited before the session closed");
            }
            reconciler.stop();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}
