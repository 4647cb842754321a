//! # Import Orchestrator
//!
//! Single entry point for drops, pastes and the insert button. Inputs
//! are normalized into a batch of [`ImportCandidate`]s, validated one by
//! one and handed to the [`UploadCoordinator`].
//!
//! Asynchronous work (uploads and URI fetches) reports back through one
//! channel of [`ImportEvent`]s. The owner of the [`EditorHost`] drains
//! it with [`MediaImporter::process`] so every document change still
//! happens on the owner's side, one at a time.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use ara_editor::Assoc;
use futures::future::join_all;
use futures::FutureExt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::coordinator::panic_message;
use crate::{
    DataTransfer, EditorHost, ErrorTracker, FetchError, Fetcher, ImportCandidate, MediaConfig, Notification, Notifier,
    PlaceholderId, UploadCoordinator, UploadError, UploadState, UploadTask, Uploader, ValidationError,
};

/// Completion of an asynchronous step
#[derive(Debug)]
pub enum ImportEvent {
    UploadSettled {
        task: UploadTask,
        result: Result<String, UploadError>,
    },
    UrisResolved {
        files: Vec<ImportCandidate>,
        failures: Vec<FetchError>,
        /// Session version the position was captured at
        version: u64,
        position: usize,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Delete the current selection before inserting
    pub replace_selection: bool,
}

/// Import pipeline of one editor
pub struct MediaImporter {
    config: Arc<MediaConfig>,
    fetcher: Arc<dyn Fetcher>,
    notifier: Arc<dyn Notifier>,
    coordinator: UploadCoordinator,
    events: UnboundedSender<ImportEvent>,
    receiver: UnboundedReceiver<ImportEvent>,
    pending: usize,
}

impl MediaImporter {
    pub fn new(
        config: MediaConfig,
        uploader: Arc<dyn Uploader>,
        fetcher: Arc<dyn Fetcher>,
        notifier: Arc<dyn Notifier>,
        tracker: Arc<dyn ErrorTracker>,
    ) -> Self {
        let config = Arc::new(config);
        let (events, receiver) = mpsc::unbounded_channel();
        let coordinator =
            UploadCoordinator::new(Arc::clone(&config), uploader, Arc::clone(&notifier), tracker, events.clone());

        Self {
            config,
            fetcher,
            notifier,
            coordinator,
            events,
            receiver,
            pending: 0,
        }
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// Handle a drop or paste payload
    ///
    /// Returns `false` when the payload carries neither files nor URIs,
    /// leaving it to the editor's default handling.
    pub fn handle_data_transfer(&mut self, host: &mut EditorHost, transfer: DataTransfer, position: usize) -> bool {
        if !transfer.files.is_empty() {
            self.handle_images_import(host, transfer.files, position, ImportOptions::default());
            return true;
        }

        if transfer.uris.is_empty() {
            return false;
        }

        self.fetch_uris(host, transfer.uris, position);
        true
    }

    /// Import files picked with the insert button, replacing the selection
    pub fn handle_insert(&mut self, host: &mut EditorHost, files: Vec<ImportCandidate>) {
        let position = host.session().selection().from();
        self.handle_images_import(host, files, position, ImportOptions { replace_selection: true });
    }

    /// Validate a batch and start an upload for every accepted file
    pub fn handle_images_import(
        &mut self,
        host: &mut EditorHost,
        files: Vec<ImportCandidate>,
        position: usize,
        options: ImportOptions,
    ) -> Vec<PlaceholderId> {
        let max = self.config.max_files_per_batch;
        if files.len() > max {
            let error = ValidationError::TooManyFiles { count: files.len(), max };
            tracing::warn!(%error, "batch rejected");
            self.notifier.notify(Notification::validation(&error));
            return Vec::new();
        }

        tracing::info!(files = files.len(), position, "importing batch");

        let mut position = position.min(host.document().content_size());
        let mut started = Vec::with_capacity(files.len());

        for file in &files {
            if let Err(error) = file.validate(&self.config) {
                tracing::warn!(%error, "file rejected");
                self.notifier.notify(Notification::validation(&error));
                continue;
            }

            let version = host.session().version();
            if let Some(id) = self.coordinator.start(host, file, position, options.replace_selection) {
                self.pending += 1;
                started.push(id);
            }

            // Keep later files of the batch next to this one
            position = carry_forward(host, version, position);
        }

        started
    }

    fn fetch_uris(&mut self, host: &EditorHost, uris: Vec<String>, position: usize) {
        let fetcher = Arc::clone(&self.fetcher);
        let events = self.events.clone();
        let version = host.session().version();

        tracing::info!(uris = uris.len(), "fetching external images");

        tokio::spawn(async move {
            let fetcher = &fetcher;
            let results = join_all(uris.iter().map(|uri| {
                async move {
                    let outcome = AssertUnwindSafe(async move { fetcher.fetch(uri).await })
                        .catch_unwind()
                        .await;
                    outcome.unwrap_or_else(|payload| {
                        Err(FetchError::Request {
                            uri: uri.clone(),
                            reason: format!("fetcher panicked: {}", panic_message(&*payload)),
                        })
                    })
                }
            }))
            .await;

            let mut files = Vec::new();
            let mut failures = Vec::new();
            for result in results {
                match result {
                    Ok(file) => files.push(file),
                    Err(error) => failures.push(error),
                }
            }

            let event = ImportEvent::UrisResolved {
                files,
                failures,
                version,
                position,
            };
            if events.send(event).is_err() {
                tracing::debug!("importer dropped before external images were fetched");
            }
        });

        self.pending += 1;
    }

    /// Apply one completed asynchronous step
    pub fn process(&mut self, host: &mut EditorHost, event: ImportEvent) {
        self.pending = self.pending.saturating_sub(1);

        match event {
            ImportEvent::UploadSettled { task, result } => {
                self.coordinator.resolve(host, task, result);
            }
            ImportEvent::UrisResolved {
                files,
                failures,
                version,
                position,
            } => {
                for failure in &failures {
                    tracing::warn!(error = %failure, "external image not fetched");
                }

                if files.is_empty() {
                    self.notifier.notify(Notification::fetch_failed(&failures));
                    return;
                }

                // The user may have edited while the fetch ran
                let size = host.document().content_size();
                let position = carry_forward(host, version, position).min(size);

                self.handle_images_import(host, files, position, ImportOptions::default());
            }
        }
    }

    /// Wait for the next completed step, `None` when nothing is in flight
    pub async fn next_event(&mut self) -> Option<ImportEvent> {
        if self.pending == 0 {
            return None;
        }
        self.receiver.recv().await
    }

    /// Process events until every upload and fetch has been reconciled
    pub async fn run_until_idle(&mut self, host: &mut EditorHost) {
        while let Some(event) = self.next_event().await {
            self.process(host, event);
        }
    }

    /// Number of uploads and fetches still in flight
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn state(&self, id: PlaceholderId) -> Option<UploadState> {
        self.coordinator.state(id)
    }
}

/// Map a position captured at `version` to the current document
///
/// Falls back to the captured position when the session no longer has
/// the edits in between.
fn carry_forward(host: &EditorHost, version: u64, position: usize) -> usize {
    match host.session().map_since(version, position, Assoc::Before) {
        Some(mapped) => mapped.pos,
        None => {
            tracing::warn!(
                version,
                current = host.session().version(),
                position,
                "edit history does not reach the captured position, using it unmapped"
            );
            position
        }
    }
}
