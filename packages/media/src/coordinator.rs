//! # Upload Coordinator
//!
//! Owns the lifecycle of one validated file, from local preview to
//! permanent image block or cleanup.
//!
//! ```text
//! Validating ──decode ok──▶ PreviewReady ──spawn──▶ Uploading ──ok, anchored──▶ Inserted
//!     │                                                 │
//!     └──decode error──▶ Discarded ◀──failure / timeout──┴──ok, anchor gone
//! ```
//!
//! The preview is added in the same call that starts the upload, so it
//! is always visible before the upload can settle. Settlements arrive
//! as [`ImportEvent::UploadSettled`] and are applied by [`resolve`] in
//! whatever order the network completes.
//!
//! [`resolve`]: UploadCoordinator::resolve

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use ara_editor::{Block, ImageNode};
use futures::FutureExt;
use serde_json::json;
use tokio::sync::mpsc::UnboundedSender;

use crate::insertion::resolve_insert_position;
use crate::{
    decode_dimensions, Dimensions, EditorHost, ErrorTracker, ImportCandidate, ImportEvent, MediaConfig, Notification,
    Notifier, PlaceholderAction, PlaceholderId, PlaceholderIds, PreviewElement, UploadError, UploadRequest, Uploader,
};

/// Number of finished imports whose state stays queryable
pub const FINISHED_STATES_KEPT: usize = 256;

/// Lifecycle state of one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Validating,
    PreviewReady,
    Uploading,
    Inserted,
    Discarded,
}

impl UploadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadState::Inserted | UploadState::Discarded)
    }
}

/// Everything needed to reconcile one upload once it settles
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub id: PlaceholderId,
    pub file_name: String,
    pub mime: String,
    pub size: u64,
    pub dimensions: Dimensions,
    pub accessible_text: String,
}

impl UploadTask {
    fn context(&self) -> serde_json::Value {
        json!({
            "placeholder": self.id.to_string(),
            "fileName": self.file_name,
            "mime": self.mime,
            "size": self.size,
        })
    }
}

pub struct UploadCoordinator {
    uploader: Arc<dyn Uploader>,
    notifier: Arc<dyn Notifier>,
    tracker: Arc<dyn ErrorTracker>,
    config: Arc<MediaConfig>,
    ids: PlaceholderIds,
    events: UnboundedSender<ImportEvent>,
    states: HashMap<PlaceholderId, UploadState>,
    /// Terminal ids, oldest first
    finished: VecDeque<PlaceholderId>,
}

impl UploadCoordinator {
    pub fn new(
        config: Arc<MediaConfig>,
        uploader: Arc<dyn Uploader>,
        notifier: Arc<dyn Notifier>,
        tracker: Arc<dyn ErrorTracker>,
        events: UnboundedSender<ImportEvent>,
    ) -> Self {
        Self {
            uploader,
            notifier,
            tracker,
            config,
            ids: PlaceholderIds::new(),
            events,
            states: HashMap::new(),
            finished: VecDeque::new(),
        }
    }

    /// Show a preview for a validated file and start its upload
    ///
    /// Returns `None` when the file was discarded before a preview could
    /// be shown; the user has then already been notified.
    pub fn start(
        &mut self,
        host: &mut EditorHost,
        file: &ImportCandidate,
        position: usize,
        replace_selection: bool,
    ) -> Option<PlaceholderId> {
        let dimensions = match decode_dimensions(&file.bytes) {
            Ok(dimensions) => dimensions,
            Err(error) => {
                tracing::warn!(file = %file.name, %error, "could not decode image");
                self.notifier.notify(Notification::decode_failed(&error, &file.name));
                self.tracker.capture(
                    &error,
                    json!({ "fileName": file.name, "mime": file.mime, "size": file.size() }),
                );
                return None;
            }
        };

        let mut tr = host.transaction();
        let anchor = match resolve_insert_position(&mut tr, position, replace_selection) {
            Ok(anchor) => anchor,
            Err(error) => {
                self.report_unexpected(&error, &file.name, json!({ "fileName": file.name, "position": position }));
                return None;
            }
        };

        let id = self.ids.next_id();
        self.transition(id, UploadState::Validating);

        let preview = Arc::new(PreviewElement {
            file_name: file.name.clone(),
            mime: file.mime.clone(),
            bytes: Arc::clone(&file.bytes),
            dimensions,
        });
        tr.set_meta(PlaceholderAction::Add { id, preview, anchor });

        if let Err(error) = host.dispatch(tr) {
            self.transition(id, UploadState::Discarded);
            self.report_unexpected(&error, &file.name, json!({ "fileName": file.name, "placeholder": id.to_string() }));
            return None;
        }
        self.transition(id, UploadState::PreviewReady);

        let task = UploadTask {
            id,
            file_name: file.name.clone(),
            mime: file.mime.clone(),
            size: file.size(),
            dimensions,
            accessible_text: file.accessible_text(&self.config),
        };
        self.spawn_upload(UploadRequest::from(file), task);
        self.transition(id, UploadState::Uploading);

        Some(id)
    }

    fn spawn_upload(&self, request: UploadRequest, task: UploadTask) {
        let uploader = Arc::clone(&self.uploader);
        let events = self.events.clone();
        let timeout = self.config.upload_timeout();

        tokio::spawn(async move {
            // A panicking uploader settles as an unknown error
            let upload = AssertUnwindSafe(async { uploader.upload(&request).await }).catch_unwind();
            let result = match tokio::time::timeout(timeout, upload).await {
                Ok(Ok(result)) => result,
                Ok(Err(payload)) => Err(UploadError::unknown(format!(
                    "uploader panicked: {}",
                    panic_message(&*payload)
                ))),
                Err(_) => Err(UploadError::Timeout(timeout)),
            };

            if events.send(ImportEvent::UploadSettled { task, result }).is_err() {
                tracing::debug!(file = %request.file_name, "importer dropped before upload settled");
            }
        });
    }

    /// Reconcile a settled upload with the document
    pub fn resolve(
        &mut self,
        host: &mut EditorHost,
        task: UploadTask,
        result: Result<String, UploadError>,
    ) -> UploadState {
        let state = match result {
            Ok(key) => self.insert(host, &task, &key),
            Err(error) => {
                self.remove_placeholder(host, task.id);

                self.notifier.notify(Notification::upload_failed(&error, &task.file_name));

                if let UploadError::Unknown { status, body, .. } = &error {
                    tracing::error!(id = %task.id, file = %task.file_name, %error, "upload failed");
                    let mut context = task.context();
                    context["status"] = json!(status);
                    context["body"] = json!(body);
                    self.tracker.capture(&error, context);
                } else {
                    tracing::warn!(id = %task.id, file = %task.file_name, %error, "upload rejected");
                }

                UploadState::Discarded
            }
        };

        self.transition(task.id, state);
        state
    }

    fn insert(&mut self, host: &mut EditorHost, task: &UploadTask, key: &str) -> UploadState {
        let Some(pos) = host.placeholders().find(task.id) else {
            // The stored object stays unreferenced until the server prunes it
            tracing::warn!(id = %task.id, file = %task.file_name, key, "placeholder anchor was deleted, dropping upload");
            self.remove_placeholder(host, task.id);
            return UploadState::Discarded;
        };

        let node = ImageNode {
            src: self.config.public_url(key),
            alt: task.accessible_text.clone(),
            width: task.dimensions.width,
            height: task.dimensions.height,
        };

        let mut context = task.context();
        context["key"] = json!(key);

        let mut tr = host.transaction();
        if let Err(error) = tr.insert_block(pos, Block::Image(node)) {
            self.remove_placeholder(host, task.id);
            self.report_unexpected(&error, &task.file_name, context);
            return UploadState::Discarded;
        }
        tr.set_meta(PlaceholderAction::Remove { id: task.id });

        match host.dispatch(tr) {
            Ok(version) => {
                tracing::info!(id = %task.id, file = %task.file_name, pos, version, "image inserted");
                UploadState::Inserted
            }
            Err(error) => {
                self.remove_placeholder(host, task.id);
                self.report_unexpected(&error, &task.file_name, context);
                UploadState::Discarded
            }
        }
    }

    /// Detach a preview without touching the document
    fn remove_placeholder(&self, host: &mut EditorHost, id: PlaceholderId) {
        let mut tr = host.transaction();
        tr.set_meta(PlaceholderAction::Remove { id });

        if let Err(error) = host.dispatch(tr) {
            tracing::error!(%id, %error, "could not remove placeholder");
        }
    }

    fn report_unexpected(
        &self,
        error: &(dyn std::error::Error + 'static),
        file_name: &str,
        context: serde_json::Value,
    ) {
        tracing::error!(file = %file_name, %error, "unexpected import failure");
        self.notifier.notify(Notification::unknown(file_name));
        self.tracker.capture(error, context);
    }

    fn transition(&mut self, id: PlaceholderId, state: UploadState) {
        tracing::debug!(%id, ?state, "upload state");
        let previous = self.states.insert(id, state);

        if state.is_terminal() && !previous.is_some_and(|previous| previous.is_terminal()) {
            self.finished.push_back(id);
            while self.finished.len() > FINISHED_STATES_KEPT {
                if let Some(oldest) = self.finished.pop_front() {
                    self.states.remove(&oldest);
                }
            }
        }
    }

    /// Last known state of an import
    ///
    /// Only the latest [`FINISHED_STATES_KEPT`] finished imports are
    /// remembered; older ones report `None`.
    pub fn state(&self, id: PlaceholderId) -> Option<UploadState> {
        self.states.get(&id).copied()
    }
}

/// Text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
