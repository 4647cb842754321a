//! # Ara Media
//!
//! Asynchronous image import for the Ara editor: a user drops, pastes or
//! picks images, sees local previews right away, and the previews are
//! replaced by permanent image blocks as uploads complete. The user may
//! keep editing the whole time.
//!
//! ## Architecture
//!
//! ```text
//! drop / paste / insert button
//!            ↓
//! ┌─────────────────────────────────────────────┐
//! │ MediaImporter: normalize, fetch URIs,       │
//! │ validate the batch                          │
//! └─────────────────────────────────────────────┘
//!            ↓ one call per accepted file
//! ┌─────────────────────────────────────────────┐
//! │ UploadCoordinator: decode, resolve position,│
//! │ add placeholder, spawn upload               │
//! └─────────────────────────────────────────────┘
//!            ↓ ImportEvent::UploadSettled
//! ┌─────────────────────────────────────────────┐
//! │ EditorHost: document + PlaceholderSet,      │
//! │ updated together on every transaction       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! 1. A placeholder is shown before its upload can settle
//! 2. Every failure yields exactly one notification
//! 3. A placeholder is detached exactly once, whatever the outcome
//! 4. One file's failure never affects the rest of its batch
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ara_editor::{Document, EditSession};
//! use ara_media::{
//!     DataTransfer, EditorHost, HttpFetcher, HttpUploader, ImportCandidate, MediaConfig, MediaImporter,
//!     TracingErrorTracker, TracingNotifier,
//! };
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = MediaConfig::default();
//! let mut importer = MediaImporter::new(
//!     config.clone(),
//!     Arc::new(HttpUploader::new(&config)?),
//!     Arc::new(HttpFetcher::new(&config)?),
//!     Arc::new(TracingNotifier),
//!     Arc::new(TracingErrorTracker),
//! );
//!
//! let mut host = EditorHost::new(EditSession::new("notes", Document::from_paragraphs(["Contrast issue"])));
//! let file = ImportCandidate::from_path("capture.png".as_ref())?;
//!
//! importer.handle_data_transfer(&mut host, DataTransfer::files(vec![file]), 16);
//! importer.run_until_idle(&mut host).await;
//! # Ok(())
//! # }
//! ```

mod candidate;
mod config;
mod coordinator;
mod decode;
mod errors;
mod host;
pub mod insertion;
pub mod notify;
mod orchestrator;
mod placeholder;
mod transport;

pub use candidate::{parse_uri_list, DataTransfer, ImportCandidate, Provenance, EXTERNAL_FILE_NAME};
pub use config::{MediaConfig, DEFAULT_CONFIG_NAME};
pub use coordinator::{UploadCoordinator, UploadState, UploadTask, FINISHED_STATES_KEPT};
pub use decode::{decode_dimensions, Dimensions};
pub use errors::{ConfigError, DecodeError, FetchError, UploadError, ValidationError};
pub use host::EditorHost;
pub use insertion::resolve_insert_position;
pub use notify::{
    ErrorTracker, Notification, NotificationCategory, Notifier, TracingErrorTracker, TracingNotifier,
};
pub use orchestrator::{ImportEvent, ImportOptions, MediaImporter};
pub use placeholder::{
    PlaceholderAction, PlaceholderEntry, PlaceholderId, PlaceholderIds, PlaceholderSet, PreviewElement,
};
pub use transport::{Fetcher, HttpFetcher, HttpUploader, UploadRequest, Uploader};
