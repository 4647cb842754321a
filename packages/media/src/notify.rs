//! # Notifications and error tracking
//!
//! Every user-visible outcome of an import goes through a [`Notifier`],
//! one call per outcome. Unexpected failures are additionally handed to
//! an [`ErrorTracker`] with whatever request/response context is known;
//! expected validation failures never are.

use std::fmt;

use serde::Serialize;

use crate::{DecodeError, FetchError, UploadError, ValidationError};

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationCategory {
    UploadSize,
    UploadFormat,
    UploadTimeout,
    UploadUnknown,
    TooManyFiles,
    FetchError,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::UploadSize => "UPLOAD_SIZE",
            NotificationCategory::UploadFormat => "UPLOAD_FORMAT",
            NotificationCategory::UploadTimeout => "UPLOAD_TIMEOUT",
            NotificationCategory::UploadUnknown => "UPLOAD_UNKNOWN",
            NotificationCategory::TooManyFiles => "TOO_MANY_FILES",
            NotificationCategory::FetchError => "FETCH_ERROR",
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user-visible message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub category: NotificationCategory,
    pub title: Option<String>,
    pub message: String,
}

impl Notification {
    pub fn new(category: NotificationCategory, title: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            category,
            title: title.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn validation(error: &ValidationError) -> Self {
        match error {
            ValidationError::NotAnImage { name, .. } => Self::new(
                NotificationCategory::UploadFormat,
                Some("Format non supporté"),
                format!("« {name} » n'est pas une image."),
            ),
            ValidationError::TooLarge { name, max, .. } => Self::new(
                NotificationCategory::UploadSize,
                Some("Fichier trop volumineux"),
                format!("« {name} » dépasse la taille maximale de {}.", megabytes(*max)),
            ),
            ValidationError::TooManyFiles { count, max } => Self::new(
                NotificationCategory::TooManyFiles,
                Some("Trop de fichiers"),
                format!("Vous pouvez importer {max} fichiers à la fois au maximum ({count} sélectionnés)."),
            ),
        }
    }

    /// No URI of a paste or drop could be fetched
    pub fn fetch_failed(errors: &[FetchError]) -> Self {
        let message = if errors.len() > 1 {
            format!("Impossible de récupérer les {} images depuis ces adresses.", errors.len())
        } else {
            "Impossible de récupérer l'image depuis cette adresse.".to_string()
        };

        Self::new(NotificationCategory::FetchError, Some("Import impossible"), message)
    }

    pub fn upload_failed(error: &UploadError, file_name: &str) -> Self {
        match error {
            UploadError::Timeout(_) => Self::new(
                NotificationCategory::UploadTimeout,
                Some("Délai dépassé"),
                format!("L'envoi de « {file_name} » a pris trop de temps, veuillez réessayer."),
            ),
            UploadError::SizeRejected => Self::new(
                NotificationCategory::UploadSize,
                Some("Fichier trop volumineux"),
                format!("Le serveur a refusé « {file_name} » : fichier trop volumineux."),
            ),
            UploadError::FormatRejected => Self::new(
                NotificationCategory::UploadFormat,
                Some("Format non supporté"),
                format!("Le serveur a refusé « {file_name} » : format non supporté."),
            ),
            UploadError::Unknown { .. } => Self::unknown(file_name),
        }
    }

    /// The local preview could not be built; still an unexpected failure
    pub fn decode_failed(error: &DecodeError, file_name: &str) -> Self {
        let message = match error {
            DecodeError::Io(_) => format!("Impossible de lire « {file_name} »."),
            DecodeError::Image(_) => format!("« {file_name} » est endommagé ou n'est pas une image valide."),
            DecodeError::Empty => format!("« {file_name} » ne contient aucun pixel."),
        };

        Self::new(NotificationCategory::UploadUnknown, Some("Erreur inattendue"), message)
    }

    pub fn unknown(file_name: &str) -> Self {
        Self::new(
            NotificationCategory::UploadUnknown,
            Some("Erreur inattendue"),
            format!("Une erreur est survenue lors de l'import de « {file_name} »."),
        )
    }
}

/// Size with a French decimal comma
fn megabytes(bytes: u64) -> String {
    let value = bytes as f64 / 1_000_000.0;
    let number = if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}").replace('.', ",")
    };

    format!("{number} Mo")
}

/// Notification channel (fire-and-forget)
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sink for unexpected errors
pub trait ErrorTracker: Send + Sync {
    fn capture(&self, error: &(dyn std::error::Error + 'static), context: serde_json::Value);
}

/// Notifier that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        tracing::info!(
            category = %notification.category,
            title = notification.title.as_deref().unwrap_or(""),
            "{}",
            notification.message
        );
    }
}

/// Error tracker that logs at error level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorTracker;

impl ErrorTracker for TracingErrorTracker {
    fn capture(&self, error: &(dyn std::error::Error + 'static), context: serde_json::Value) {
        tracing::error!(%context, "unexpected media import error: {}", error);
    }
}
