use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::performance::Performance;

pub const PROMO_START: &str = "9:00 AM PT";
pub const PROMO_END: &str = "11:59 PM PT";

/// Hand-off record between the score checker and the email dispatcher.
///
/// Only `alert_needed` is mandatory when reading, so a file edited by hand
/// (or left behind by an older run) still loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    pub alert_needed: bool,
    #[serde(default)]
    pub performances: Vec<Performance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_window: Option<PromoWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleared_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoWindow {
    pub start: String,
    pub end: String,
}

impl Default for PromoWindow {
    fn default() -> Self {
        Self {
            start: String::from(PROMO_START),
            end: String::from(PROMO_END),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AlertStateError {
    #[error("Failed to access the alert state file {path}.")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("The alert state file {path} does not contain valid JSON.")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl AlertState {
    pub fn from_check(performances: Vec<Performance>, check_date: NaiveDate) -> Self {
        Self {
            alert_needed: !performances.is_empty(),
            performances,
            check_date: Some(check_date),
            checked_at: Some(Utc::now()),
            promo_window: Some(PromoWindow::default()),
            cleared_at: None,
        }
    }

    /// State written once the alert went out, so a second run of the
    /// dispatcher on the same morning sends nothing.
    pub fn cleared() -> Self {
        Self {
            cleared_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// A missing file means the checker never ran, which is the same as
    /// "nothing to send".
    pub fn load(path: &Path) -> Result<Self, AlertStateError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Alert state file {} not found", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(AlertStateError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| AlertStateError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), AlertStateError> {
        let io_error = |source| AlertStateError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(|source| AlertStateError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        std::fs::write(path, content).map_err(io_error)?;

        tracing::info!("Alert state saved to {}", path.display());

        Ok(())
    }
}
