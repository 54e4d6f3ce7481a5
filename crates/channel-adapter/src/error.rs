use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("action '{0}' is not supported for mattermost")]
    UnsupportedAction(String),

    #[error("mattermost API error: {message}")]
    RemoteApi {
        /// HTTP status, absent for transport and decode failures.
        status: Option<u16>,
        message: String,
    },
}

impl ActionError {
    pub(crate) fn missing(field: &str) -> Self {
        ActionError::Validation(format!("{} required", field))
    }

    pub(crate) fn transport(op: &str, err: reqwest::Error) -> Self {
        ActionError::RemoteApi {
            status: None,
            message: format!("{} failed: {}", op, err),
        }
    }

    pub(crate) fn decode(op: &str, err: impl std::fmt::Display) -> Self {
        ActionError::RemoteApi {
            status: None,
            message: format!("{} parse: {}", op, err),
        }
    }

    /// HTTP status of a rejected remote call, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ActionError::RemoteApi { status, .. } => *status,
            _ => None,
        }
    }
}
