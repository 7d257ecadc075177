use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailprobeError {
    #[error("missing required field: {field}")]
    InvalidRequest { field: String },

    #[error("API key not configured. Set APILAYER_API_KEY in the environment")]
    MisconfiguredCredential,

    #[error("provider returned {status} for {email}")]
    Provider { email: String, status: u16 },

    #[error("request for {email} could not complete: {source}")]
    Transport {
        email: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("configuration error: {field}: {reason}")]
    Config { field: String, reason: String },

    #[error("{message}")]
    Internal { message: String },
}

impl MailprobeError {
    /// Provider and transport failures are scoped to a single candidate
    /// email; everything else aborts the whole request.
    pub fn is_per_candidate(&self) -> bool {
        matches!(
            self,
            MailprobeError::Provider { .. } | MailprobeError::Transport { .. }
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        MailprobeError::Internal {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MailprobeError>;
