use thiserror::Error;

/// Telephony boundary errors
#[derive(Error, Debug)]
pub enum Error {
    /// Errors from the admin core (validation, store, configuration)
    #[error(transparent)]
    Core(#[from] callcenter_admin_core::Error),

    /// Transport-level failure talking to the provider
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider rejected request ({status}): {message}")]
    Rejected {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    /// TwiML document could not be produced
    #[error("TwiML error: {0}")]
    Twiml(String),
}

impl Error {
    /// Create a new TwiML error
    pub fn twiml<S: Into<String>>(msg: S) -> Self {
        Self::Twiml(msg.into())
    }

    /// Whether the caller is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_client_error())
    }
}

/// Result type for telephony operations
pub type Result<T> = std::result::Result<T, Error>;
