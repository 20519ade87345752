use thiserror::Error;

/// Main error type for Hemisphair
#[derive(Error, Debug)]
pub enum HemisphairError {
    /// The generate endpoint answered with a non-2xx status
    #[error("Endpoint error ({status}): {body}")]
    Endpoint { status: u16, body: String },

    /// A line of the response stream was not a valid generate record
    #[error("Malformed stream record {line:?}: {source}")]
    MalformedStream {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),
}

impl HemisphairError {
    /// HTTP status carried by an endpoint failure
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Endpoint { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HemisphairError>;
