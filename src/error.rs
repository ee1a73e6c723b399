use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReviewError>;

/// Underlying cause kept behind a [`ReviewError`].
pub type Source = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything that can go wrong between reading the source and writing the report.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Missing or invalid mode, provider, credential, model, or config/template file.
    #[error("configuration error: {msg}")]
    Config {
        msg: String,
        #[source]
        source: Option<Source>,
    },

    /// Transport failure, non-success HTTP status, or a response we could not read.
    #[error("provider error: {msg}")]
    Provider {
        msg: String,
        #[source]
        source: Option<Source>,
    },

    /// The source to review could not be read.
    #[error("input error: {msg}")]
    Input {
        msg: String,
        #[source]
        source: Option<Source>,
    },

    /// The report could not be written.
    #[error("output error: {msg}")]
    Output {
        msg: String,
        #[source]
        source: Option<Source>,
    },
}

impl ReviewError {
    pub fn config(msg: impl Into<String>) -> Self {
        ReviewError::Config {
            msg: msg.into(),
            source: None,
        }
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        ReviewError::Provider {
            msg: msg.into(),
            source: None,
        }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        ReviewError::Input {
            msg: msg.into(),
            source: None,
        }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        ReviewError::Output {
            msg: msg.into(),
            source: None,
        }
    }

    /// Attach the lower-level error that caused this one.
    pub fn with_source(mut self, cause: impl Into<Source>) -> Self {
        let slot = match &mut self {
            ReviewError::Config { source, .. }
            | ReviewError::Provider { source, .. }
            | ReviewError::Input { source, .. }
            | ReviewError::Output { source, .. } => source,
        };
        *slot = Some(cause.into());
        self
    }
}
