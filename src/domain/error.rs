//! Domain error types.

/// Top-level error type for pricestore.
#[derive(Debug, thiserror::Error)]
pub enum PriceStoreError {
    #[error("failed to enumerate datasets in {dir}: {reason}")]
    Discovery { dir: String, reason: String },

    #[error("line {line}: invalid {field} value {value:?}: {reason}")]
    MalformedField {
        line: usize,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to load CSV datasets")]
    LoadFailed {
        #[source]
        source: Box<PriceStoreError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PriceStoreError {
    pub fn load_failed(source: PriceStoreError) -> Self {
        PriceStoreError::LoadFailed {
            source: Box::new(source),
        }
    }

    /// Error at the bottom of a `LoadFailed` wrapper, or `self` if unwrapped.
    pub fn root_cause(&self) -> &PriceStoreError {
        match self {
            PriceStoreError::LoadFailed { source } => source.root_cause(),
            other => other,
        }
    }

    /// Message with the full cause chain, `outer: inner: ...`.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut current: Option<&dyn std::error::Error> = std::error::Error::source(self);
        while let Some(err) = current {
            out.push_str(": ");
            out.push_str(&err.to_string());
            current = err.source();
        }
        out
    }
}

impl From<&PriceStoreError> for std::process::ExitCode {
    fn from(err: &PriceStoreError) -> Self {
        let code: u8 = match err.root_cause() {
            PriceStoreError::Io(_) => 1,
            PriceStoreError::ConfigParse { .. }
            | PriceStoreError::ConfigMissing { .. }
            | PriceStoreError::ConfigInvalid { .. } => 2,
            PriceStoreError::Database { .. } | PriceStoreError::DatabaseQuery { .. } => 3,
            PriceStoreError::MalformedField { .. } => 4,
            PriceStoreError::Discovery { .. } => 5,
            PriceStoreError::LoadFailed { .. } => 1,
        };
        std::process::ExitCode::from(code)
    }
}
