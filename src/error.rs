use thiserror::Error;

/// Errors raised while building or scoring the network
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    /// An attribute payload is missing a dimension, has an unknown one, or is out of range
    #[error("invalid attributes for {name}: {reason}")]
    InvalidAttributes { name: String, reason: String },

    /// No people were supplied
    #[error("cannot build a network with zero people")]
    EmptyPopulation,

    /// An attribute vector has zero magnitude, so no angle exists
    #[error("attribute vector has zero magnitude")]
    DegenerateVector,

    /// A community detection algorithm name that is not implemented
    #[error("unsupported community algorithm '{0}'")]
    UnsupportedAlgorithm(String),
}

impl NetworkError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        NetworkError::InvalidAttributes {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;
