use thiserror::Error;

/// Failure of a single submission, in one of three kinds.
///
/// Every kind ends up as one user-visible message in the result panel;
/// `user_message` performs that mapping.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A local precondition was not met. Never reaches the network layer.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    /// Non-success response or transport failure from the remote service.
    /// Carries the server-supplied detail when one was present.
    #[error("{0}")]
    Remote(String),
}

impl SearchError {
    pub fn validation(message: impl Into<String>) -> Self {
        SearchError::Validation(message.into())
    }

    pub fn remote(message: impl Into<String>) -> Self {
        SearchError::Remote(message.into())
    }

    /// The message shown in the result panel for this failure.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::Validation(msg) | SearchError::Remote(msg) => msg.clone(),
            SearchError::Geolocation(_) => {
                "Could not get your location. Please enable location services.".to_string()
            }
        }
    }
}

/// Failure of the platform position capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    /// The platform exposes no position capability at all.
    #[error("location capability unavailable")]
    Unavailable,

    /// The capability exists but the request was denied, timed out or
    /// otherwise failed.
    #[error("location request denied or failed")]
    DeniedOrFailed,
}
