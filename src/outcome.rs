use crate::error::ApiError;

/// The normalized result of a remote call. On failure `payload` holds its
/// empty form, so callers only need to look at `success`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub success: bool,
    pub message: String,
    pub payload: T,
    pub error: Option<ApiError>,
}

impl<T> Outcome<T> {
    pub fn succeeded(message: impl Into<String>, payload: T) -> Self {
        Outcome {
            success: true,
            message: message.into(),
            payload,
            error: None,
        }
    }

    /// Re-derives a failure from `success`, whether or not the client recorded a cause.
    pub fn as_result(&self) -> Result<&T, ApiError> {
        if self.success {
            return Ok(&self.payload);
        }
        Err(self
            .error
            .clone()
            .unwrap_or_else(|| ApiError::Rejected(self.message.clone())))
    }

    pub fn into_result(self) -> Result<T, ApiError> {
        if self.success {
            return Ok(self.payload);
        }
        Err(self.error.unwrap_or(ApiError::Rejected(self.message)))
    }
}

impl<T: Default> Outcome<T> {
    pub fn failed(error: ApiError) -> Self {
        Outcome {
            success: false,
            message: error.message().to_string(),
            payload: T::default(),
            error: Some(error),
        }
    }
}
