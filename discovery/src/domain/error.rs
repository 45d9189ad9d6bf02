//! Domain-level error types.
//!
//! These errors are transport agnostic. Callers at the UI boundary map them
//! to empty/error states, sign-in prompts, or "not found" views; none of them
//! is fatal to the process.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure category shared by every domain operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The remote property collection could not answer a query.
    QueryFailure,
    /// The route did not resolve to an identifier, or no record matched it.
    NotFound,
    /// A favorite toggle was attempted without a signed-in user.
    Unauthenticated,
    /// The remote favorites store rejected an add or remove.
    FavoriteSyncFailure,
    /// The caller supplied filters or a listing that failed validation.
    InvalidRequest,
    /// Another operation on the same resource is still in flight.
    Conflict,
    /// A failure with no better category, such as a missing runtime.
    InternalError,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use discovery::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::NotFound, "missing");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// Reasons [`Error::try_new`] refuses a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The message was empty after trimming.
    #[error("error message must not be empty")]
    EmptyMessage,
}

const FALLBACK_MESSAGE: &str = "unspecified error";

impl Error {
    /// Create a new error, substituting a generic message when the supplied
    /// one is blank.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(ErrorValidationError::EmptyMessage) => Self {
                code,
                message: FALLBACK_MESSAGE.to_owned(),
                details: None,
            },
        }
    }

    /// Construct an error, rejecting a blank message.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    /// Failure category.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach machine-readable context, such as the offending field.
    ///
    /// # Examples
    /// ```
    /// use discovery::domain::{Error, ErrorCode};
    /// use serde_json::json;
    ///
    /// let err = Error::new(ErrorCode::InvalidRequest, "bad")
    ///     .with_details(json!({ "field": "priceRange" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

macro_rules! code_constructors {
    ($($name:ident => $code:ident),* $(,)?) => {
        impl Error {
            $(
                #[doc = concat!("Shorthand for an [`ErrorCode::", stringify!($code), "`] error.")]
                pub fn $name(message: impl Into<String>) -> Self {
                    Self::new(ErrorCode::$code, message)
                }
            )*
        }
    };
}

code_constructors! {
    query_failure => QueryFailure,
    not_found => NotFound,
    unauthenticated => Unauthenticated,
    favorite_sync_failure => FavoriteSyncFailure,
    invalid_request => InvalidRequest,
    conflict => Conflict,
    internal => InternalError,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
            details: value.details,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        let ErrorDto {
            code,
            message,
            details,
        } = value;

        let mut error = Error::try_new(code, message)?;
        error.details = details;
        Ok(error)
    }
}

#[cfg(test)]
mod tests;
