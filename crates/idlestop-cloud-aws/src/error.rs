//! AWS provider error types

use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata};
use idlestop_cloud::CloudError;
use thiserror::Error;

/// Error codes AWS returns for credential or permission problems
const AUTH_ERROR_CODES: &[&str] = &[
    "AuthFailure",
    "UnauthorizedOperation",
    "AccessDenied",
    "AccessDeniedException",
    "ExpiredToken",
    "InvalidClientTokenId",
    "SignatureDoesNotMatch",
];

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("{service} authentication failed: {message}")]
    Authentication {
        service: &'static str,
        message: String,
    },

    #[error("{service} API error: {message}")]
    Api {
        service: &'static str,
        message: String,
    },
}

impl AwsError {
    /// Classify an SDK failure by its error code
    pub fn from_sdk<E>(service: &'static str, err: E) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    {
        let code = err.code().map(str::to_string);
        let message = DisplayErrorContext(err).to_string();

        if code.as_deref().is_some_and(is_auth_code) {
            AwsError::Authentication { service, message }
        } else {
            AwsError::Api { service, message }
        }
    }
}

pub(crate) fn is_auth_code(code: &str) -> bool {
    AUTH_ERROR_CODES.contains(&code)
}

impl From<AwsError> for CloudError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::Authentication { .. } => CloudError::AuthenticationFailed(err.to_string()),
            AwsError::Api { .. } => CloudError::ApiError(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;
