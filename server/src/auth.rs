//! Bearer-token gate for protected handlers.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use platform_api::ApiError;
use platform_authn::{AuthError, authenticate};
use tracing::warn;

use crate::http::AppState;

const NOT_PROVIDED: &str = "Authentication credentials were not provided.";
const INVALID_TOKEN: &str = "Given token not valid for any token type";

/// The authenticated caller. Taking this as a handler argument makes the
/// route require a valid access token.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub subject: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        match authenticate(header, &state.auth) {
            Ok(principal) => {
                let user = CurrentUser {
                    subject: principal.subject,
                };
                parts.extensions.insert(user.clone());
                Ok(user)
            }
            Err(err @ (AuthError::MissingCredentials | AuthError::MalformedHeader)) => {
                warn!(error = %err, uri = %parts.uri, "request without bearer credentials");
                Err(ApiError::unauthorized(NOT_PROVIDED))
            }
            Err(err) => {
                warn!(error = %err, uri = %parts.uri, "bearer token rejected");
                Err(ApiError::unauthorized(INVALID_TOKEN))
            }
        }
    }
}
