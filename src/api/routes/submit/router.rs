//! Router for the email submission API

use axum::{
    Form, Json, Router,
    extract::{FromRequest, Request, State, rejection::JsonRejection},
};
use http::header::CONTENT_TYPE;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::SharedState;

/// Accepts the submission as either JSON or a urlencoded form post.
struct SubmitPayload(public::SubmitEmailRequest);

impl<S> FromRequest<S> for SubmitPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        let body = if is_form {
            Form::<public::SubmitEmailRequest>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .map_err(|rejection| {
                    tracing::debug!("Rejected form body: {}", rejection);
                    ApiError::BadRequest("Invalid request body".to_string())
                })?
        } else {
            match Json::<public::SubmitEmailRequest>::from_request(req, state).await {
                Ok(Json(body)) => body,
                // Bodies we can't identify are read as empty
                Err(JsonRejection::MissingJsonContentType(_)) => {
                    public::SubmitEmailRequest { email: None }
                }
                Err(rejection) => {
                    tracing::debug!("Rejected json body: {}", rejection);
                    return Err(ApiError::BadRequest("Invalid request body".to_string()));
                }
            }
        };

        Ok(Self(body))
    }
}

async fn submit_email_handler(
    State(state): State<SharedState>,
    SubmitPayload(req): SubmitPayload,
) -> Result<Json<public::SubmitEmailResponse>, ApiError> {
    let email = req.email.unwrap_or_default();
    let submitted = state.intake.submit(&email).await?;

    Ok(Json(public::SubmitEmailResponse::success(submitted.message)))
}

/// Create the submit router
pub fn router() -> Router<SharedState> {
    Router::new().route("/submit-email", axum::routing::post(submit_email_handler))
}
