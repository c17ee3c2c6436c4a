//! JSON request bodies with API-shaped rejections.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use tracing::debug;

use crate::error::AppError;

/// `Json<T>` whose rejections become `400 {"errors": ...}`.
///
/// The client sees a short description of what was wrong with the body;
/// the deserializer's own message only goes to the debug log.
pub struct ApiJson<T>(pub T);

fn rejection_message(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::JsonDataError(_) => "Request body has missing or invalid fields",
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
        JsonRejection::MissingJsonContentType(_) => "Expected a request body with Content-Type: application/json",
        _ => "Request body could not be read",
    }
}

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                debug!("Rejected request body: {}", rejection.body_text());
                Err(AppError::BadRequest(rejection_message(&rejection).to_string()))
            }
        }
    }
}
