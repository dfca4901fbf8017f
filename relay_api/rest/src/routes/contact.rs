use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use relay_core_contact_contracts::ContactFeatureService;
use relay_models::contact::DeliveryOutcome;
use tracing::debug;

use crate::models::contact::{ApiContactRequest, ApiContactResponse};

pub fn router(service: Arc<impl ContactFeatureService>) -> Router<()> {
    Router::new()
        .route("/contact", routing::post(send_message))
        .with_state(service)
}

async fn send_message(
    service: State<Arc<impl ContactFeatureService>>,
    payload: Result<Json<ApiContactRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return (StatusCode::BAD_REQUEST, Json(ApiContactResponse::too_large())).into_response()
        }
        Err(rejection) => {
            debug!("invalid contact request body: {rejection}");
            return (StatusCode::BAD_REQUEST, Json(ApiContactResponse::invalid_body()))
                .into_response();
        }
    };

    match service.send_message(request.into()).await {
        DeliveryOutcome::Delivered => Json(ApiContactResponse::success()).into_response(),
        DeliveryOutcome::Rejected(reason) => (
            StatusCode::BAD_REQUEST,
            Json(ApiContactResponse::rejected(reason)),
        )
            .into_response(),
        // Already logged by the contact feature, details stay on the server.
        DeliveryOutcome::TransientFailure(_) | DeliveryOutcome::PermanentFailure(_) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiContactResponse::failure()),
        )
            .into_response(),
    }
}
