use actix_web::body::BoxBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::warn;

use crate::config::Config;

pub const API_KEY_HEADER: &str = "x-api-key";

/// API-key gate for the `/pdf` scope. A service without a configured key is
/// misconfigured and answers 500 rather than silently serving unauthenticated
/// requests.
pub async fn require_api_key(
    req: ServiceRequest,
    next: Next<impl actix_web::body::MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    let configured = req
        .app_data::<web::Data<Config>>()
        .and_then(|config| config.api_key.clone());

    let Some(expected) = configured else {
        warn!("api key is not configured; refusing pdf request");
        let response = HttpResponse::InternalServerError()
            .json(json!({ "error": "Server misconfigured: api key is required" }));
        return Ok(req.into_response(response));
    };

    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if provided != Some(expected.as_str()) {
        let response = HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }));
        return Ok(req.into_response(response));
    }

    next.call(req).await.map(|res| res.map_into_boxed_body())
}
