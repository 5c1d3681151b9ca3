use std::time::Instant;

use actix_cors::Cors;
use actix_web::body::BoxBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::{from_fn, DefaultHeaders, Next};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::{error, info};

use crate::models::TableRequest;
use crate::pdf::{PageSetup, PdfEngine};
use crate::render::build_table_html;

mod auth;

pub use auth::{require_api_key, API_KEY_HEADER};

/// Maximum accepted JSON payload.
pub const JSON_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Origin allowlist check: exact matches from configuration plus any
/// `*.vercel.app` preview frontend.
pub fn is_allowed_origin(origin: &str, allowlist: &[String]) -> bool {
    if allowlist.iter().any(|allowed| allowed == origin) {
        return true;
    }
    origin.ends_with(".vercel.app")
}

/// Hardening headers stamped on every response.
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .add((header::X_FRAME_OPTIONS, "SAMEORIGIN"))
        .add((header::REFERRER_POLICY, "no-referrer"))
}

pub fn cors(allowed_origins: &[String]) -> Cors {
    let allowlist = allowed_origins.to_vec();
    Cors::default()
        .allowed_origin_fn(move |origin, _req_head| {
            origin
                .to_str()
                .map(|origin| is_allowed_origin(origin, &allowlist))
                .unwrap_or(false)
        })
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            header::CONTENT_TYPE,
            header::HeaderName::from_static(API_KEY_HEADER),
        ])
        .max_age(600)
}

/// Request log line for the `/pdf` scope: method, path, status, duration.
pub async fn log_pdf_request(
    req: ServiceRequest,
    next: Next<impl actix_web::body::MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    let method = req.method().clone();
    let path = req.path().to_owned();
    let start = Instant::now();

    let res = next.call(req).await.map(|res| res.map_into_boxed_body())?;

    info!(
        %method,
        path,
        status = res.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "pdf request"
    );
    Ok(res)
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub async fn render_table(
    request: web::Json<TableRequest>,
    engine: web::Data<dyn PdfEngine>,
) -> HttpResponse {
    let request = request.into_inner();

    if let Err(details) = request.validate() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Invalid request body",
            "details": details,
        }));
    }

    let html = build_table_html(&request);
    let setup = PageSetup::for_direction(request.rtl);

    match engine.render_pdf(&html, &setup).await {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header((
                header::CONTENT_DISPOSITION,
                "inline; filename=\"table.pdf\"",
            ))
            .body(bytes),
        Err(e) => {
            error!("PDF render failed: {e}");
            HttpResponse::InternalServerError().json(json!({ "error": "Failed to generate PDF" }))
        }
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(
            web::scope("/pdf")
                .wrap(from_fn(require_api_key))
                .wrap(from_fn(log_pdf_request))
                .route("/table", web::post().to(render_table)),
        );
}
