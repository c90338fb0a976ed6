use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

/// Liveness and storage check. Needs no authentication.
///
/// `200` with `"status": "ok"` while the store answers, `503` with `"status": "unavailable"`
/// otherwise. The storage error itself is only logged.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    let (mut response, status) = match state.store.ping().await {
        Ok(()) => (HttpResponse::Ok(), "ok"),
        Err(e) => {
            log::error!("health check: store unreachable: {}", e);
            (HttpResponse::ServiceUnavailable(), "unavailable")
        }
    };

    response.json(json!({
        "status": status,
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now()
    }))
}
