//! Public endpoints: hello, health, info

use actix_web::HttpResponse;

/// GET /api/hello
pub async fn hello() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Hello from apigate",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /api/health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "UP"
    }))
}

/// GET /api/info
pub async fn info() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "app": crate::NAME,
        "version": crate::VERSION,
        "description": crate::DESCRIPTION,
    }))
}
