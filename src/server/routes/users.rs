//! Protected sample endpoints exercising the request identity
//!
//! The real entity CRUD lives behind the user directory collaborator; these
//! handlers exist to demonstrate the RequestContext and role contract.

use crate::auth::Role;
use crate::server::middleware::request_context;
use crate::server::state::AppState;
use crate::utils::error::GateError;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct UserSummary {
    id: i64,
    name: String,
    email: String,
    phone: Option<String>,
    role: String,
}

/// GET /api/users/me
pub async fn me(req: HttpRequest) -> Result<HttpResponse, actix_web::Error> {
    let ctx = request_context(&req)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "subject": ctx.subject,
        "role": ctx.role.to_string(),
    })))
}

/// GET /api/users (admin only)
pub async fn list(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, actix_web::Error> {
    let ctx = request_context(&req)?;
    if ctx.role != Role::Admin {
        return Err(GateError::Forbidden.into());
    }

    let users: Vec<UserSummary> = state
        .directory
        .list()
        .await?
        .into_iter()
        .map(|r| UserSummary {
            id: r.id,
            name: r.name,
            email: r.email,
            phone: r.phone,
            role: r.role.to_string(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "count": users.len(),
        "users": users,
    })))
}
