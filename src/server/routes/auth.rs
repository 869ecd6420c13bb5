//! Authentication endpoints: register, login, logout

use crate::auth::NewUser;
use crate::server::state::AppState;
use crate::utils::error::GateError;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Registration request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token response returned by register and login
#[derive(Debug, Serialize)]
pub struct JwtResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    let body = body.into_inner();
    let record = state
        .directory
        .register(NewUser {
            name: body.name,
            email: body.email,
            password: body.password,
            phone: body.phone,
        })
        .await?;

    let token = state.auth.issue_session(&record.email, record.role).await?;
    state.auth.record_user_index(&record.email, record.id).await?;

    info!(email = %record.email, "user registered");
    Ok(HttpResponse::Created().json(JwtResponse {
        token,
        token_type: "Bearer".to_string(),
        id: record.id,
        email: record.email,
        name: record.name,
        role: record.role.to_string(),
    }))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    let record = state
        .directory
        .verify_credentials(&body.email, &body.password)
        .await?
        .ok_or(GateError::Unauthorized)?;

    let token = state.auth.issue_session(&record.email, record.role).await?;
    state.auth.record_user_index(&record.email, record.id).await?;

    info!(email = %record.email, "user logged in");
    Ok(HttpResponse::Ok().json(JwtResponse {
        token,
        token_type: "Bearer".to_string(),
        id: record.id,
        email: record.email,
        name: record.name,
        role: record.role.to_string(),
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, actix_web::Error> {
    if let Some(token) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        state.auth.revoke(token).await;
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Logged out successfully"
    })))
}
