//! Admission middleware
//!
//! Runs the request pipeline before dispatch. Rejected requests never reach
//! the inner service; the pipeline's decision maps to a `GateError` whose
//! `ResponseError` impl renders the wire body.

use crate::auth::RequestContext;
use crate::pipeline::Decision;
use crate::server::state::AppState;
use crate::utils::error::GateError;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header;
use actix_web::{HttpMessage, HttpRequest, ResponseError, web};
use futures::future::{Ready, ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use tracing::error;

/// Gate chain middleware for Actix-web
pub struct GateChain;

impl<S, B> Transform<S, ServiceRequest> for GateChain
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = GateChainService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GateChainService {
            service: Rc::new(service),
        }))
    }
}

/// Service implementation for the gate chain middleware
pub struct GateChainService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for GateChainService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let path = req.path().to_string();
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(String::from);
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let Some(state) = state else {
                // Misassembled app: never dispatch ungated
                error!("AppState not registered, refusing to dispatch");
                return Ok(reject(req, &GateError::internal("admission state missing")));
            };

            match state
                .pipeline
                .evaluate(&path, authorization.as_deref())
                .await
            {
                Decision::RateLimited => Ok(reject(req, &GateError::RateLimitExceeded)),
                Decision::Unauthorized => Ok(reject(req, &GateError::Unauthorized)),
                Decision::Dispatch(ctx) => {
                    if let Some(ctx) = ctx {
                        req.extensions_mut().insert(ctx);
                    }
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
            }
        })
    }
}

/// Short-circuit the request with the error's wire response.
fn reject<B>(req: ServiceRequest, error: &GateError) -> ServiceResponse<EitherBody<B>> {
    let (req, _payload) = req.into_parts();
    let response = error.error_response().map_into_right_body();
    ServiceResponse::new(req, response)
}

/// Extract the request identity attached by the gate chain.
pub fn request_context(req: &HttpRequest) -> Result<RequestContext, actix_web::Error> {
    req.extensions()
        .get::<RequestContext>()
        .cloned()
        .ok_or_else(|| GateError::Unauthorized.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};

    #[actix_web::test]
    async fn test_missing_state_fails_closed() {
        // An app wrapped in the gate chain but missing its AppState must not
        // serve any route ungated.
        let app = test::init_service(
            App::new()
                .wrap(GateChain)
                .route("/api/hello", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/hello").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
