//! Route registration

pub mod auth;
pub mod public;
pub mod users;

use actix_web::web;

/// Register all routes on the application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/logout", web::post().to(auth::logout)),
            )
            .service(
                web::scope("/users")
                    .route("/me", web::get().to(users::me))
                    .route("", web::get().to(users::list)),
            )
            .route("/hello", web::get().to(public::hello))
            .route("/health", web::get().to(public::health))
            .route("/info", web::get().to(public::info)),
    );
}
