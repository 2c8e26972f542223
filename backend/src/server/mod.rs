//! Server assembly: route table, adapter wiring, and the run loop.

pub mod config;

pub use config::{ConfigError, ServerConfig};

use std::sync::Arc;

use actix_web::{web, App, HttpServer};

use crate::doc;
use crate::inbound::http::{books, health, pages, users, validation, HttpState, JwtCodec};
use crate::middleware::Trace;
use crate::outbound::persistence::migrations;
use crate::outbound::{
    Argon2PasswordHasher, DbPool, DieselBookRepository, DieselUserRepository, PasswordLoginService,
    PoolConfig,
};

/// Register the API routes and shared data on a service config.
///
/// Shared between [`run`] and the handler tests so both serve exactly the
/// same route table.
pub fn configure_api(
    state: HttpState,
    codec: JwtCodec,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(state))
            .app_data(web::Data::new(codec))
            .app_data(web::JsonConfig::default().error_handler(validation::json_error_handler))
            .service(
                web::scope("/api/v1")
                    .service(
                        web::resource("/books")
                            .route(web::get().to(books::list))
                            .route(web::post().to(books::create)),
                    )
                    .service(
                        web::resource("/books/{uuid}")
                            .route(web::get().to(books::retrieve))
                            .route(web::patch().to(books::update))
                            .route(web::delete().to(books::remove)),
                    )
                    .service(
                        web::resource("/pages")
                            .route(web::get().to(pages::list))
                            .route(web::post().to(pages::create)),
                    )
                    .service(
                        web::resource("/pages/{uuid}")
                            .route(web::get().to(pages::retrieve))
                            .route(web::patch().to(pages::update))
                            .route(web::delete().to(pages::remove)),
                    )
                    .service(web::resource("/users").route(web::post().to(users::register)))
                    .service(
                        web::resource("/users/me")
                            .route(web::get().to(users::me))
                            .route(web::patch().to(users::update_me))
                            .route(web::delete().to(users::delete_me)),
                    )
                    .service(web::resource("/auth/token").route(web::post().to(users::token)))
                    .service(web::resource("/openapi.json").route(web::get().to(doc::openapi))),
            )
            .service(web::resource("/healthz/live").route(web::get().to(health::live)))
            .service(web::resource("/healthz/ready").route(web::get().to(health::ready)));
    }
}

/// Run migrations, wire the adapters, and serve until shutdown.
///
/// # Errors
///
/// Returns an error when migrations fail, the pool cannot be built, or the
/// listener cannot bind.
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let database_url = config.database_url.clone();
    tokio::task::spawn_blocking(move || migrations::run_pending_migrations(&database_url))
        .await
        .map_err(std::io::Error::other)?
        .map_err(std::io::Error::other)?;

    let pool = DbPool::new(
        PoolConfig::new(config.database_url.clone()).with_max_size(config.pool_size),
    )
    .await
    .map_err(std::io::Error::other)?;

    let books = Arc::new(DieselBookRepository::new(pool.clone()));
    let users = Arc::new(DieselUserRepository::new(pool));
    let hasher = Arc::new(Argon2PasswordHasher);
    let login = Arc::new(PasswordLoginService::new(users.clone(), hasher.clone()));
    let state = HttpState::new(books, users, login, hasher);
    let codec = JwtCodec::new(config.jwt_secret.as_bytes(), config.jwt_ttl);

    tracing::info!(bind_addr = %config.bind_addr, "starting http server");
    HttpServer::new(move || {
        App::new()
            .wrap(Trace)
            .configure(configure_api(state.clone(), codec.clone()))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
