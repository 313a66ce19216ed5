pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;
pub mod state;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};
pub use state::AppState;

use crate::errors::AppError;
use crate::handlers::{clients, invoices, products};
use crate::openapi::ApiDoc;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Registers the API routes. Extractor failures answer with the same
/// `{"error": ...}` body as handler errors.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/clients")
            .service(
                web::resource("")
                    .route(web::post().to(clients::create_client))
                    .route(web::get().to(clients::list_clients)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(clients::get_client))
                    .route(web::put().to(clients::update_client))
                    .route(web::delete().to(clients::delete_client)),
            )
            .route("/{id}/receivable", web::get().to(clients::receivable_balance)),
    )
    .service(
        web::scope("/products")
            .service(
                web::resource("")
                    .route(web::post().to(products::create_product))
                    .route(web::get().to(products::list_products)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(products::get_product))
                    .route(web::put().to(products::update_product))
                    .route(web::delete().to(products::delete_product)),
            ),
    )
    .service(
        web::scope("/invoices")
            .service(
                web::resource("")
                    .route(web::post().to(invoices::create_invoice))
                    .route(web::get().to(invoices::list_invoices)),
            )
            // Must precede `/{id}`.
            .route("/next-bill-number", web::get().to(invoices::next_bill_number))
            .service(
                web::resource("/{id}")
                    .route(web::get().to(invoices::get_invoice))
                    .route(web::put().to(invoices::update_invoice))
                    .route(web::delete().to(invoices::delete_invoice)),
            ),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let openapi = ApiDoc::openapi();
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
