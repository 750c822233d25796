#[macro_use]
extern crate diesel;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use diesel::{prelude::*, r2d2};

mod actions;
mod availability;
mod config;
mod error;
mod handlers;
mod models;
mod schema;

type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = config::Config::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    // initialize DB pool outside of `HttpServer::new` so that it is shared across all workers
    let pool = initialize_db_pool(&config)?;

    log::info!("starting HTTP server at http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            // add DB pool handle to app data; enables use of `web::Data<DbPool>` extractor
            .app_data(web::Data::new(pool.clone()))
            .app_data(handlers::json_config())
            .wrap(middleware::Logger::default())
            .wrap(Cors::permissive())
            .configure(handlers::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

fn initialize_db_pool(config: &config::Config) -> std::io::Result<DbPool> {
    let manager = r2d2::ConnectionManager::<PgConnection>::new(config.database_url.as_str());
    r2d2::Pool::builder()
        .max_size(config.db_pool_size)
        .build(manager)
        .map_err(|e| {
            log::error!("Failed to create database pool: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e)
        })
}
