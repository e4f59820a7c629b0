mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod utils;

use actix_web::middleware::{Logger, NormalizePath, TrailingSlash};
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::info;

use crate::config::AppConfig;
use crate::db::EmployeeStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load()?;

    // Initialize the employee store
    let store: web::Data<dyn EmployeeStore> = web::Data::from(db::connect(&config).await?);
    let settings = web::Data::new(config.clone());

    info!("Starting server at {}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::new(TrailingSlash::Always))
            .wrap(Logger::default())
            .app_data(store.clone())
            .app_data(settings.clone())
            .configure(handlers::configure)
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await?;

    Ok(())
}
