use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use taskvault::config::Config;
use taskvault::routes;
use taskvault::state::AppState;
use taskvault::store::{MemoryStore, PgStore, Store};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    log::debug!("{:?}", config);

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await.map_err(io_error)?;
            store.migrate().await.map_err(io_error)?;
            log::info!("connected to postgres, migrations applied");
            Arc::new(store)
        }
        None => {
            log::warn!("DATABASE_URL is not set; using the in-memory store, data will not persist");
            Arc::new(MemoryStore::new())
        }
    };

    let state = web::Data::new(AppState::new(&config, store));

    log::info!("Starting TaskVault server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}

fn io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}
