use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use diesel_migrations::MigrationHarness;
use env_logger::Env;

use quiz_bank::MIGRATIONS;
use quiz_bank::auth::TokenIssuer;
use quiz_bank::db::establish_connection_pool;
use quiz_bank::error_log::ErrorLog;
use quiz_bank::image_host::{CloudinaryImageHost, ImageHost};
use quiz_bank::models::config::ServerConfig;
use quiz_bank::repository::DieselRepository;
use quiz_bank::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if server_config.production && server_config.jwt_secret == "change-me" {
        log::warn!("Running in production with the default JWT secret");
    }

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    match pool.get() {
        Ok(mut conn) => {
            if let Err(e) = conn.run_pending_migrations(MIGRATIONS) {
                log::error!("Failed to run database migrations: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            log::error!("Failed to get a connection for migrations: {e}");
            std::process::exit(1);
        }
    }

    let repo = web::Data::new(DieselRepository::new(pool));
    let issuer = web::Data::new(TokenIssuer::new(
        server_config.jwt_secret.as_bytes(),
        server_config.token_ttl_secs,
    ));
    let image_host: web::Data<dyn ImageHost> = web::Data::from(
        Arc::new(CloudinaryImageHost::new(server_config.cloudinary.clone())) as Arc<dyn ImageHost>,
    );
    let error_log = web::Data::new(ErrorLog::new(&server_config.error_log_dir));

    let address = server_config.address.clone();
    let port = server_config.port;
    let cors_origin = server_config.cors_origin.clone();
    let server_config = web::Data::new(server_config);

    log::info!("Starting server at http://{address}:{port}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(repo.clone())
            .app_data(issuer.clone())
            .app_data(image_host.clone())
            .app_data(error_log.clone())
            .app_data(server_config.clone())
            .configure(routes::configure)
    })
    .bind((address.as_str(), port))?
    .run()
    .await
}
