use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};

use employee_records::config::{Config, StoreKind};
use employee_records::db::{self, EmployeeStore, MemoryStore, PgEmployeeStore};
use employee_records::errors::AppError;
use employee_records::handlers;
use employee_records::models::EmployeeModel;

async fn serve<S: EmployeeStore>(config: &Config, store: S) -> std::io::Result<()> {
    let model = web::Data::new(EmployeeModel::new(store));

    info!("Server is running on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(model.clone())
            .configure(handlers::employee::configure::<S>)
    })
    .bind(config.bind_address())?
    .run()
    .await
}

async fn connect(config: &Config) -> Result<PgEmployeeStore, AppError> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::Config("DATABASE_URL must be set".to_string()))?;
    let pool = db::create_pool(database_url).await?;
    info!("Connected to the database");

    let store = PgEmployeeStore::new(pool);
    store.ensure_schema().await?;
    Ok(store)
}

fn startup_failure(err: AppError) -> std::io::Error {
    error!("{}", err);
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(startup_failure)?;

    match config.store {
        StoreKind::Postgres => {
            let store = connect(&config).await.map_err(startup_failure)?;
            serve(&config, store).await
        }
        StoreKind::Memory => {
            info!("Using the in-memory employee store");
            serve(&config, MemoryStore::new()).await
        }
    }
}
