use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use league_server::{config::Settings, db, http, metrics};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Configuration
    let settings = Settings::from_env()?;
    let server_addr = settings.server_addr.clone();

    // Postgres pool, owned here and closed on shutdown
    let db_pool = db::connect(&settings).await?;
    let prometheus = metrics::init()?;

    let settings = web::Data::new(settings);
    let pool_data = web::Data::new(db_pool.clone());

    log::info!("listening on {server_addr}");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(prometheus.clone())
            .app_data(pool_data.clone())
            .app_data(settings.clone())
            .configure(http::routes::init_routes)
    })
    .bind(&server_addr)
    .with_context(|| format!("binding {server_addr}"))?
    .run()
    .await?;

    db_pool.close().await;
    log::info!("shutdown complete");
    Ok(())
}
