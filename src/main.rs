use actix_cors::Cors;
use actix_web::{
    self,
    http::header,
    middleware::{from_fn, Logger},
    web, App, HttpServer,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    configs::{connect_database, run_migrations, RedisCache},
    middlewares::authentication,
    modules::{
        assignment::{
            repository::AssignmentRepository, repository_pg::AssignmentRepositoryPg,
            service::AssignmentService,
        },
        media::{model::UploadConfig, MediaRepository, MediaRepositoryPg, MediaService},
        user::{repository_pg::UserRepositoryPg, service::UserService},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[actix_web::get("/health")]
async fn health_check() -> web::Json<HealthResponse> {
    web::Json(HealthResponse { status: "ok" })
}

/// Every route of the service; `M` and `A` pick the media and assignment stores.
fn routes<M, A>(cfg: &mut web::ServiceConfig)
where
    M: MediaRepository + Send + Sync + 'static,
    A: AssignmentRepository + Send + Sync + 'static,
{
    cfg.service(health_check).configure(modules::media::route::public_configure::<M>).service(
        web::scope("/api").configure(modules::user::route::public_api_configure).service(
            web::scope("")
                .wrap(from_fn(authentication))
                .configure(modules::user::route::configure)
                .configure(modules::assignment::route::configure::<A>)
                .configure(modules::media::route::configure::<M>),
        ),
    );
}

fn cors(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .supports_credentials()
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Environment variables loaded from .env file");

    let env = constants::Env::from_env().map_err(|e| std::io::Error::other(e.to_string()))?;

    let db_pool = connect_database(&env.database_url).await.map_err(|e| {
        log::error!("Failed to start server: {}", e);
        std::io::Error::other("Database connection error")
    })?;
    run_migrations(&db_pool).await.map_err(|e| {
        log::error!("Failed to start server: {}", e);
        std::io::Error::other("Database migration error")
    })?;

    let redis_cache = match env.redis_url.as_deref() {
        Some(url) => Some(Arc::new(
            RedisCache::new(url).map_err(|_| std::io::Error::other("Redis connection error"))?,
        )),
        None => None,
    };

    let user_repo = UserRepositoryPg::new(db_pool.clone());
    let media_repo = MediaRepositoryPg::new(db_pool.clone());
    let assignment_repo = AssignmentRepositoryPg::new(db_pool.clone());

    let user_service =
        UserService::with_dependencies(Arc::new(user_repo), redis_cache, env.jwt.clone());
    let media_service = MediaService::new(
        Arc::new(media_repo),
        UploadConfig {
            max_file_size: env.max_file_size,
            max_files: env.max_files_per_upload,
            upload_dir: env.upload_dir.clone(),
        },
    );
    let assignment_service =
        AssignmentService::new(Arc::new(assignment_repo), env.assignment_block_size);

    media_service.ensure_upload_dir().await.map_err(|e| std::io::Error::other(e.to_string()))?;

    log::info!("Allowed CORS origins: {:?}", env.client_origins);
    log::info!("Starting server at http://{}:{}", env.ip, env.port);

    let origins = env.client_origins.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(cors(&origins))
            .wrap(Logger::default())
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(media_service.clone()))
            .app_data(web::Data::new(assignment_service.clone()))
            .configure(routes::<MediaRepositoryPg, AssignmentRepositoryPg>)
    })
    .bind((env.ip.as_str(), env.port))?
    .workers(env.workers)
    .run()
    .await
}
