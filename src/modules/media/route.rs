use actix_web::web;

use crate::modules::media::{handle, repository::MediaRepository};

pub fn public_configure<R>(cfg: &mut web::ServiceConfig)
where
    R: MediaRepository + Send + Sync + 'static,
{
    cfg.route("/uploads/{stored_name}", web::get().to(handle::serve_upload::<R>));
}

pub fn configure<R>(cfg: &mut web::ServiceConfig)
where
    R: MediaRepository + Send + Sync + 'static,
{
    cfg.service(
        web::scope("/media")
            .route("", web::get().to(handle::list_media::<R>))
            .route("/upload", web::post().to(handle::upload_files::<R>)),
    );
}
