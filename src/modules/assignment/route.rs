use actix_web::web;

use crate::modules::assignment::{handle, repository::AssignmentRepository};

/// Registered ahead of the `/media` scope so the scope doesn't swallow it.
pub fn configure<R>(cfg: &mut web::ServiceConfig)
where
    R: AssignmentRepository + Send + Sync + 'static,
{
    cfg.route("/media/assignments", web::get().to(handle::list_assignments::<R>));
}
