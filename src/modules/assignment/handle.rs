use actix_web::{web, HttpRequest};

use crate::api::success::Success;
use crate::api::{error, success};
use crate::middlewares::get_auth_user;
use crate::modules::assignment::{repository::AssignmentRepository, service::AssignmentService};
use crate::modules::media::schema::{base_url, MediaListResponse};

/// Media assigned to the caller
pub async fn list_assignments<R>(
    req: HttpRequest,
    service: web::Data<AssignmentService<R>>,
) -> Result<success::Success<MediaListResponse>, error::Error>
where
    R: AssignmentRepository + Send + Sync + 'static,
{
    let requester = get_auth_user(&req)?.id;
    let items = service.assignments_for(requester).await?;
    Ok(Success::ok(Some(MediaListResponse::new(items, &base_url(&req)))))
}
