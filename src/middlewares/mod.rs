use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, HttpMessage, HttpRequest,
};

use crate::{
    api::error,
    modules::user::{model::UserResponse, service::UserService},
};

/// Verifies the bearer token and attaches the caller's profile to the request.
pub async fn authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let auth = req.headers().get("Authorization").and_then(|h| h.to_str().ok());
    let token = match auth.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => {
            return Err(error::Error::unauthorized("Authorization token missing").into());
        }
    };

    let user_service = req.app_data::<web::Data<UserService>>().cloned().ok_or_else(|| {
        log::error!("UserService is not registered as app data");
        error::Error::InternalServer
    })?;

    let user = user_service.authenticate(&token).await.map_err(|e| {
        log::warn!("Auth error: {}", e);
        error::Error::from(e)
    })?;

    req.extensions_mut().insert(user);

    next.call(req).await
}

pub fn get_auth_user(req: &HttpRequest) -> Result<UserResponse, error::Error> {
    let extensions = req.extensions();

    let user = extensions
        .get::<UserResponse>()
        .ok_or_else(|| error::Error::unauthorized("Unauthorized"))?
        .clone();

    Ok(user)
}
