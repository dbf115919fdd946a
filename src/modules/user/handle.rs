use actix_web::{get, post, web, HttpRequest};

use crate::api::{error, success};
use crate::middlewares::get_auth_user;
use crate::modules::user::{model, service::UserService};
use crate::utils::ValidatedJson;

#[post("/auth/register")]
pub async fn register(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::RegisterModel>,
) -> Result<success::Success<model::AuthResponse>, error::Error> {
    let response = user_service.register(user_data.0).await?;
    Ok(success::Success::created(Some(response)).message("Registration successful"))
}

#[post("/auth/login")]
pub async fn login(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::LoginModel>,
) -> Result<success::Success<model::AuthResponse>, error::Error> {
    let response = user_service.login(user_data.0).await?;
    Ok(success::Success::ok(Some(response)).message("Login successful"))
}

#[get("/me")]
pub async fn me(req: HttpRequest) -> Result<success::Success<model::MeResponse>, error::Error> {
    let user = get_auth_user(&req)?;
    Ok(success::Success::ok(Some(model::MeResponse { user })))
}
