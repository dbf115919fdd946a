use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::configs::RedisCache;
use crate::constants::{JwtConfig, USER_CACHE_TTL};
use crate::modules::user::model::{
    normalize_email, AuthResponse, InsertUser, LoginModel, RegisterModel, UserResponse,
};
use crate::modules::user::repository::UserRepository;
use crate::modules::user::schema::{UserEntity, UserRole};
use crate::utils::{hash_password, verify_password, Claims};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
    cache: Option<Arc<RedisCache>>,
    jwt: JwtConfig,
}

impl UserService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository + Send + Sync>,
        cache: Option<Arc<RedisCache>>,
        jwt: JwtConfig,
    ) -> Self {
        let cache_state = if cache.is_some() { "enabled" } else { "disabled" };
        info!("UserService initialized with dependencies (profile cache {})", cache_state);
        UserService { repo, cache, jwt }
    }

    fn issue_token(&self, user: &UserEntity) -> Result<String, error::SystemError> {
        Claims::new(&user.id, &user.role, self.jwt.expiration).encode(self.jwt.secret.as_ref())
    }

    pub async fn register(&self, user: RegisterModel) -> Result<AuthResponse, error::SystemError> {
        let email = normalize_email(&user.email);

        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(error::SystemError::bad_request("Email is already registered"));
        }

        let hash_password = hash_password(&user.password)?;

        let new_user = InsertUser {
            name: user.name.trim().to_string(),
            email,
            hash_password,
            role: UserRole::default(),
        };

        let entity = self.repo.create(&new_user).await?;
        info!("User {} registered", entity.id);

        let token = self.issue_token(&entity)?;
        Ok(AuthResponse { token, user: UserResponse::from(entity) })
    }

    pub async fn login(&self, user: LoginModel) -> Result<AuthResponse, error::SystemError> {
        let entity = self
            .repo
            .find_by_email(&normalize_email(&user.email))
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Invalid email or password"))?;

        let valid = verify_password(&entity.hash_password, &user.password)?;
        if !valid {
            return Err(error::SystemError::unauthorized("Invalid email or password"));
        }

        let token = self.issue_token(&entity)?;
        Ok(AuthResponse { token, user: UserResponse::from(entity) })
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserResponse, error::SystemError> {
        let key = format!("user:{}", id);

        if let Some(cache) = &self.cache {
            match cache.get::<UserResponse>(&key).await {
                Ok(Some(cached_user)) => return Ok(cached_user),
                Ok(None) => {}
                Err(e) => warn!("User cache read failed for {}: {}", id, e),
            }
        }

        let entity = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;
        let user = UserResponse::from(entity);

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&key, &user, USER_CACHE_TTL).await {
                warn!("User cache write failed for {}: {}", id, e);
            }
        }

        Ok(user)
    }

    /// Resolves a bearer token to the user it was issued for.
    pub async fn authenticate(&self, token: &str) -> Result<UserResponse, error::SystemError> {
        let claims = Claims::decode(token, self.jwt.secret.as_ref())
            .map_err(|_| error::SystemError::unauthorized("Invalid authorization token"))?;

        match self.get_by_id(claims.sub).await {
            Err(error::SystemError::NotFound(_)) => {
                Err(error::SystemError::unauthorized("Invalid authorization token"))
            }
            other => other,
        }
    }
}
