use std::str::FromStr;

use crate::api::error::SystemError;

pub const DEFAULT_BLOCK_SIZE: usize = 200;
pub const DEFAULT_TOKEN_EXPIRATION: u64 = 7 * 24 * 60 * 60;
pub const DEFAULT_MAX_FILE_SIZE: usize = 50 * 1024 * 1024;
pub const DEFAULT_MAX_FILES_PER_UPLOAD: usize = 50;
pub const UPLOAD_FIELD: &str = "files";
pub const PUBLIC_UPLOAD_PREFIX: &str = "uploads";
pub const USER_CACHE_TTL: usize = 3600;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Debug, Clone)]
pub struct Env {
    pub jwt: JwtConfig,
    pub database_url: String,
    pub redis_url: Option<String>,
    pub client_origins: Vec<String>,
    pub ip: String,
    pub port: u16,
    pub workers: usize,
    pub upload_dir: String,
    pub max_file_size: usize,
    pub max_files_per_upload: usize,
    pub assignment_block_size: usize,
}

fn required(key: &'static str) -> Result<String, SystemError> {
    std::env::var(key).map_err(|_| {
        SystemError::config(format!("{key} must be set in .env file or environment variable"))
    })
}

fn parsed_or<T: FromStr>(key: &'static str, default: T) -> Result<T, SystemError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| SystemError::config(format!("{key} has an invalid value: {raw:?}"))),
        Err(_) => Ok(default),
    }
}

/// Splits a comma separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|o| !o.is_empty()).map(str::to_string).collect()
}

impl Env {
    pub fn from_env() -> Result<Self, SystemError> {
        let jwt = JwtConfig {
            secret: required("SECRET_KEY")?,
            expiration: parsed_or("TOKEN_EXPIRATION", DEFAULT_TOKEN_EXPIRATION)?,
        };

        let database_url = required("DATABASE_URL")?;
        let redis_url = std::env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty());

        let client_origins = parse_origins(
            &std::env::var("CLIENT_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string()),
        );
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parsed_or("PORT", 5000u16)?;
        let workers = parsed_or("WORKERS", 2usize)?;

        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
        let max_file_size = parsed_or("MAX_FILE_SIZE", DEFAULT_MAX_FILE_SIZE)?;
        let max_files_per_upload = parsed_or("MAX_FILES_PER_UPLOAD", DEFAULT_MAX_FILES_PER_UPLOAD)?;

        let assignment_block_size = parsed_or("ASSIGNMENT_BLOCK_SIZE", DEFAULT_BLOCK_SIZE)?;
        if assignment_block_size == 0 {
            return Err(SystemError::config("ASSIGNMENT_BLOCK_SIZE must be greater than zero"));
        }

        Ok(Env {
            jwt,
            database_url,
            redis_url,
            client_origins,
            ip,
            port,
            workers,
            upload_dir,
            max_file_size,
            max_files_per_upload,
            assignment_block_size,
        })
    }
}
