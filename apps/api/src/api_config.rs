use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use axum::http::HeaderName;
use tracing_subscriber::EnvFilter;
use warden_application::CacheTtlConfig;
use warden_core::{AppError, UserId};

const DEFAULT_IDENTITY_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RbacCacheBackend {
    InMemory,
    Redis,
}

impl RbacCacheBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InMemory => "in_memory",
            Self::Redis => "redis",
        }
    }
}

impl FromStr for RbacCacheBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "in_memory" | "memory" => Ok(Self::InMemory),
            "redis" => Ok(Self::Redis),
            other => Err(AppError::Validation(format!(
                "RBAC_CACHE_BACKEND must be either 'in_memory' or 'redis', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub identity_header: HeaderName,
    pub cache_backend: RbacCacheBackend,
    pub redis_url: Option<String>,
    pub cache_ttl: CacheTtlConfig,
    pub bootstrap_admin_user_id: Option<UserId>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let identity_header = parse_identity_header(
            env::var("IDENTITY_HEADER")
                .unwrap_or_else(|_| DEFAULT_IDENTITY_HEADER.to_owned())
                .as_str(),
        )?;

        let cache_backend = env::var("RBAC_CACHE_BACKEND")
            .unwrap_or_else(|_| RbacCacheBackend::InMemory.as_str().to_owned())
            .parse::<RbacCacheBackend>()?;
        let redis_url = env::var("REDIS_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());
        if cache_backend == RbacCacheBackend::Redis && redis_url.is_none() {
            return Err(AppError::Validation(
                "REDIS_URL is required when RBAC_CACHE_BACKEND=redis".to_owned(),
            ));
        }

        let defaults = CacheTtlConfig::default();
        let cache_ttl = CacheTtlConfig {
            roles_seconds: ttl_env("RBAC_CACHE_ROLES_TTL_SECONDS", defaults.roles_seconds)?,
            user_roles_seconds: ttl_env(
                "RBAC_CACHE_USER_ROLES_TTL_SECONDS",
                defaults.user_roles_seconds,
            )?,
            dashboard_seconds: ttl_env(
                "RBAC_CACHE_DASHBOARD_TTL_SECONDS",
                defaults.dashboard_seconds,
            )?,
        };

        let bootstrap_admin_user_id =
            parse_bootstrap_admin(env::var("BOOTSTRAP_ADMIN_USER_ID").ok().as_deref())?;

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
            identity_header,
            cache_backend,
            redis_url,
            cache_ttl,
            bootstrap_admin_user_id,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn ttl_env(name: &str, default: u32) -> Result<u32, AppError> {
    parse_ttl(name, env::var(name).ok().as_deref(), default)
}

fn parse_ttl(name: &str, value: Option<&str>, default: u32) -> Result<u32, AppError> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(default);
    };

    value
        .parse::<u32>()
        .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}")))
}

fn parse_bootstrap_admin(value: Option<&str>) -> Result<Option<UserId>, AppError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value.parse::<UserId>().map_err(|error| {
                AppError::Validation(format!("invalid BOOTSTRAP_ADMIN_USER_ID: {error}"))
            })
        })
        .transpose()
}

fn parse_identity_header(value: &str) -> Result<HeaderName, AppError> {
    HeaderName::from_bytes(value.trim().to_ascii_lowercase().as_bytes())
        .map_err(|error| AppError::Validation(format!("invalid IDENTITY_HEADER '{value}': {error}")))
}
