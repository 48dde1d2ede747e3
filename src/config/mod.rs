use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub pagination: PaginationConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Scheme and host of the backend, e.g. `http://localhost:3200`
    pub base_url: String,
    /// Path prefix every endpoint lives under
    pub route: String,
    /// Prefix for profile pictures and event photos
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub page_size: u32,
    pub member_page_size: u32,
    /// Page numbers shown on each side of the current page
    pub window_radius: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub token_key: String,
    pub config_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("PORTAL_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("PORTAL_BASE_URL") {
            self.api.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("PORTAL_ROUTE") {
            self.api.route = v.trim_matches('/').to_string();
        }
        if let Ok(v) = env::var("PORTAL_IMAGE_URL") {
            self.api.image_url = v;
        }

        // Pagination overrides
        if let Ok(v) = env::var("PORTAL_PAGE_SIZE") {
            self.pagination.page_size = parse_positive(&v).unwrap_or(self.pagination.page_size);
        }
        if let Ok(v) = env::var("PORTAL_MEMBER_PAGE_SIZE") {
            self.pagination.member_page_size =
                parse_positive(&v).unwrap_or(self.pagination.member_page_size);
        }

        // Session overrides
        if let Ok(v) = env::var("PORTAL_TOKEN_KEY") {
            if !v.is_empty() {
                self.session.token_key = v;
            }
        }
        if let Ok(v) = env::var("PORTAL_CONFIG_DIR") {
            self.session.config_dir = Some(PathBuf::from(v));
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:3200".to_string(),
                route: "mobile".to_string(),
                image_url: "http://localhost:3200/".to_string(),
            },
            pagination: PaginationConfig {
                page_size: 10,
                member_page_size: 50,
                window_radius: 2,
            },
            session: SessionConfig {
                token_key: "token".to_string(),
                config_dir: None,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging-api.gbs.example.com".to_string(),
                route: "mobile".to_string(),
                image_url: "https://staging-api.gbs.example.com/".to_string(),
            },
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://api.gbs.example.com".to_string(),
                route: "mobile".to_string(),
                image_url: "https://api.gbs.example.com/".to_string(),
            },
            ..Self::development()
        }
    }

    /// Directory holding the persisted session, created on demand
    pub fn config_dir(&self) -> anyhow::Result<PathBuf> {
        let config_dir = match &self.session.config_dir {
            Some(dir) => dir.clone(),
            None => {
                let home = env::var("HOME")
                    .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
                PathBuf::from(home).join(".config").join("gbs-portal")
            }
        };

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        Ok(config_dir)
    }
}

fn parse_positive(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
