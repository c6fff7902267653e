use alumnet_common::{DatabaseConfig, JwtConfig, ServerConfig};

pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 50;

#[derive(Debug, Clone)]
pub struct WorkshopsConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    /// Applied when GET /leaderboard is called without a `limit` parameter.
    pub leaderboard_default_limit: i64,
}

impl WorkshopsConfig {
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("WORKSHOPS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("WORKSHOPS_PORT")
                    .unwrap_or_else(|_| "8083".to_string())
                    .parse()
                    .unwrap_or(8083),
                cors_origins: std::env::var("CORS_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string())
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .collect(),
            },
            database: DatabaseConfig::from_env(),
            jwt: JwtConfig::from_env(),
            leaderboard_default_limit: std::env::var("LEADERBOARD_DEFAULT_LIMIT")
                .unwrap_or_else(|_| DEFAULT_LEADERBOARD_LIMIT.to_string())
                .parse()
                .unwrap_or(DEFAULT_LEADERBOARD_LIMIT),
        }
    }
}
