use tracing::warn;

/// Process configuration, read once at startup and passed to every consumer.
/// Nothing else in the crate reads the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub jwt_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(8000);

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("JWT_SECRET not set, falling back to the development secret");
                "secret".to_string()
            }
        };

        Self { port, jwt_secret }
    }
}
