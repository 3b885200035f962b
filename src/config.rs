use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub default_from_email: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let default_from_email =
            env::var("DEFAULT_FROM_EMAIL").unwrap_or_else(|_| "webmaster@localhost".to_string());
        Ok(Self {
            database_url,
            default_from_email,
        })
    }
}
