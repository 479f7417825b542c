use dotenv::dotenv;
use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub media_root: String,
    pub media_base_url: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv().ok(); // Load .env file if present
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            port: env::var("PORT")?.parse()?,
            jwt_secret: env::var("JWT_SECRET")?,
            media_root: env::var("MEDIA_ROOT")?,
            media_base_url: env::var("MEDIA_BASE_URL")?,
        })
    }
}
