use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub max_file_size: usize,
    pub cache_ttl: Duration,
    pub drive_credentials_file: Option<PathBuf>,
    pub drive_folder: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let max_file_size_mb: usize = std::env::var("MAX_FILE_SIZE_MB")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(25);

        let cache_ttl_seconds = std::env::var("CACHE_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        let drive_credentials_file = std::env::var("DRIVE_CREDENTIALS_FILE")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let drive_folder = std::env::var("DRIVE_FOLDER")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Swim FIT Files".to_string());

        Self {
            port,
            max_file_size: max_file_size_mb * 1024 * 1024,
            cache_ttl: Duration::from_secs(cache_ttl_seconds),
            drive_credentials_file,
            drive_folder,
        }
    }
}
