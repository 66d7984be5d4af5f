use std::path::PathBuf;

/// Server settings, read from the environment
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,
    /// Password expected in the admin header
    pub admin_password: String,
    /// Where uploaded sheets and fee receipts are stored
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            admin_password: "hostel123".to_string(),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or(default.bind_address),
            port: std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.port),
            admin_password: std::env::var("ADMIN_PASSWORD").unwrap_or(default.admin_password),
            upload_dir: std::env::var("UPLOAD_DIR").map(PathBuf::from).unwrap_or(default.upload_dir),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_upload_bytes),
        }
    }
}
