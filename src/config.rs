use std::net::SocketAddr;
use std::path::PathBuf;

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (default: 0.0.0.0:3000)
    pub bind: SocketAddr,
    /// Directory holding uploaded and extracted PDFs (default: ./temp)
    pub storage_dir: PathBuf,
    /// Maximum request body size for uploads (default: 25MB)
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            storage_dir: PathBuf::from("./temp"),
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}
