//! Listener and CORS settings, read from the `http` section of the config file

use std::io;
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Missing keys take their value from `Default`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpServerConfig {
    /// IP literal to listen on
    pub host: String,
    pub port: u16,
    /// Origins allowed to call the API from a browser. Empty allows any.
    pub cors_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            // Vite dev server
            cors_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

impl HttpServerConfig {
    pub fn bind_addr(&self) -> io::Result<SocketAddr> {
        let ip: IpAddr = self.host.trim().parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("host '{}' is not an IP address: {}", self.host, e),
            )
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
