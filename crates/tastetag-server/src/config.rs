use std::net::{IpAddr, SocketAddr};

use clap::Parser;

pub const DEFAULT_PORT: u16 = 3720;
pub const DEFAULT_UPSTREAM_URL: &str = "https://ai-agent-hackathons.onrender.com";

#[derive(Debug, Clone, Parser)]
#[command(name = "tastetag-server", about = "Recommendation proxy for the tastetag wizard")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "TASTETAG_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "TASTETAG_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Base URL of the recommendation service
    #[arg(long, env = "TASTETAG_UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}
