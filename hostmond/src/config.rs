use anyhow::{Context, Result};
use std::env;
use std::net::{Ipv4Addr, SocketAddr};

/// Environment variable naming the listen port.
pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_PORT: u16 = 9200;

/// Runtime configuration. The port is the only knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_port_var(env::var(PORT_ENV).ok())
    }

    /// An unset or empty value selects `DEFAULT_PORT`.
    pub fn from_port_var(value: Option<String>) -> Result<Self> {
        match value.as_deref() {
            None | Some("") => Ok(Self::default()),
            Some(raw) => {
                let port = raw
                    .parse::<u16>()
                    .with_context(|| format!("invalid {PORT_ENV} value {raw:?}"))?;
                Ok(Self { port })
            }
        }
    }

    /// All interfaces on the configured port.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}
