use tankwar::{DEFAULT_PORT, SimulationConfig};

#[derive(Debug, Clone)]
pub struct HostConfig {
    pub bind: String,
    pub port: u16,
    pub seed: Option<u64>,
    pub simulation: SimulationConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            seed: None,
            simulation: SimulationConfig::default(),
        }
    }
}

impl HostConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub address: String,
    pub port: u16,
    pub simulation: SimulationConfig,
}

impl ClientConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: DEFAULT_PORT,
            simulation: SimulationConfig::default(),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
