use clap::Parser;

/// Live T20 chase win-probability web service
#[derive(Parser, Debug, Clone)]
#[command(name = "cricwin", version, about)]
pub struct Config {
    /// Path to the serialized classifier artifact
    #[arg(long, env = "MODEL_PATH", default_value = "models/chase_pipeline.json")]
    pub model_path: String,

    /// Web server listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.model_path.trim().is_empty() {
            anyhow::bail!("model_path must not be empty");
        }
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            anyhow::bail!(
                "listen_addr is not a valid socket address: {}",
                self.listen_addr
            );
        }
        Ok(())
    }
}
