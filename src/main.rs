use anyhow::Result;
use newsreel::{config::Config, output::JsonLinesSink, pipeline};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Records go to stdout as JSON lines; logs stay on stderr.
    let mut sink = JsonLinesSink::new(std::io::stdout());

    pipeline::run(&config, &mut sink).await
}
