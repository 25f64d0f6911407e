use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // stderr keeps stdout clean for --json output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    staybook::Cli::run()
}
