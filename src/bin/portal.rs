use clap::Parser;
use gbs_portal::cli::utils::Reported;
use gbs_portal::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so PORTAL_BASE_URL and friends apply
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = gbs_portal::cli::run(cli).await {
        let verbose = matches!(std::env::var("CLI_VERBOSE").as_deref(), Ok("true") | Ok("1"));
        if verbose {
            eprintln!("Error: {e:?}");
        } else if !e.is::<Reported>() {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }

    Ok(())
}
