use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod lifecycle;


#[derive(Debug, Parser)]
#[command(name = "offerkit-cli")]
#[command(about = "Offerkit command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Activate every due pending offer and revert every expired active one
    Sweep,
    /// Push one offer's prices to the shop immediately
    Activate {
        /// Offer id to activate
        #[arg(long)]
        offer: i64,
    },
    /// Restore one offer's original prices immediately
    Revert {
        /// Offer id to revert
        #[arg(long)]
        offer: i64,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = offerkit_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = offerkit_db::PoolConfig::from_app_config(&config);
    let pool = offerkit_db::connect_pool(&config.database_url, pool_config).await?;

    match cli.command {
        Commands::Sweep => lifecycle::run_sweep(&pool, &config).await,
        Commands::Activate { offer } => lifecycle::run_activate(&pool, &config, offer).await,
        Commands::Revert { offer } => lifecycle::run_revert(&pool, &config, offer).await,
    }
}
