use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use leakscout_core::{AppConfig, SourceType};
use leakscout_db::{rules, tokens, Database};
use leakscout_gitlab::GitlabClient;
use leakscout_scanner::SearchDispatcher;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "leakscout",
    version,
    about = "Scans public GitLab projects for sensitive keyword patterns"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the periodic scan loop
    Run {
        /// Run a single scan cycle and exit
        #[arg(long)]
        once: bool,
    },

    /// Add a search rule
    AddRule {
        /// The keyword pattern to search for
        pattern: String,
    },

    /// Add a GitLab API token
    AddToken {
        /// The token value
        token: String,
    },

    /// List all configured rules
    ListRules,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = AppConfig::load_with_env().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    let config_path = AppConfig::config_path().context("failed to resolve config path")?;
    if !config_path.exists() {
        config.save().context("failed to write default config")?;
        info!("wrote default config to {}", config_path.display());
    }

    let db = Database::new(&config.database.path)
        .await
        .with_context(|| format!("failed to open database at {}", config.database.path))?;
    db.run_migrations()
        .await
        .context("failed to run database migrations")?;

    match cli.command {
        Commands::Run { once } => run_scanner(&config, db, once).await?,
        Commands::AddRule { pattern } => {
            let id = rules::insert_rule(db.pool(), &pattern, SourceType::Gitlab).await?;
            info!("added rule {} ({})", id, pattern);
        }
        Commands::AddToken { token } => {
            let id = tokens::insert_token(db.pool(), &token, SourceType::Gitlab).await?;
            info!("added token {}", id);
        }
        Commands::ListRules => {
            for rule in rules::list_rules(db.pool()).await? {
                let state = if rule.enabled { "enabled" } else { "disabled" };
                println!("{}\t{}\t{}\t{}", rule.id, rule.source_type, state, rule.pattern);
            }
        }
    }

    Ok(())
}

async fn run_scanner(config: &AppConfig, db: Database, once: bool) -> Result<()> {
    let source_type = SourceType::Gitlab;
    // The credential is read from the token store at the start of each cycle
    let client = GitlabClient::with_base_url(&config.gitlab.base_url, String::new())
        .context("failed to build GitLab client")?;

    let dispatcher = SearchDispatcher::new(Arc::new(client), db.pool().clone(), source_type);

    if once {
        leakscout_scheduler::run_once(
            &dispatcher,
            db.pool(),
            source_type,
            config.scanning.rules_per_batch,
        )
        .await;
        return Ok(());
    }

    info!(
        "starting scan loop (batch size {}, interval {}s)",
        config.scanning.rules_per_batch, config.scanning.scan_interval_secs
    );
    leakscout_scheduler::run_forever(
        dispatcher,
        db.pool().clone(),
        source_type,
        config.scanning.rules_per_batch,
        Duration::from_secs(config.scanning.scan_interval_secs),
    )
    .await;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
