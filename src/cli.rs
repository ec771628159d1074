use crate::config::Config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use sa_application::prelude as flows;
use sa_core::{cache::CacheKeys, usecases};
use sa_db_sqlite::Connections;
use sa_gateways::cache::InMemoryCache;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Administration of a Shareabouts database")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config_file: Option<PathBuf>,
    /// Overrides the database of the configuration
    #[arg(long, value_name = "DATABASE_URL")]
    db_url: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply all pending database migrations
    Migrate,
    #[command(arg_required_else_help = true)]
    CreateUser { username: String },
    #[command(arg_required_else_help = true)]
    CreateDataset {
        owner: String,
        slug: String,
        /// Defaults to the slug
        #[arg(long)]
        display_name: Option<String>,
    },
    #[command(arg_required_else_help = true)]
    CreateApiKey { owner: String, slug: String },
    /// Index an attribute of the data blobs of a dataset
    #[command(arg_required_else_help = true)]
    AddIndex {
        owner: String,
        slug: String,
        attr_name: String,
    },
    #[command(arg_required_else_help = true)]
    RemoveIndex {
        owner: String,
        slug: String,
        attr_name: String,
    },
    /// Whether a user or key may perform an action on a submission set
    #[command(arg_required_else_help = true)]
    CheckPermission {
        owner: String,
        slug: String,
        /// One of retrieve, create, update or destroy
        action: String,
        #[arg(default_value = flows::PLACES)]
        submission_set: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Drop every cached response of a dataset
    #[command(arg_required_else_help = true)]
    Invalidate { owner: String, slug: String },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = Config::try_load_from_file_or_default(cli.config_file.as_ref())?;
    if let Some(db_url) = cli.db_url {
        cfg.db.conn_sqlite = db_url;
    }

    log::info!("Connecting to SQLite database {}", cfg.db.conn_sqlite);
    let connections = Connections::init(&cfg.db.conn_sqlite, cfg.db.conn_pool_size.into())?;
    sa_db_sqlite::run_embedded_database_migrations(connections.exclusive()?)?;

    let store = InMemoryCache::new();
    let backend = sa_application::Backend {
        connections: &connections,
        cache: CacheKeys::new(&store, cfg.cache.timeout),
        base_url: &cfg.api.base_url,
    };

    match cli.command {
        Commands::Migrate => {}
        Commands::CreateUser { username } => {
            let user = flows::create_user(&connections, &username)?;
            println!("{}", user.id);
        }
        Commands::CreateDataset {
            owner,
            slug,
            display_name,
        } => {
            let new_dataset = usecases::NewDataSet {
                display_name: display_name.unwrap_or_else(|| slug.clone()),
                slug,
            };
            let dataset = flows::create_dataset(&connections, &owner, new_dataset)?;
            let json = flows::dataset_detail(
                &backend,
                &flows::Requester::anonymous(),
                &owner,
                &dataset.slug,
            )?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Commands::CreateApiKey { owner, slug } => {
            let api_key = flows::create_api_key(&connections, &owner, &slug)?;
            println!("{}", api_key.key);
        }
        Commands::AddIndex {
            owner,
            slug,
            attr_name,
        } => {
            flows::add_index(&connections, &owner, &slug, &attr_name)?;
            log::info!("Indexed '{attr_name}' of {owner}/{slug}");
        }
        Commands::RemoveIndex {
            owner,
            slug,
            attr_name,
        } => {
            flows::remove_index(&connections, &owner, &slug, &attr_name)?;
            log::info!("Removed index '{attr_name}' of {owner}/{slug}");
        }
        Commands::CheckPermission {
            owner,
            slug,
            action,
            submission_set,
            username,
            api_key,
        } => {
            let requester =
                flows::resolve_requester(&connections, username.as_deref(), api_key.as_deref())?;
            let allowed = flows::check_permission(
                &connections,
                &owner,
                &slug,
                &requester,
                &action,
                &submission_set,
            )?;
            println!("{}", if allowed { "allowed" } else { "denied" });
        }
        Commands::Invalidate { owner, slug } => {
            flows::invalidate_dataset(&backend, &owner, &slug)?;
        }
    }
    Ok(())
}
