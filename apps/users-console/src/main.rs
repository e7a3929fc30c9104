use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use runtime::{AppConfig, CliArgs};
use serde_json::json;
use users_store::infra::{HttpUsersClient, UrlQueryChannel};
use users_store::model::{SortField, SortOrder, UserId};
use users_store::{QueryPatch, QueryState, UsersCache, UsersStoreConfig, ViewDeriver};

const MODULE_NAME: &str = "users_store";

/// Location the list query lives in when `--url` is not given.
const DEFAULT_LIST_URL: &str = "http://localhost/users";

/// Users console - browse a remote user collection from the terminal
#[derive(Parser, Debug)]
#[command(name = "users-console")]
#[command(about = "Users console - browse a remote user collection from the terminal")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print one page of the filtered, sorted user list
    List(ListArgs),
    /// Print a single user
    Show {
        /// User id
        id: UserId,
    },
    /// Check configuration
    Check,
}

#[derive(Args, Debug, Default)]
struct ListArgs {
    /// Shareable list URL whose query string seeds the query state
    #[arg(long)]
    url: Option<String>,

    /// Page number (1-based)
    #[arg(long)]
    page: Option<u32>,

    /// Page size
    #[arg(long)]
    limit: Option<u32>,

    /// Case-insensitive text matched against name and email
    #[arg(long)]
    search: Option<String>,

    /// Exact role filter
    #[arg(long)]
    role: Option<String>,

    /// Sort field: name, email or age
    #[arg(long)]
    sort_by: Option<SortField>,

    /// Sort order: asc or desc
    #[arg(long)]
    order: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, &config.base_dir()?);
    tracing::info!("Users console starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let store_cfg: UsersStoreConfig = config.module_config(MODULE_NAME)?;

    match cli.command.unwrap_or(Commands::List(ListArgs::default())) {
        Commands::List(list) => run_list(&store_cfg, list).await,
        Commands::Show { id } => run_show(&store_cfg, id).await,
        Commands::Check => check_config(&config, &store_cfg),
    }
}

fn build_cache(cfg: &UsersStoreConfig) -> Result<UsersCache> {
    let remote = HttpUsersClient::from_config(cfg).context("Failed to build users client")?;
    Ok(UsersCache::from_config(Arc::new(remote), cfg))
}

/// Seed the query state from the URL, then apply flag overrides through the
/// setters. The page goes last since every other setter resets it.
fn build_query_state(args: &ListArgs) -> Result<(Arc<UrlQueryChannel>, QueryState)> {
    let raw_url = args.url.as_deref().unwrap_or(DEFAULT_LIST_URL);
    let channel = Arc::new(
        UrlQueryChannel::parse(raw_url).with_context(|| format!("Invalid list URL '{raw_url}'"))?,
    );
    let mut state = QueryState::new(channel.clone());

    if let Some(limit) = args.limit {
        state.set_limit(limit);
    }
    if let Some(search) = &args.search {
        state.set_search(search.clone());
    }
    if let Some(role) = &args.role {
        state.set_role(role.clone());
    }
    let order = args.order.as_deref().map(SortOrder::parse_lenient);
    match (args.sort_by, order) {
        (Some(field), order) => state.set_sort(field, order.unwrap_or_default()),
        (None, Some(order)) => state.update(QueryPatch {
            order: Some(order),
            ..QueryPatch::default()
        }),
        (None, None) => {}
    }
    if let Some(page) = args.page {
        state.set_page(page);
    }

    Ok((channel, state))
}

async fn run_list(cfg: &UsersStoreConfig, args: ListArgs) -> Result<()> {
    let (channel, state) = build_query_state(&args)?;
    let cache = build_cache(cfg)?;

    cache.fetch_all_once().await;
    if let Some(err) = cache.last_error() {
        return Err(anyhow!(err)).context("Listing users");
    }

    let query = state.query();
    let mut deriver = ViewDeriver::new();
    let view = deriver.derive(&cache, query);

    let out = json!({
        "url": channel.url().as_str(),
        "page": query.page,
        "limit": query.limit,
        "pageCount": view.page_count(query.limit),
        "total": view.total,
        "items": view.items,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

async fn run_show(cfg: &UsersStoreConfig, id: UserId) -> Result<()> {
    let cache = build_cache(cfg)?;
    match cache.fetch_by_id(id).await {
        Some(user) => {
            println!("{}", serde_json::to_string_pretty(&user)?);
            Ok(())
        }
        None => Err(anyhow!("User {id} not found")),
    }
}

fn check_config(config: &AppConfig, store_cfg: &UsersStoreConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    HttpUsersClient::from_config(store_cfg).context("Invalid users_store configuration")?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_args(argv: &[&str]) -> ListArgs {
        let mut full = vec!["users-console", "list"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Some(Commands::List(args)) => args,
            other => panic!("expected list command, got {other:?}"),
        }
    }

    #[test]
    fn flags_override_url_and_page_is_applied_last() {
        let args = list_args(&[
            "--url",
            "https://app.example/users?page=4&role=admin",
            "--search",
            "ann",
            "--page",
            "2",
        ]);
        let (channel, state) = build_query_state(&args).unwrap();

        let q = state.query();
        assert_eq!(q.page, 2);
        assert_eq!(q.role, "admin");
        assert_eq!(q.search, "ann");
        let url = channel.url();
        assert_eq!(url.host_str(), Some("app.example"));
        assert!(url.query().unwrap().contains("page=2"));
    }

    #[test]
    fn sort_flags_parse_and_land_in_the_url() {
        let args = list_args(&["--sort-by", "age", "--order", "desc"]);
        let (channel, state) = build_query_state(&args).unwrap();
        assert_eq!(state.query().sort_by, Some(SortField::Age));
        assert_eq!(state.query().order, SortOrder::Desc);
        assert_eq!(channel.url().query(), Some("order=desc&sortBy=age"));
    }

    #[test]
    fn unknown_sort_field_is_rejected_by_the_parser() {
        let res = Cli::try_parse_from(["users-console", "list", "--sort-by", "height"]);
        assert!(res.is_err());
    }

    #[test]
    fn bad_url_is_reported() {
        let args = ListArgs {
            url: Some("not a url".into()),
            ..ListArgs::default()
        };
        let err = build_query_state(&args).unwrap_err();
        assert!(err.to_string().contains("Invalid list URL"));
    }

    #[test]
    fn module_section_is_read_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.yaml");
        std::fs::write(
            &path,
            "modules:\n  users_store:\n    base_url: http://127.0.0.1:8080\n    fetch_limit: 25\n",
        )
        .unwrap();

        let config = AppConfig::load_or_default(Some(&path)).unwrap();
        let store: UsersStoreConfig = config.module_config(MODULE_NAME).unwrap();
        assert_eq!(store.base_url, "http://127.0.0.1:8080");
        assert_eq!(store.fetch_limit, 25);
        check_config(&config, &store).unwrap();
    }
}
