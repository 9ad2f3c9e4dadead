use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{ArgAction, Parser};
use waldur_client::config::VERSION;
use waldur_client::runtime::RealRuntime;
use waldur_client::{ClientConfig, Query, Resource, WaldurClient};

/// waldur - command line client for the Waldur API
///
/// Examples:
///   waldur me                                  # Show the token owner
///   waldur list projects --filter name=Web     # List matching projects
///   waldur get customers Acme                  # Look up by name or UUID
#[derive(Parser, Debug)]
#[command(author, version = VERSION, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API root, e.g. https://waldur.example.com/api
    #[arg(long, env = "WALDUR_API_URL", value_name = "URL")]
    api_url: String,

    /// Access token of a Waldur user
    #[arg(
        long,
        env = "WALDUR_ACCESS_TOKEN",
        hide_env_values = true,
        value_name = "TOKEN"
    )]
    token: String,

    /// User-Agent header sent with every request
    #[arg(long, value_name = "AGENT", global = true)]
    user_agent: Option<String>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Show the user owning the token
    Me,

    /// List every object of an endpoint
    List(ListArgs),

    /// Show one object by name or UUID
    Get(GetArgs),

    /// Count the objects of an endpoint
    Count(ListArgs),

    /// Show a marketplace statistics report
    Stats(StatsArgs),
}

#[derive(clap::Args, Debug)]
struct ListArgs {
    /// Endpoint such as `projects` or `marketplace-resources`
    endpoint: String,

    /// Query filter, repeatable
    #[arg(long = "filter", short = 'f', value_name = "KEY=VALUE", value_parser = parse_filter)]
    filters: Vec<(String, String)>,
}

#[derive(clap::Args, Debug)]
struct GetArgs {
    endpoint: String,

    /// Name or UUID
    id: String,
}

#[derive(clap::Args, Debug)]
struct StatsArgs {
    /// Report name, e.g. `customer_member_count`
    name: String,
}

fn parse_filter(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

/// What the commands need from the API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
trait Api: Send + Sync {
    async fn current_user(&self) -> waldur_client::Result<Resource>;
    async fn list(&self, endpoint: &str, filters: Query) -> waldur_client::Result<Resource>;
    async fn get(&self, endpoint: &str, id: &str) -> waldur_client::Result<Resource>;
    async fn count(&self, endpoint: &str, filters: Query) -> waldur_client::Result<u64>;
    async fn stats(&self, name: &str) -> waldur_client::Result<Resource>;
}

#[async_trait]
impl Api for WaldurClient {
    async fn current_user(&self) -> waldur_client::Result<Resource> {
        self.get_current_user().await
    }

    async fn list(&self, endpoint: &str, filters: Query) -> waldur_client::Result<Resource> {
        WaldurClient::list(self, endpoint, filters).await
    }

    async fn get(&self, endpoint: &str, id: &str) -> waldur_client::Result<Resource> {
        self.get_resource(endpoint, id, None).await
    }

    async fn count(&self, endpoint: &str, filters: Query) -> waldur_client::Result<u64> {
        WaldurClient::count(self, endpoint, filters).await
    }

    async fn stats(&self, name: &str) -> waldur_client::Result<Resource> {
        self.get_marketplace_stats(name).await
    }
}

/// Runs one command and renders its output.
async fn run(api: &dyn Api, command: Commands) -> Result<String> {
    let output = match command {
        Commands::Me => pretty(&api.current_user().await?)?,
        Commands::List(args) => {
            let filters = args.filters.into_iter().collect();
            let objects = api
                .list(&args.endpoint, filters)
                .await
                .with_context(|| format!("failed to list {}", args.endpoint))?;
            pretty(&objects)?
        }
        Commands::Get(args) => {
            let object = api
                .get(&args.endpoint, &args.id)
                .await
                .with_context(|| format!("failed to get {} from {}", args.id, args.endpoint))?;
            pretty(&object)?
        }
        Commands::Count(args) => {
            let filters = args.filters.into_iter().collect();
            api.count(&args.endpoint, filters).await?.to_string()
        }
        Commands::Stats(args) => pretty(&api.stats(&args.name).await?)?,
    };
    Ok(output)
}

fn pretty(value: &Resource) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(cli.verbose)),
    )
    .init();

    let mut config = ClientConfig::new(cli.api_url, cli.token).apply_env(&RealRuntime)?;
    if let Some(user_agent) = cli.user_agent {
        config = config.with_user_agent(user_agent);
    }
    let client = WaldurClient::new(config).context("failed to set up the Waldur client")?;

    let output = run(&client, cli.command).await?;
    println!("{}", output);
    Ok(())
}
