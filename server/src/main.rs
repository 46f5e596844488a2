mod auth;
mod config;
mod employees;
mod http;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, DbPool, connect};
use platform_obs::{ObsConfig, init_tracing};
use products_hr::{EmployeeStore, HrError, NewEmployee, SeaOrmEmployeeStore};
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    http::{AppState, ServeConfig},
};

const SEED_DEPARTMENTS: [&str; 3] = ["Engineering", "HR", "Sales"];
const SEED_ROLES: [&str; 2] = ["Developer", "Manager"];

#[derive(Parser, Debug)]
#[command(name = "employee-directory", version, about = "Employee directory REST service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// Run database migrations.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Insert demo employees (existing emails are skipped).
    Seed {
        #[arg(long, default_value_t = 15)]
        count: u32,
    },
    /// Print a development access token signed with the configured secret.
    Token {
        #[arg(long, default_value = "dev")]
        subject: String,
    },
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration.
    Down,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(long, help = "Allow starting even when migrations are pending")]
    allow_dirty: bool,
}

impl From<ServeCommand> for ServeConfig {
    fn from(value: ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let _tracing = init_tracing(ObsConfig::default())?;
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(cmd) => run_server(cmd).await,
        Command::Migrate(action) => match action {
            MigrateCommand::Up => migrate_up().await,
            MigrateCommand::Down => migrate_down().await,
        },
        Command::Seed { count } => run_seed(count).await,
        Command::Token { subject } => print_token(&subject),
    }
}

async fn setup_pool() -> Result<DbPool> {
    let settings = DatabaseSettings::from_env();
    connect(&settings).await.map_err(Into::into)
}

async fn run_server(cmd: ServeCommand) -> Result<()> {
    let config = Arc::new(AppConfig::load()?);
    let pool = setup_pool().await?;
    ensure_migrations(&pool, cmd.allow_dirty).await?;
    let state = AppState {
        employees: Arc::new(SeaOrmEmployeeStore::new(pool.clone())),
        pool,
        auth: Arc::new(config.auth_config()),
        config,
    };
    http::serve(cmd.into(), state).await
}

async fn ensure_migrations(pool: &DbPool, allow_dirty: bool) -> Result<()> {
    let pending = Migrator::get_pending_migrations(pool).await?;
    if pending.is_empty() {
        return Ok(());
    }
    if !allow_dirty {
        anyhow::bail!(
            "{} pending migration(s); run `employee-directory migrate up` or pass --allow-dirty",
            pending.len()
        );
    }
    warn!(pending = pending.len(), "starting with pending migrations");
    Ok(())
}

async fn migrate_up() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::up(&pool, None).await?;
    info!("database migrations applied");
    Ok(())
}

async fn migrate_down() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::down(&pool, Some(1)).await?;
    info!("most recent migration rolled back");
    Ok(())
}

async fn run_seed(count: u32) -> Result<()> {
    let pool = setup_pool().await?;
    let store = SeaOrmEmployeeStore::new(pool);
    let mut inserted = 0;
    for (i, new) in seed_employees(count).into_iter().enumerate() {
        match store.create(new).await {
            Ok(_) => inserted += 1,
            Err(HrError::Invalid(_)) => info!(index = i, "seed employee already present"),
            Err(err) => return Err(err).context("seeding employees failed"),
        }
    }
    let total = store.count().await?;
    info!(inserted, total, "seed complete");
    Ok(())
}

fn seed_employees(count: u32) -> Vec<NewEmployee> {
    (0..count as usize)
        .map(|i| NewEmployee {
            name: format!("Employee {i}"),
            email: format!("employee{i}@example.com"),
            department: Some(SEED_DEPARTMENTS[i % SEED_DEPARTMENTS.len()].to_string()),
            role: Some(SEED_ROLES[i % SEED_ROLES.len()].to_string()),
        })
        .collect()
}

fn print_token(subject: &str) -> Result<()> {
    let config = AppConfig::load()?;
    let token = platform_authn::issue_token(subject, &config.auth_config())
        .context("failed to sign access token")?;
    println!("{token}");
    Ok(())
}
