use std::error::Error;

use chrono::{Duration, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{Engine, NewRecord};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "cashbook_admin")]
#[command(about = "Admin utilities for Cashbook (schema, tags, demo data, reports)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./cashbook.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply or inspect schema migrations.
    Migrate(MigrateArgs),
    Tag(Tag),
    /// Fill an organization with deterministic demo data.
    Seed(SeedArgs),
    /// Print the rolling two-year cash-flow report.
    Report(ReportArgs),
}

#[derive(Args, Debug)]
struct MigrateArgs {
    #[arg(value_enum, default_value_t = MigrateAction::Up)]
    action: MigrateAction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum MigrateAction {
    Up,
    Down,
    Fresh,
    Status,
}

#[derive(Args, Debug)]
struct Tag {
    #[command(subcommand)]
    command: TagCommand,
}

#[derive(Subcommand, Debug)]
enum TagCommand {
    Create(TagCreateArgs),
}

#[derive(Args, Debug)]
struct TagCreateArgs {
    #[arg(long)]
    org: i64,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct SeedArgs {
    #[arg(long)]
    org: i64,
    #[arg(long, default_value_t = 5)]
    tags: usize,
    #[arg(long, default_value_t = 100)]
    records: usize,
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[arg(long)]
    org: i64,
}

async fn connect_db(database_url: &str) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn migrate(database_url: &str, action: MigrateAction) -> Result<(), Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    match action {
        MigrateAction::Up => migration::Migrator::up(&db, None).await?,
        MigrateAction::Down => migration::Migrator::down(&db, Some(1)).await?,
        MigrateAction::Fresh => migration::Migrator::fresh(&db).await?,
        MigrateAction::Status => migration::Migrator::status(&db).await?,
    }
    println!("migrate {action:?}: done");
    Ok(())
}

/// Deterministic record `index` of a seeded batch.
///
/// Directions alternate, amounts stay within 1..=10000, due dates spread over
/// the last two years and each record carries 0 to 3 of `tag_ids`.
fn seed_record(index: usize, tag_ids: &[i32], now: chrono::DateTime<Utc>) -> NewRecord {
    let direction = if index % 2 == 0 { "IN" } else { "OUT" };
    let amount = 1 + (index * 7919) % 10_000;
    let days_back = (index * 13) % 730;
    let tag_count = if tag_ids.is_empty() { 0 } else { index % 4 };

    NewRecord {
        direction: direction.to_string(),
        amount: amount as f64,
        due_date: now - Duration::days(days_back as i64),
        tag_ids: (0..tag_count)
            .map(|offset| tag_ids[(index + offset) % tag_ids.len()])
            .collect(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter("cashbook_admin=info,engine=info")
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Migrate(args) => migrate(&cli.database_url, args.action).await?,
        Command::Tag(Tag {
            command: TagCommand::Create(args),
        }) => {
            let db = connect_db(&cli.database_url).await?;
            let engine = Engine::builder().database(db).build().await?;
            let tag = engine.create_tag(args.org, &args.name).await?;
            println!("created tag: {} ({})", tag.name, tag.id);
        }
        Command::Seed(args) => {
            let db = connect_db(&cli.database_url).await?;
            let engine = Engine::builder().database(db).build().await?;

            let mut tag_ids = Vec::with_capacity(args.tags);
            for index in 0..args.tags {
                let tag = engine
                    .create_tag(args.org, &format!("tag-{}", index + 1))
                    .await?;
                tag_ids.push(tag.id);
            }

            let now = Utc::now();
            let batch: Vec<NewRecord> = (0..args.records)
                .map(|index| seed_record(index, &tag_ids, now))
                .collect();
            let created = if batch.is_empty() {
                Vec::new()
            } else {
                engine.create_records_bulk(args.org, batch).await?
            };
            tracing::info!(organization_id = args.org, "seed finished");
            println!(
                "seeded organization {}: {} tags, {} records",
                args.org,
                tag_ids.len(),
                created.len()
            );
        }
        Command::Report(args) => {
            let db = connect_db(&cli.database_url).await?;
            let engine = Engine::builder().database(db).build().await?;
            let report = engine.cash_flow_report(args.org).await?;

            println!("{:>4}  {:>5}  {:>14}  {:>14}", "year", "month", "in", "out");
            for bucket in report.monthly_data {
                println!(
                    "{:>4}  {:>5}  {:>14}  {:>14}",
                    bucket.year,
                    bucket.month,
                    bucket.cash_in.to_string(),
                    bucket.cash_out.to_string()
                );
            }
        }
    }

    Ok(())
}
