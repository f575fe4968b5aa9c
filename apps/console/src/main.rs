use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

use ayf_auth::{AuthManager, SignIn};
use ayf_config::load as load_config;
use ayf_content::EventsService;
use ayf_dashboard::{BackupTable, DashboardService};
use ayf_store::StoreClient;

#[derive(Parser)]
#[command(name = "ayf-console")]
#[command(about = "Operator console for the AYF Portal backend")]
struct Cli {
    /// Sign in before running the command (required for writes).
    #[arg(long, global = true)]
    email: Option<String>,

    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the admin overview (counts, upcoming events, announcements)
    Stats,
    /// Print the merged recent-activity feed
    Activity {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Dump one table as CSV
    ExportTable {
        /// events, gallery, yearly_plans, announcements, event_rsvps or
        /// user_profiles
        table: BackupTable,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Dump the events list in the admin CSV layout
    ExportEvents {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Capture every table into a JSON backup file
    Backup {
        #[arg(long, default_value = "ayf-backup.json")]
        out: PathBuf,
    },
    /// Print storage usage and the reported database size
    Usage,
    /// Delete events and RSVPs older than the cutoff (requires sign-in)
    Clean {
        #[arg(long, default_value_t = 365)]
        days: i64,
    },
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = SubscriberBuilder::default()
        .with_env_filter(env_filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = load_config().context("failed to load configuration")?;

    let client = StoreClient::new(&config.remote).context("failed to build store client")?;
    let auth = Arc::new(AuthManager::new(client.clone(), &config.auth));

    if let (Some(email), Some(password)) = (cli.email.as_deref(), cli.password.as_deref()) {
        match auth.sign_in(email, password).await {
            SignIn::Granted { user } => {
                info!(user_id = %user.id, "signed in");
            }
            SignIn::Denied { message } => anyhow::bail!("sign in failed: {message}"),
        }
    }

    let dashboard = DashboardService::new(client.clone(), config.storage.clone(), auth.clone());

    match cli.command {
        Commands::Stats => {
            let stats = dashboard
                .dashboard_stats()
                .await
                .context("failed to fetch dashboard stats")?;

            println!("Events:        {}", stats.counts.events);
            println!("Gallery:       {}", stats.counts.gallery);
            println!("Announcements: {}", stats.counts.announcements);
            println!("RSVPs:         {}", stats.counts.rsvps);
            println!("Members:       {}", stats.counts.users);

            println!("\nUpcoming events:");
            for event in &stats.upcoming_events {
                println!("  {}  {}", event.date, event.title);
            }

            println!("\nRecent announcements:");
            for announcement in &stats.recent_announcements {
                println!("  {}", announcement.title);
            }
        }
        Commands::Activity { limit } => {
            let feed = dashboard
                .recent_activity(limit)
                .await
                .context("failed to fetch recent activity")?;

            for entry in feed {
                println!(
                    "{}  [{}] {}",
                    entry.occurred_at.format("%Y-%m-%d %H:%M"),
                    entry.kind.as_str(),
                    entry.title
                );
            }
        }
        Commands::ExportTable { table, out } => {
            let csv = dashboard
                .export_table_csv(table)
                .await
                .context("failed to export table")?;
            write_output(csv, out)?;
        }
        Commands::ExportEvents { out } => {
            let events = EventsService::new(client.clone(), auth.clone());
            let csv = events
                .export_events_csv()
                .await
                .context("failed to export events")?;
            write_output(csv, out)?;
        }
        Commands::Backup { out } => {
            let backup = dashboard.backup_data().await.context("backup failed")?;
            let pretty = serde_json::to_string_pretty(&serde_json::Value::Object(backup))?;
            std::fs::write(&out, pretty)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(path = %out.display(), "backup written");
        }
        Commands::Usage => {
            let usage = dashboard
                .storage_usage()
                .await
                .context("failed to fetch storage usage")?;

            println!("Images:    {}", usage.images);
            println!("Documents: {}", usage.documents);
            println!("Avatars:   {}", usage.avatars);
            println!("Total:     {}", usage.total);
            println!("Database:  {}", dashboard.database_size().await);
        }
        Commands::Clean { days } => {
            dashboard
                .clean_old_data(days)
                .await
                .context("retention sweep failed")?;
            println!("Removed events and RSVPs older than {days} days");
        }
    }

    Ok(())
}

fn write_output(contents: String, out: Option<PathBuf>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(&path, contents)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "export written");
        }
        None => println!("{contents}"),
    }

    Ok(())
}
