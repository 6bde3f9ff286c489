//! @ai:module:intent CLI for task-group usage analysis
//! @ai:module:layer presentation

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taskcost::{
    config::{FilterConfig, QuestionConfig, UsageConfig},
    graph::{GraphCache, GraphSource, QueueClient},
    report::ReportGenerator,
    UsageAnalyzer,
};

#[derive(Parser)]
#[command(name = "taskcost")]
#[command(about = "Attribute CI task-group compute time to worker classes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer the configured questions and print per-worker usage
    Run {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the cache directory from the config
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Only run questions with these labels (repeatable)
        #[arg(short, long = "question")]
        questions: Vec<String>,

        /// Only run questions for these task-group ids (repeatable)
        #[arg(short, long = "group")]
        groups: Vec<String>,

        /// Also write the reports as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,

        /// Also write PNG charts into this directory
        #[arg(long)]
        charts: Option<PathBuf>,
    },

    /// List configured questions
    List {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a sample configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "taskcost.toml")]
        output: PathBuf,
    },

    /// Inspect or clear cached task-group snapshots
    Cache {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached task groups
    List,
    /// Remove the snapshot of one task group
    Clear {
        /// Task-group id
        group_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .without_time()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("taskcost=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            cache_dir,
            questions,
            groups,
            json,
            charts,
        } => {
            run_questions(RunArgs {
                config,
                cache_dir,
                questions,
                groups,
                json,
                charts,
            })
            .await
        }
        Commands::List { config } => list_questions(config),
        Commands::Init { output } => init_config(output),
        Commands::Cache { config, action } => manage_cache(config, action),
    }
}

struct RunArgs {
    config: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    questions: Vec<String>,
    groups: Vec<String>,
    json: Option<PathBuf>,
    charts: Option<PathBuf>,
}

/// @ai:intent Answer the selected questions and render the reports
/// @ai:effects network, fs:read, fs:write, io
async fn run_questions(args: RunArgs) -> Result<()> {
    let mut config = load_or_default_config(args.config)?;

    if let Some(cache_dir) = args.cache_dir {
        config.paths.cache_dir = cache_dir;
    }

    let filter = build_filter(args.questions, args.groups);
    let selected: Vec<QuestionConfig> = config
        .questions
        .iter()
        .filter(|q| filter.matches(q))
        .cloned()
        .collect();

    if selected.is_empty() {
        anyhow::bail!("No questions match the selection; see `taskcost list`");
    }

    let cache = GraphCache::open(&config.paths.cache_dir)?;
    let client = QueueClient::new(&config.queue)?;
    let analyzer = UsageAnalyzer::new(GraphSource::new(client, cache));

    let reports = analyzer.answer_all(&selected).await?;

    let reporter = ReportGenerator::new();
    reporter.print(&reports);

    if let Some(path) = args.json {
        reporter.write_json(&reports, &path)?;
    }

    if let Some(dir) = args.charts {
        reporter.write_charts(&reports, &dir)?;
    }

    Ok(())
}

/// @ai:intent List configured questions
/// @ai:effects fs:read, io
fn list_questions(config: Option<PathBuf>) -> Result<()> {
    let config = load_or_default_config(config)?;

    println!("Configured questions ({}):", config.questions.len());
    println!();
    println!("{:<30} {:<24} {:<8} {:<8} {:<6}", "Label", "Group", "Include", "Exclude", "Mult");
    println!("{}", "-".repeat(80));

    for q in &config.questions {
        println!(
            "{:<30} {:<24} {:<8} {:<8} {:<6}",
            q.label,
            q.group_id,
            q.include.as_ref().map_or(0, Vec::len),
            q.exclude.as_ref().map_or(0, Vec::len),
            q.multipliers.len()
        );
    }

    Ok(())
}

/// @ai:intent Write the sample configuration file
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<()> {
    if output.exists() {
        anyhow::bail!("{} already exists", output.display());
    }

    UsageConfig::sample().save(&output)?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

/// @ai:intent List or clear cached snapshots
/// @ai:effects fs:read, fs:write, io
fn manage_cache(config: Option<PathBuf>, action: CacheAction) -> Result<()> {
    let config = load_or_default_config(config)?;
    let cache = GraphCache::open(&config.paths.cache_dir)?;

    match action {
        CacheAction::List => {
            let entries = cache.entries()?;
            println!("Cached task groups in {} ({}):", cache.root().display(), entries.len());

            for entry in &entries {
                println!(
                    "  {:<24} {:>8} tasks  {}",
                    entry.group_id,
                    entry.task_count,
                    entry.path.display()
                );
            }
        }
        CacheAction::Clear { group_id } => {
            if cache.remove(&group_id)? {
                println!("Removed cached graph {}", group_id);
            } else {
                println!("No cached graph for {}", group_id);
            }
        }
    }

    Ok(())
}

/// @ai:intent Load configuration or fall back to the sample questions
/// @ai:effects fs:read
fn load_or_default_config(path: Option<PathBuf>) -> Result<UsageConfig> {
    match path {
        Some(p) => Ok(UsageConfig::load(&p)?),
        None => {
            let default_path = PathBuf::from("taskcost.toml");

            if default_path.exists() {
                Ok(UsageConfig::load(&default_path)?)
            } else {
                tracing::info!("No taskcost.toml found, using the sample questions");
                Ok(UsageConfig::sample())
            }
        }
    }
}

/// @ai:intent Build question filter from CLI arguments
/// @ai:effects pure
fn build_filter(questions: Vec<String>, groups: Vec<String>) -> FilterConfig {
    FilterConfig {
        labels: (!questions.is_empty()).then_some(questions),
        group_ids: (!groups.is_empty()).then_some(groups),
    }
}
