mod diagram;
mod fetch;
mod hierarchy;
mod settings;
mod tracker;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Url;
use scraper::ElementRef;
use tracing::{info, warn};

use diagram::extract::Extractor;
use diagram::{Diagram, Node};
use fetch::{HttpPageSource, PageSource};
use hierarchy::{tree, Tree};
use settings::Settings;
use tracker::jira::{JiraClient, JiraConfig};
use tracker::sync::{SyncConfig, TrackerSync};
use tracker::RecordKind;

#[derive(Parser)]
#[command(
    name = "wat2jira",
    about = "Replicate the AWS Well-Architected map into Jira epics, stories and sub-tasks"
)]
struct Cli {
    /// Settings file (default: ./wat2jira.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the map and print the reconstructed hierarchy
    Preview,
    /// Scrape the map and create one Jira issue per node
    Sync {
        /// Username to connect to Jira
        #[arg(long)]
        jira_user: String,
        /// URL to your Jira instance
        #[arg(long)]
        jira_url: String,
        /// Key of the Jira project to import the issues into
        #[arg(long)]
        jira_project: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Preview => {
            let tree = scrape_tree(&settings)?;
            if tree.is_empty() {
                println!("No pillars found. Check pillar_ids against the map.");
                return Ok(());
            }
            print_tree(&tree, &settings);
            Ok(())
        }
        Commands::Sync {
            jira_user,
            jira_url,
            jira_project,
        } => {
            let secret = rpassword::prompt_password("Password or token for Jira: ")
                .context("Failed to read the Jira password")?;
            let base_url =
                Url::parse(&jira_url).with_context(|| format!("Invalid Jira URL: {}", jira_url))?;
            let client = JiraClient::new(JiraConfig::new(base_url, jira_user, secret))?;

            let tree = scrape_tree(&settings)?;
            if tree.is_empty() {
                println!("No pillars found. Nothing to create.");
                return Ok(());
            }

            let mut sync = TrackerSync::new(client, sync_config(&settings, jira_project));
            let report = sync.run(&tree)?;
            for kind in RecordKind::ALL {
                println!(
                    "{:<10} {:>4}",
                    settings.issue_types.name(kind),
                    report.count(kind)
                );
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Fetch the map, extract every candidate group and resolve the hierarchy.
fn scrape_tree(settings: &Settings) -> Result<Tree> {
    let pages = HttpPageSource::new()?;
    let map_url = settings.map_url()?;

    info!("Fetching map: {}", map_url);
    let markup = pages
        .fetch(&map_url)?
        .with_context(|| format!("Map page {} did not answer with success", map_url))?;
    let diagram = Diagram::parse(&markup, map_url);

    let segments = diagram.segments();
    info!("Connector segments: {}", segments.len());

    let extractor = Extractor::new(diagram.url(), &pages, &settings.resources_heading);
    let areas = extract_all(&extractor, diagram.areas().collect(), false, "areas")?;
    let sub_areas = extract_all(&extractor, diagram.sub_areas().collect(), true, "sub-areas")?;

    let tree = tree::build(
        &diagram,
        &extractor,
        &settings.pillar_ids,
        &segments,
        &areas,
        &sub_areas,
    );
    info!(
        "Resolved {} pillars, {} areas, {} sub-areas",
        tree.count_at(0),
        tree.count_at(1),
        tree.count_at(2)
    );
    Ok(tree)
}

/// Extract each group, dropping the ones without a position or title.
fn extract_all(
    extractor: &Extractor<'_>,
    groups: Vec<ElementRef<'_>>,
    follow_links: bool,
    label: &str,
) -> Result<Vec<Node>> {
    let total = groups.len();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg:<10} [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );
    pb.set_message(label.to_string());

    let mut nodes = Vec::with_capacity(total);
    for group in groups {
        if let Some(node) = extractor.extract(group, follow_links) {
            nodes.push(node);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!("Extracted {} of {} {}", nodes.len(), total, label);
    Ok(nodes)
}

fn sync_config(settings: &Settings, project_key: String) -> SyncConfig {
    let classification = settings.classification.to_extra_field();
    if classification.is_none() {
        warn!(
            "No classification.value configured; {} issues are created without {}",
            settings.issue_types.mid, settings.classification.field
        );
    }
    SyncConfig {
        project_key,
        issue_types: settings.issue_types.clone(),
        classification,
    }
}

fn print_tree(tree: &Tree, settings: &Settings) {
    for (depth, node) in tree.walk() {
        println!("{}{}", "  ".repeat(depth), truncate(&node.summary, 80));
    }
    println!(
        "\n{} {} | {} {} | {} {}",
        tree.count_at(0),
        settings.issue_types.top,
        tree.count_at(1),
        settings.issue_types.mid,
        tree.count_at(2),
        settings.issue_types.leaf,
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
