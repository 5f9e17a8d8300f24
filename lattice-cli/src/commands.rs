//! CLI command implementations.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use lattice_graph::{LinkIndex, Snapshot};
use lattice_sync::{BulkLoader, EngineConfig, SyncEngine};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Fetches one snapshot with a spinner while the request is in flight.
async fn fetch_snapshot(url: &str) -> Result<Snapshot> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message("Fetching snapshot...");

    let loader = BulkLoader::new(url);
    let data = loader
        .load()
        .await?
        .ok_or("snapshot was already requested")?;

    spinner.finish_and_clear();
    Ok(Snapshot::from_data(data))
}

/// Fetch the full graph and print or save it as JSON.
pub async fn fetch(url: &str, output: Option<&Path>) -> Result<()> {
    let snapshot = fetch_snapshot(url).await?;
    let json = serde_json::to_string_pretty(&snapshot.to_data())?;

    match output {
        Some(path) => {
            fs::write(path, json)?;
            println!(
                "{} Saved {} nodes and {} links to {}",
                "✓".green(),
                snapshot.node_count().to_string().cyan(),
                snapshot.link_count().to_string().cyan(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// List the spaces in the graph.
pub async fn spaces(url: &str) -> Result<()> {
    let snapshot = fetch_snapshot(url).await?;
    let spaces = lattice_graph::spaces(&snapshot);

    if spaces.is_empty() {
        println!("No spaces in the graph");
        return Ok(());
    }

    println!(
        "{} {} spaces of {} rooms total\n",
        "✓".green(),
        spaces.len().to_string().cyan(),
        snapshot.node_count()
    );
    for space in spaces {
        if space.alias.is_empty() {
            println!("  {}", space.name.bold());
        } else {
            println!("  {} {}", space.name.bold(), space.alias.dimmed());
        }
    }

    Ok(())
}

/// Search rooms by name, alias, or topic.
pub async fn search(url: &str, query: &str, limit: usize) -> Result<()> {
    let snapshot = fetch_snapshot(url).await?;
    let mut matches = lattice_graph::search(&snapshot, query);
    let total = matches.len();
    matches.truncate(limit);

    if matches.is_empty() {
        println!("No rooms match '{}'", query);
        return Ok(());
    }

    println!(
        "{} {} matches for '{}'\n",
        "✓".green(),
        total.to_string().cyan(),
        query
    );
    for room in &matches {
        let kind = if room.is_space { "space" } else { "room" };
        println!("  {} {} {}", room.name.bold(), kind.dimmed(), room.alias);
        if !room.topic.is_empty() {
            println!("    {}", truncate(&room.topic, 100).dimmed());
        }
    }
    if total > matches.len() {
        println!("  ... and {} more", total - matches.len());
    }

    Ok(())
}

/// Show per-room link counts, busiest targets first.
pub async fn links(url: &str, limit: usize) -> Result<()> {
    let snapshot = fetch_snapshot(url).await?;
    let index = LinkIndex::build(&snapshot);

    let mut rows: Vec<_> = snapshot
        .nodes()
        .iter()
        .map(|node| {
            let incoming = index.incoming(&node.id);
            let outgoing = index.outgoing(&node.id);
            (node, incoming, outgoing)
        })
        .filter(|(_, incoming, outgoing)| incoming + outgoing > 0)
        .collect();
    rows.sort_by(|a, b| (b.1 + b.2).cmp(&(a.1 + a.2)));
    rows.truncate(limit);

    if rows.is_empty() {
        println!("No links in the graph");
        return Ok(());
    }

    println!("{:>4}  {:>4}  name", "in".bold(), "out".bold());
    for (node, incoming, outgoing) in rows {
        println!("{:>4}  {:>4}  {}", incoming, outgoing, node.name);
    }

    Ok(())
}

/// Follow the live graph until interrupted.
pub async fn watch(url: &str, channel: &str) -> Result<()> {
    let mut engine = SyncEngine::new(EngineConfig::new(url, channel));
    engine.start().await?;
    let handle = engine.handle();

    let (current, mut updates) = handle.current_and_subscribe().await;
    let mut nodes = 0;
    let mut links = 0;
    if let Some(snapshot) = current {
        nodes = snapshot.node_count();
        links = snapshot.link_count();
        println!(
            "{} Seeded with {} rooms and {} links; watching for updates (Ctrl-C to stop)",
            "✓".green(),
            nodes.to_string().cyan(),
            links.to_string().cyan()
        );
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            update = updates.recv() => match update {
                Ok(snapshot) => {
                    let new_nodes = snapshot.node_count() - nodes;
                    let new_links = snapshot.link_count() - links;
                    nodes = snapshot.node_count();
                    links = snapshot.link_count();
                    println!(
                        "{} +{} rooms, +{} links → {} rooms, {} links",
                        "↺".cyan(),
                        new_nodes,
                        new_links,
                        nodes,
                        links
                    );
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!("display fell behind by {} snapshots", skipped);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    engine.shutdown();
    println!("{} Stopped", "✓".green());
    Ok(())
}

fn truncate(text: &str, length: usize) -> String {
    if text.chars().count() <= length {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(length).collect();
        format!("{}...", truncated)
    }
}
