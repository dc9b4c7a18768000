//! Execution of parsed commands against the database.

use anyhow::{anyhow, bail, Context, Result};
use futures::future::join_all;
use serde_json::json;
use tracing::{error, info, warn};

use episub_core::{Config, Database, DownloadOptions, RssFetcher, Subscription, Thread};

use crate::cli::{Command, DownloadArgs};

pub async fn execute(
    command: Command,
    db: &mut Database,
    config: &Config,
    json: bool,
) -> Result<()> {
    match command {
        Command::Add { name, keywords } => add(db, name, keywords, json),
        Command::Remove { sid } => remove(db, &sid, json),
        Command::List => list(db, json),
        Command::Show {
            subscription,
            selector,
        } => show(db, &subscription, &selector, json),
        Command::Update => update(db, config, json).await,
        Command::Download {
            subscription,
            selector,
            options,
        } => download(db, &subscription, &selector, options).await,
    }
}

fn add(db: &mut Database, name: String, keywords: Vec<String>, json: bool) -> Result<()> {
    let sid = db.add(Subscription::new(name, keywords))?;
    db.save().context("Failed to save database")?;

    if json {
        println!("{}", json!({ "sid": sid }));
    } else {
        println!("{}", sid);
    }
    Ok(())
}

fn remove(db: &mut Database, sid: &str, json: bool) -> Result<()> {
    let removed = db.remove_by_sid(sid);
    if removed.is_some() {
        db.save().context("Failed to save database")?;
    } else {
        warn!(sid = %sid, "No subscription with this sid");
    }

    if json {
        println!("{}", json!({ "sid": sid, "removed": removed.is_some() }));
    } else if let Some(sub) = removed {
        println!("Removed {} ({})", sub.name(), sid);
    }
    Ok(())
}

fn list(db: &Database, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(db.subscriptions())?);
        return Ok(());
    }

    for (i, sub) in db.subscriptions().iter().enumerate() {
        let latest = if sub.threads().is_empty() {
            "-".to_string()
        } else {
            sub.latest().to_string()
        };
        println!(
            "{:>3}  {}  {:>6}  {} [{}]",
            i + 1,
            sub.sid().unwrap_or("--------"),
            latest,
            sub.name(),
            sub.keywords().join(", ")
        );
    }
    Ok(())
}

fn lookup<'a>(db: &'a Database, reference: &str) -> Result<&'a Subscription> {
    db.lookup(reference)
        .ok_or_else(|| anyhow!("No subscription with sid or vid {:?}", reference))
}

fn select<'a>(subscription: &'a Subscription, selector: &str) -> Result<Vec<&'a Thread>> {
    subscription
        .get_threads(selector)
        .with_context(|| format!("Cannot select {:?} from {}", selector, subscription.name()))
}

fn show(db: &Database, reference: &str, selector: &str, json: bool) -> Result<()> {
    let subscription = lookup(db, reference)?;
    let threads = select(subscription, selector)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&threads)?);
        return Ok(());
    }

    for thread in threads {
        println!("{:>8}  {}", thread.episode_label(), thread.title);
        println!("          {}", thread.link);
    }
    Ok(())
}

async fn update(db: &mut Database, config: &Config, json: bool) -> Result<()> {
    let fetcher_config = config
        .fetcher
        .clone()
        .context("No [fetcher] section configured")?;
    let fetcher = RssFetcher::new(fetcher_config).context("Failed to create feed fetcher")?;

    let report = db.update(&fetcher).await;
    db.save().context("Failed to save database")?;

    info!(
        fetched = report.fetched,
        added = report.merged.added,
        failed = report.failures.len(),
        "Update complete"
    );

    if json {
        let failures: Vec<_> = report
            .failures
            .iter()
            .map(|f| json!({ "name": f.name, "error": f.error.to_string() }))
            .collect();
        println!(
            "{}",
            json!({
                "fetched": report.fetched,
                "added": report.merged.added,
                "duplicates": report.merged.duplicates,
                "rejected": report.merged.rejected,
                "failures": failures,
            })
        );
    } else {
        println!(
            "{} new thread(s) across {} subscription(s)",
            report.merged.added, report.fetched
        );
        for failure in &report.failures {
            println!("failed: {}: {}", failure.name, failure.error);
        }
    }
    Ok(())
}

async fn download(
    db: &Database,
    reference: &str,
    selector: &str,
    args: DownloadArgs,
) -> Result<()> {
    let options = DownloadOptions::from(args);
    if let Some(client) = options.client.as_deref() {
        if !Database::is_supported_client(client) {
            bail!("Unsupported download client: {}", client);
        }
    }

    let subscription = lookup(db, reference)?;
    let threads = select(subscription, selector)?;
    if threads.is_empty() {
        warn!(name = %subscription.name(), selector = %selector, "Nothing selected");
        return Ok(());
    }

    let results = join_all(
        threads
            .iter()
            .map(|thread| db.download(thread, options.clone())),
    )
    .await;

    let mut failed = 0;
    for (thread, result) in threads.iter().zip(results) {
        match result {
            Ok(resolved) => println!("{} -> {}", thread.title, resolved.client),
            Err(e) => {
                error!(title = %thread.title, "Download failed: {}", e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} download(s) failed", failed, threads.len());
    }
    Ok(())
}
