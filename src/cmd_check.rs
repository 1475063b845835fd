//! Offline keyword check against a saved page.

use std::path::Path;

use pagewatch_config::{AppConfig, MonitorConfig};
use pagewatch_monitor::MatchEvaluator;
use pagewatch_protocols::ConfigStore;
use pagewatch_store::FileConfigStore;

/// Count keyword matches in `file`, falling back to the stored keywords
/// and threshold for anything not given on the command line.
pub(crate) async fn run_check(
    config: &AppConfig,
    file: &Path,
    keywords: Vec<String>,
    min_count: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = tokio::fs::read_to_string(file).await?;

    let stored = if keywords.is_empty() || min_count.is_none() {
        let store = FileConfigStore::open(config.store_path()).await?;
        MonitorConfig::from_entries(&store.get_all().await?)?
    } else {
        MonitorConfig::default()
    };

    let keywords = if keywords.is_empty() {
        stored.keywords.clone()
    } else {
        keywords
    };
    let min_count = match min_count {
        Some(n) => (n as usize).max(1),
        None => stored.effective_min_count(),
    };

    let evaluator = MatchEvaluator::new(keywords.as_slice(), min_count);
    if evaluator.is_empty() {
        println!("No keywords configured; nothing can match.");
        return Ok(());
    }

    let result = evaluator.evaluate(&text);
    for (keyword, count) in &result.per_keyword {
        println!("{:<24} {}", keyword, count);
    }
    println!("{}", "-".repeat(30));
    println!(
        "Total {} of {} required: {}",
        result.total_occurrences,
        evaluator.min_count(),
        if result.triggered { "ALERT" } else { "no alert" }
    );

    Ok(())
}
