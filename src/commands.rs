//! CLI command handlers — the driver around the pure analysis pipeline.

use std::time::Duration;
use tracing::warn;
use warden_analysis::{Analyzer, PatternOnly};
use warden_core::config::Config;
use warden_store::{ClearConfirmation, FlaggedStore};

/// Analyze one prompt, print the wire-shape JSON, and record the result to
/// the flagged store when it was sanitized or blocked.
///
/// Store unavailability is reported as a warning — it never withholds the
/// analysis from the caller.
pub async fn analyze(
    cfg: &Config,
    prompt: &str,
    threshold_override: Option<u8>,
    no_record: bool,
) -> anyhow::Result<()> {
    let threshold = match threshold_override {
        Some(t) if t > 100 => anyhow::bail!("threshold must be in [0, 100], got {t}"),
        Some(t) => t,
        None => cfg.analysis.risk_threshold,
    };

    let analyzer = Analyzer::from_config(&cfg.analysis);
    let result = analyzer
        .analyze_with_scorer(
            prompt,
            threshold,
            &PatternOnly,
            Duration::from_secs(cfg.analysis.scorer_timeout_secs),
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&result.to_record())?);

    if result.should_record() && !no_record {
        match FlaggedStore::new(&cfg.store).await {
            Ok(store) => {
                if let Err(e) = store.record(&result).await {
                    warn!("failed to record flagged prompt: {e}");
                    eprintln!("warning: result could not be recorded: {e}");
                }
            }
            Err(e) => {
                warn!("flagged store unavailable: {e}");
                eprintln!("warning: flagged store unavailable: {e}");
            }
        }
    }

    Ok(())
}

/// Print all flagged entries as JSON, newest first.
pub async fn flagged_list(cfg: &Config) -> anyhow::Result<()> {
    let store = FlaggedStore::new(&cfg.store).await?;
    let entries = store.list().await?;
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

/// Clear the flagged store. Requires the explicit `--yes` flag.
pub async fn flagged_clear(cfg: &Config, yes: bool) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!(
            "clearing the flagged store is irreversible. \
             Re-run with --yes to confirm."
        );
    }

    let store = FlaggedStore::new(&cfg.store).await?;
    let deleted = store.clear_all(ClearConfirmation::confirmed()).await?;
    println!("Cleared {deleted} flagged prompt(s).");
    Ok(())
}

/// Show configuration and store status.
pub async fn status(config_path: &str, cfg: &Config) {
    println!("Warden — Status\n");
    println!("Config: {config_path}");
    println!("Risk threshold: {}", cfg.analysis.risk_threshold);
    println!("Max prompt chars: {}", cfg.analysis.max_prompt_chars);
    println!("Store: {}", cfg.store.db_path);

    match FlaggedStore::new(&cfg.store).await {
        Ok(store) => match store.count().await {
            Ok(count) => println!("Flagged prompts: {count}"),
            Err(e) => println!("Flagged prompts: unavailable ({e})"),
        },
        Err(e) => println!("Flagged prompts: store unavailable ({e})"),
    }
}
