use powerstreak_core::projector::badge_progress;

use super::{open_engine, progress_bar, CliResult};

pub async fn run() -> CliResult {
    let engine = open_engine().await?;
    let state = engine.snapshot().await;
    engine.shutdown();

    for progress in badge_progress(&state) {
        let badge = progress.badge;
        let status = if progress.unlocked {
            "unlocked".to_string()
        } else {
            progress_bar(progress.fraction, 14)
        };
        println!("{} {:<11} {:<14} {status}", badge.symbol(), badge.name(), badge.description());
    }
    Ok(())
}
