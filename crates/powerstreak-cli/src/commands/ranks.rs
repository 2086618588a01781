use super::{open_engine, CliResult};

pub async fn run() -> CliResult {
    let engine = open_engine().await?;
    let state = engine.snapshot().await;
    engine.shutdown();

    let ranks = engine.processor().ranks();
    let current = ranks.rank_for_attendance(state.connected_days).map(|tier| &tier.key);
    for tier in ranks.tiers() {
        let status = if current == Some(&tier.key) {
            "current"
        } else if state.has_rank(&tier.key) || tier.threshold <= state.connected_days {
            "unlocked"
        } else {
            ""
        };
        println!(
            "{} {:<9} {:>4} days  {:>5}  {status}",
            tier.symbol, tier.name, tier.threshold, tier.boost.to_string()
        );
    }
    Ok(())
}
