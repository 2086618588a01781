use powerstreak_core::projector::{encouragement, next_rank_milestone, next_streak_milestone, rank_progress};
use powerstreak_core::GateResult;

use super::{format_remaining, open_engine, progress_bar, CliResult};

pub async fn run(json: bool) -> CliResult {
    let engine = open_engine().await?;
    let state = engine.snapshot().await;
    let gate = engine.evaluate_gate().await;
    engine.shutdown();

    let ranks = engine.processor().ranks();
    let current_rank = ranks.rank_for_attendance(state.connected_days);
    let next_badge = next_streak_milestone(&state);
    let next_rank = next_rank_milestone(&state, ranks);
    let message = encouragement(state.current_streak);

    if json {
        let out = serde_json::json!({
            "state": state,
            "gate": gate,
            "rank": current_rank.map(|tier| &tier.key),
            "nextBadge": next_badge,
            "nextRank": next_rank,
            "rankProgress": rank_progress(&state, ranks),
            "encouragement": message,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Streak:         {} days (best {})", state.current_streak, state.best_streak);
    println!("Connected days: {}", state.connected_days);
    println!("Power level:    {} PL", state.total_points);
    match current_rank {
        Some(tier) => println!("Rank:           {} {} ({})", tier.symbol, tier.name, tier.boost),
        None => println!("Rank:           none"),
    }
    match gate {
        GateResult::Allowed => println!("Check-in:       available"),
        GateResult::StreakBroken => println!("Check-in:       available (streak will restart)"),
        GateResult::Cooling { remaining } => {
            println!("Check-in:       in {}", format_remaining(remaining));
        }
    }
    if let Some(next) = next_badge {
        println!(
            "Next badge:     {} {} in {} days",
            next.badge.symbol(),
            next.badge.name(),
            next.days_remaining
        );
    }
    if let Some(next) = &next_rank {
        println!(
            "Next rank:      {} in {} days {}",
            next.rank,
            next.days_remaining,
            progress_bar(rank_progress(&state, ranks), 20)
        );
    }
    println!();
    println!("{message}");
    Ok(())
}
