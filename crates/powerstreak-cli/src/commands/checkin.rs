use powerstreak_core::CheckInError;

use super::{format_remaining, open_engine, CliResult};

pub async fn run(json: bool) -> CliResult {
    let engine = open_engine().await?;
    let result = match engine.check_in().await {
        Ok(result) => result,
        Err(CheckInError::NotAllowed { remaining }) => {
            return Err(format!("next check-in available in {}", format_remaining(remaining)).into());
        }
        Err(e) => return Err(e.into()),
    };
    engine.shutdown();

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if let Some(previous) = result.broken_streak {
        println!("Streak of {previous} days broken, starting over");
    }
    println!("Day {} check-in: +{} PL", result.streak_day, result.points_awarded);
    if let Some(roll) = result.mystery_roll {
        println!("  Mystery reward: {} PL ({})", roll.payout, roll.rarity());
    }
    if result.applied_boost.bps() > 0 {
        println!("  Boost: {} on {} PL", result.applied_boost, result.base_points);
    }
    for badge in &result.badge_events {
        println!("  Badge unlocked: {} {}", badge.symbol(), badge.name());
    }
    if let Some(key) = &result.rank_event {
        match engine.processor().ranks().get(key) {
            Some(tier) => println!("  Rank unlocked: {} {}", tier.symbol, tier.name),
            None => println!("  Rank unlocked: {key}"),
        }
    }
    println!("Total: {} PL", result.new_state.total_points);
    Ok(())
}
