use powerstreak_core::projector::upcoming_reward_preview;
use powerstreak_core::rewards::{MYSTERY_BANDS, MYSTERY_FLOOR};

use super::{format_worth, open_engine, CliResult};

pub async fn run(days: u32) -> CliResult {
    let engine = open_engine().await?;
    let state = engine.snapshot().await;
    engine.shutdown();

    let top = MYSTERY_BANDS.iter().map(|(_, payout)| *payout).max().unwrap_or(MYSTERY_FLOOR);
    for entry in upcoming_reward_preview(&state, engine.processor().rewards(), days) {
        let mut line = if entry.is_mystery() {
            format!("Day {:>3}  mystery box ({MYSTERY_FLOOR}-{top} PL)", entry.day)
        } else {
            format!("Day {:>3}  {} PL  worth {}", entry.day, entry.points, format_worth(entry.worth_cents()))
        };
        if let Some(badge) = entry.badge {
            line.push_str(&format!("  {} {}", badge.symbol(), badge.name()));
        }
        println!("{line}");
    }
    Ok(())
}
