use powerstreak_core::SqliteStreakStore;

use super::CliResult;

pub fn run(recent: usize, json: bool) -> CliResult {
    let store = SqliteStreakStore::open()?;
    let (stats, records) = store.with_db(|db| -> Result<_, powerstreak_core::StoreError> {
        Ok((db.stats()?, db.recent_check_ins(recent)?))
    })?;

    if json {
        let out = serde_json::json!({ "stats": stats, "recent": records });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Check-ins:      {}", stats.total_check_ins);
    println!("Points awarded: {} PL", stats.total_points_awarded);
    match stats.best_mystery_payout {
        Some(best) => println!("Mystery boxes:  {} (best {best} PL)", stats.mystery_draws),
        None => println!("Mystery boxes:  {}", stats.mystery_draws),
    }
    if let Some(first) = stats.first_check_in_at {
        println!("First check-in: {}", first.format("%Y-%m-%d %H:%M UTC"));
    }

    if !records.is_empty() {
        println!();
        for record in &records {
            let mystery = record
                .mystery_payout
                .map(|p| format!("  mystery {p}"))
                .unwrap_or_default();
            println!(
                "{}  day {:>3}  +{} PL{mystery}",
                record.checked_in_at.format("%Y-%m-%d %H:%M"),
                record.streak_day,
                record.points_awarded
            );
        }
    }
    Ok(())
}
