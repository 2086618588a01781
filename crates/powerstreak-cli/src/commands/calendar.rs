use powerstreak_core::projector::{weekly_calendar, DayStatus};
use powerstreak_core::{Clock, SystemClock};

use super::{open_engine, CliResult};

fn label(status: DayStatus) -> &'static str {
    match status {
        DayStatus::Collected => "collected",
        DayStatus::Missed => "missed",
        DayStatus::Today => "today",
        DayStatus::Tomorrow => "tomorrow",
        DayStatus::Locked => "locked",
    }
}

pub async fn run() -> CliResult {
    let engine = open_engine().await?;
    let state = engine.snapshot().await;
    engine.shutdown();

    let today = engine.processor().local_date(SystemClock.now());
    for cell in weekly_calendar(&state, today) {
        let mark = if cell.status == DayStatus::Collected { "*" } else { " " };
        println!(
            "{mark} {} {}  {}",
            cell.weekday(),
            cell.date.format("%m-%d"),
            label(cell.status)
        );
    }
    Ok(())
}
