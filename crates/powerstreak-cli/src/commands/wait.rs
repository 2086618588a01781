use powerstreak_core::Event;
use tokio::sync::broadcast::error::RecvError;

use super::{format_remaining, open_engine, CliResult};

pub async fn run() -> CliResult {
    let engine = open_engine().await?;
    let gate = engine.evaluate_gate().await;
    if gate.is_open() {
        println!("check-in available now");
        return Ok(());
    }

    let mut events = engine.subscribe();
    eprintln!("waiting {} for the gate to reopen", format_remaining(gate.remaining()));
    loop {
        match events.recv().await {
            Ok(event @ Event::GateReopened { .. }) => {
                println!("{}", serde_json::to_string(&event)?);
                return Ok(());
            }
            Ok(_) | Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => return Err("engine closed before the gate reopened".into()),
        }
    }
}
