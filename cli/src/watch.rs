//! Watch mode — filesystem events drive the analyzer.
//!
//! Each write to a tracked file maps onto a saved-document trigger; the
//! analyzer's debounce window collapses the bursts of events most
//! platforms emit for a single save. Buffer-level modification events
//! have no filesystem counterpart, so only completed writes are seen.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use bladelint_analysis::{AnalysisTrigger, Analyzer};

/// Maximum run outcomes applied per tick.
const OUTCOME_BUDGET: usize = 32;

/// How often pending run outcomes are applied and reprinted.
const TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Channel capacity for raw watcher events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

fn is_write_event(kind: EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

/// Run the watch loop until ctrl-c.
pub(crate) async fn run(analyzer: &mut Analyzer, dir: &Path) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::channel::<notify::Result<Event>>(EVENT_CHANNEL_CAPACITY);

    // The watcher runs on its own thread; bridge its callback onto the
    // runtime through the channel.
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = event_tx.blocking_send(res);
    })
    .context("creating filesystem watcher")?;
    watcher
        .watch(dir, RecursiveMode::Recursive)
        .with_context(|| format!("watching {}", dir.display()))?;

    tracing::info!("watching {} (ctrl-c to stop)", dir.display());

    let mut tick = tokio::time::interval(TICK_INTERVAL);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("stopping watch");
                break;
            }
            event = event_rx.recv() => {
                match event {
                    Some(Ok(event)) if is_write_event(event.kind) => {
                        for path in &event.paths {
                            analyzer.request(path, AnalysisTrigger::DocumentSaved, false);
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => tracing::warn!("watch error: {e}"),
                    None => break,
                }
            }
            _ = tick.tick() => {
                if analyzer.poll_outcomes(OUTCOME_BUDGET) > 0 {
                    let snapshot = analyzer.snapshot();
                    if snapshot.is_empty() {
                        println!("No issues.");
                    } else {
                        crate::print_snapshot(&snapshot);
                    }
                }
            }
        }
    }

    Ok(())
}
