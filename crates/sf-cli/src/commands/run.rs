//! Run command: a 1 Hz ticker driving the engine until Ctrl-C.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sf_core::{SessionEngine, Store, TickReport};
use tokio::time::MissedTickBehavior;

use super::util::format_duration;

const TICK: Duration = Duration::from_secs(1);

pub fn run<W: Write, S: Store>(
    writer: &mut W,
    engine: &mut SessionEngine<S>,
    close_on_exit: bool,
) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    runtime.block_on(ticker(writer, engine))?;

    let now = Utc::now();
    if close_on_exit {
        engine.shutdown_at(now);
        tracing::debug!("closed open bucket on exit");
    } else {
        engine.suspend();
    }
    writeln!(writer)?;
    writeln!(writer, "{}", status_line(engine, None, now))?;
    Ok(())
}

async fn ticker<W: Write, S: Store>(writer: &mut W, engine: &mut SessionEngine<S>) -> Result<()> {
    let mut interval = tokio::time::interval(TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = Utc::now();
                let report = engine.tick_at(now);
                if let Some(state) = report.switched_to {
                    tracing::info!(%state, "schedule switched the session");
                }
                write!(writer, "\r{}", status_line(engine, Some(&report), now))?;
                writer.flush()?;
            }
            signal = &mut ctrl_c => {
                signal.context("failed to listen for Ctrl-C")?;
                return Ok(());
            }
        }
    }
}

/// One-line summary: state, live totals and the active block's label.
pub fn status_line<S: Store>(
    engine: &SessionEngine<S>,
    report: Option<&TickReport>,
    now: DateTime<Utc>,
) -> String {
    let (work, rest) = report.map_or_else(
        || (engine.live_work_total_at(now), engine.live_break_total_at(now)),
        |report| (report.live_work, report.live_break),
    );
    let block = engine
        .active_block_at(now)
        .map_or("no block", |task| task.label.as_str());
    format!(
        "{:<6} work {}  break {}  [{block}]",
        engine.state().as_str(),
        format_duration(work),
        format_duration(rest)
    )
}
