//! Plan command for laying out generated focus schedules.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use sf_core::{SessionEngine, Store};

use super::tasks::write_tasks;
use super::util::parse_datetime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CadenceKind {
    /// 25-minute focus, 5-minute breaks, a 30-minute break after every fourth focus.
    Pomodoro,
    /// 90-minute focus, 15-minute breaks.
    Huberman,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Which cadence to generate.
    #[arg(value_enum)]
    pub cadence: CadenceKind,

    /// When the first block starts (ISO 8601, HH:MM or relative).
    #[arg(long, default_value = "now")]
    pub start: String,

    /// Nothing is scheduled past this instant.
    #[arg(long)]
    pub end: String,

    /// Focus hours to fit between start and end.
    #[arg(long)]
    pub hours: f64,
}

pub fn run<W: Write, S: Store>(
    writer: &mut W,
    engine: &mut SessionEngine<S>,
    args: &PlanArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let clock = *engine.clock();
    let start = parse_datetime(&args.start, now, &clock)?;
    let end = parse_datetime(&args.end, now, &clock)?;
    if end <= start {
        bail!("end must be after start");
    }
    if !args.hours.is_finite() || args.hours <= 0.0 {
        bail!("hours must be a positive number, got {}", args.hours);
    }

    let total_focus = args.hours * 3600.0;
    let (count, name) = match args.cadence {
        CadenceKind::Pomodoro => (engine.generate_pomodoro_at(start, end, total_focus), "Pomodoro"),
        CadenceKind::Huberman => (engine.generate_huberman_at(start, end, total_focus), "Huberman"),
    };
    let day = clock.day_of(start);
    tracing::debug!(cadence = name, count, %day, "planned schedule");

    writeln!(writer, "Planned {count} {name} blocks on {day}")?;
    writeln!(writer)?;
    write_tasks(writer, engine, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use insta::assert_snapshot;
    use sf_core::{EngineConfig, MemoryStore};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    fn plan(
        engine: &mut SessionEngine<MemoryStore>,
        cadence: CadenceKind,
        hours: f64,
    ) -> Result<String> {
        let args = PlanArgs {
            cadence,
            start: "2026-03-02T09:00:00Z".to_string(),
            end: "2026-03-02T12:00:00Z".to_string(),
            hours,
        };
        let mut output = Vec::new();
        run(&mut output, engine, &args, at(8, 0))?;
        Ok(String::from_utf8(output)?)
    }

    #[test]
    fn huberman_plan_lists_the_new_blocks() {
        let mut engine = SessionEngine::new(MemoryStore::new(), EngineConfig::default(), at(8, 0));
        let output = plan(&mut engine, CadenceKind::Huberman, 2.0).unwrap();

        assert_snapshot!(output, @r"
        Planned 3 Huberman blocks on 2026-03-02

        BLOCKS 2026-03-02

        ID        Start  End     Length  Category      Label
        ────────  ─────  ─────  ───────  ────────────  ──────────────────────
        26d1e029  09:00  10:30  1:30:00  Focus         Huberman Focus Block
        93f4f9c9  10:30  10:45    15:00  Free Time     Huberman Break Block
        e0caa976  10:45  11:15    30:00  Focus         Huberman Focus Block
        ");
    }

    #[test]
    fn replanning_replaces_earlier_blocks() {
        let mut engine = SessionEngine::new(MemoryStore::new(), EngineConfig::default(), at(8, 0));
        plan(&mut engine, CadenceKind::Pomodoro, 2.0).unwrap();
        let output = plan(&mut engine, CadenceKind::Pomodoro, 1.0).unwrap();

        assert!(output.starts_with("Planned 5 Pomodoro blocks on 2026-03-02\n"));
        assert_eq!(engine.selected_tasks().len(), 5);
    }

    #[test]
    fn rejects_inverted_ranges_and_bad_hours() {
        let mut engine = SessionEngine::new(MemoryStore::new(), EngineConfig::default(), at(8, 0));
        assert!(plan(&mut engine, CadenceKind::Pomodoro, 0.0).is_err());
        assert!(plan(&mut engine, CadenceKind::Pomodoro, f64::NAN).is_err());

        let args = PlanArgs {
            cadence: CadenceKind::Pomodoro,
            start: "11:00".to_string(),
            end: "10:00".to_string(),
            hours: 1.0,
        };
        let err = run(&mut Vec::new(), &mut engine, &args, at(8, 0)).unwrap_err();
        assert_eq!(err.to_string(), "end must be after start");
        assert!(engine.selected_tasks().is_empty());
    }
}
