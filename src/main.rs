use std::{io::IsTerminal, time::SystemTime};

use anyhow::Context;
use clap::Parser;

use firesim::{IgnitionLayout, Position, RunOutcome, SimulationParameters, TextSink};

/// Watch a fire spread across a grid of trees
#[derive(Parser, Debug)]
#[command(name = "firesim", about = "Probabilistic wildfire spread simulation", long_about = None)]
struct Args {
    /// Number of grid rows (1-30)
    #[arg(long, default_value_t = 10)]
    rows: usize,

    /// Number of grid columns (1-70)
    #[arg(long, default_value_t = 10)]
    cols: usize,

    /// Chance in percent that a tree next to a fire catches on a given tick
    #[arg(short = 'p', long, value_name = "PERCENT")]
    ignite_percent: f64,

    /// Seconds a tree burns before turning to ash
    #[arg(short = 't', long, value_name = "SECONDS")]
    burn_seconds: f64,

    /// Cell to set alight at the start; repeat for more than one
    #[arg(short, long = "ignite", value_name = "ROW,COL", value_parser = parse_position)]
    ignite: Vec<Position>,

    /// Log level written to stderr
    #[arg(long, default_value = "warn")]
    log_level: log::LevelFilter,
}

fn parse_position(s: &str) -> Result<Position, String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got '{s}'"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|e| format!("bad row '{row}': {e}"))?;
    let col = col
        .trim()
        .parse()
        .map_err(|e| format!("bad column '{col}': {e}"))?;
    Ok(Position::new(row, col))
}

fn setup_logger(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339_millis(SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logger(args.log_level).context("failed to install logger")?;

    let parameters = SimulationParameters::from_percent(args.ignite_percent, args.burn_seconds)
        .context("invalid simulation parameters")?;

    let mut layout = IgnitionLayout::new(args.rows, args.cols);
    for position in args.ignite {
        if layout.is_lit(position) {
            continue;
        }
        if !layout.toggle(position) {
            anyhow::bail!(
                "ignition point {position} lies outside the {}x{} grid",
                args.rows,
                args.cols
            );
        }
    }

    let stdout = std::io::stdout();
    let clear = stdout.is_terminal();
    let sink = TextSink::new(stdout)
        .clearing_screen(clear)
        .showing_status(true);
    let run = firesim::start(&layout.into_start_config(parameters), sink)
        .context("could not start the simulation")?;

    // Pressing enter stops the fire at the next tick. The reader thread is
    // left blocked on stdin if the fire burns out first.
    let token = run.cancel_token();
    std::thread::spawn(move || {
        let mut line = String::new();
        if matches!(std::io::stdin().read_line(&mut line), Ok(n) if n > 0) {
            token.cancel();
        }
    });

    let report = run.join().context("simulation did not finish cleanly")?;
    match report.outcome {
        RunOutcome::BurnedOut => println!(
            "Fire burned out after {} ticks; {} trees lost.",
            report.ticks, report.burnt
        ),
        RunOutcome::Cancelled => println!(
            "Stopped after {} ticks; {} trees lost so far.",
            report.ticks, report.burnt
        ),
    }
    log::info!(
        "average tick took {}µs",
        report.statistics.average_step_exec_time.as_micros()
    );
    for (name, time) in &report.statistics.segments {
        log::debug!("{name}: {}µs", time.as_micros());
    }
    Ok(())
}
