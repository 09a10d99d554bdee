//! duty-runner: headless front end for the on-call rotation.
//!
//! Usage:
//!   duty-runner --db duty.db --data-dir ./data
//!   duty-runner --db duty.db --date 2026-01-25
//!   duty-runner --db duty.db --month 2026-02
//!   duty-runner --db duty.db --ipc-mode

use anyhow::{Context, Result};
use chrono::NaiveDate;
use duty_core::{
    calendar::CalendarCell,
    command::AdminCommand,
    config::DutyConfig,
    engine::DutyEngine,
    employee::Employee,
    resolver::DutyAssignment,
    store::DutyStore,
};
use std::env;
use std::io::{self, BufRead, Write};

const UPCOMING_WEEKS: usize = 4;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    Today,
    Resolve { date: NaiveDate },
    Week { date: NaiveDate },
    Month { year: i32, month: u32 },
    Upcoming { from: NaiveDate, count: usize },
    Directory,
    Substitutions,
    Command { command: AdminCommand },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = arg_value(&args, "--db").unwrap_or("duty.db");
    let data_dir = arg_value(&args, "--data-dir").unwrap_or("./data");

    let config = DutyConfig::load(data_dir)?;
    let store = DutyStore::open(db)?;
    store.migrate()?;
    let engine = DutyEngine::new(config, store);

    if ipc_mode {
        return run_ipc_loop(&engine);
    }

    if let Some(month) = arg_value(&args, "--month") {
        let (year, month) = parse_month(month)?;
        print_month(&engine, year, month)?;
        return Ok(());
    }

    let date = match arg_value(&args, "--date") {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("--date expects YYYY-MM-DD, got '{raw}'"))?,
        None => engine.clock.today(),
    };
    print_summary(&engine, date)
}

fn run_ipc_loop(engine: &DutyEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("ipc: unreadable request: {e}");
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };
        if matches!(request, IpcRequest::Quit) {
            break;
        }

        // Domain errors go back to the caller; only I/O failures end the loop.
        match handle_request(engine, request) {
            Ok(response) => writeln!(stdout, "{response}")?,
            Err(e) => {
                log::warn!("ipc: request failed: {e}");
                write_error(&mut stdout, &e.to_string())?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn handle_request(engine: &DutyEngine, request: IpcRequest) -> Result<serde_json::Value> {
    let value = match request {
        IpcRequest::Today => serde_json::to_value(engine.today()?)?,
        IpcRequest::Resolve { date } => serde_json::to_value(engine.resolve(date)?)?,
        IpcRequest::Week { date } => serde_json::to_value(engine.week_of(date)?)?,
        IpcRequest::Month { year, month } => serde_json::to_value(engine.month_grid(year, month)?)?,
        IpcRequest::Upcoming { from, count } => {
            serde_json::to_value(engine.upcoming_weeks(from, count)?)?
        }
        IpcRequest::Directory => serde_json::to_value(engine.directory()?)?,
        IpcRequest::Substitutions => serde_json::to_value(engine.list_coalesced()?)?,
        IpcRequest::Command { command } => serde_json::to_value(engine.apply(command)?)?,
        IpcRequest::Quit => serde_json::Value::Null,
    };
    Ok(value)
}

fn write_error(out: &mut impl Write, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(out, "{err_json}")?;
    out.flush()?;
    Ok(())
}

fn print_summary(engine: &DutyEngine, date: NaiveDate) -> Result<()> {
    let duty = engine.resolve(date)?;
    let directory = engine.directory()?;

    println!("=== ON CALL {} (week {}) ===", duty.date, duty.week_index);
    println!("  primary:    {}", describe(duty.primary.as_ref()));
    println!("  secondary:  {}", describe(duty.secondary.as_ref()));
    println!("  escalation: {}", describe(Some(&directory.escalation)));

    println!();
    println!("=== THIS WEEK ===");
    for day in engine.week_of(date)? {
        println!("  {}", day_line(&day));
    }

    println!();
    println!("=== UPCOMING WEEKS ===");
    for week in engine.upcoming_weeks(date, UPCOMING_WEEKS + 1)?.into_iter().skip(1) {
        println!(
            "  {} (week {:>3}) | {} / {}",
            week.monday,
            week.week_index,
            name(week.primary.as_ref()),
            name(week.secondary.as_ref()),
        );
    }
    Ok(())
}

fn print_month(engine: &DutyEngine, year: i32, month: u32) -> Result<()> {
    let grid = engine.month_grid(year, month)?;
    println!("=== {year}-{month:02} ===");
    for week in grid.weeks() {
        for cell in week {
            if let CalendarCell::Day(day) = cell {
                println!("  {}", day_line(day));
            }
        }
    }

    let subs = engine.list_coalesced()?;
    if !subs.is_empty() {
        println!();
        println!("=== SUBSTITUTIONS ===");
        for s in subs {
            let sub = &s.substitution;
            println!(
                "  #{:<4} {} {:<9} {} → {} ({:?}){}",
                sub.id,
                sub.date,
                sub.slot,
                sub.original_employee_id,
                sub.substitute_employee_id,
                s.range_type,
                sub.reason.as_deref().map(|r| format!(" {r}")).unwrap_or_default(),
            );
        }
    }
    Ok(())
}

fn day_line(day: &DutyAssignment) -> String {
    let mark = |sub: Option<i64>| if sub.is_some() { "*" } else { "" };
    format!(
        "{} {} | {}{} / {}{}",
        day.date,
        day.date.format("%a"),
        name(day.primary.as_ref()),
        mark(day.primary_substitution),
        name(day.secondary.as_ref()),
        mark(day.secondary_substitution),
    )
}

fn name(employee: Option<&Employee>) -> &str {
    employee.map(|e| e.name.as_str()).unwrap_or("—")
}

fn describe(employee: Option<&Employee>) -> String {
    match employee {
        Some(e) => {
            let contacts: Vec<&str> = [e.phone.as_deref(), e.telegram.as_deref()]
                .into_iter()
                .flatten()
                .collect();
            if contacts.is_empty() {
                e.name.clone()
            } else {
                format!("{} ({})", e.name, contacts.join(", "))
            }
        }
        None => "—".to_string(),
    }
}

fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let (year, month) = raw
        .split_once('-')
        .with_context(|| format!("--month expects YYYY-MM, got '{raw}'"))?;
    Ok((year.parse()?, month.parse()?))
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
