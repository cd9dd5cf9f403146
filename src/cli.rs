use std::{
    env,
    io::{self, Write},
    process::{Command, Stdio},
};

use chrono::{Days, Local, NaiveDate, NaiveTime};

use slotcal::{
    calendar::{Calendar, Event},
    storage::config::Config,
};

#[derive(Clone, Copy)]
pub enum CliMode {
    Default,
    Agenda(NaiveDate),
    Slots(NaiveDate),
    Events {
        start: NaiveDate,
        end: NaiveDate,
        json: bool,
    },
}

#[derive(Clone, Copy)]
pub struct CliArgs {
    pub mode: CliMode,
    pub force_sample: bool,
}

pub fn parse_cli_mode() -> Result<CliArgs, String> {
    let mut force_sample = false;
    let mut agenda_date = None;
    let mut slots_date = None;
    let mut events_range = None;
    let mut json = false;
    let mut args = env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sample" => {
                force_sample = true;
            }
            "--agenda" => {
                agenda_date = Some(parse_optional_date(&mut args)?);
            }
            "--slots" => {
                slots_date = Some(parse_optional_date(&mut args)?);
            }
            "--events" => {
                let start_str = args.next().ok_or("Missing start date for --events")?;
                let end_str = args.next().ok_or("Missing end date for --events")?;
                events_range = Some((parse_date(&start_str)?, parse_date(&end_str)?));
            }
            "--json" => {
                json = true;
            }
            "--help" => {
                println!("{}", usage());
                std::process::exit(0);
            }
            _ => return Err(format!("Unknown argument: {}", arg)),
        }
    }

    let mode = if let Some((start, end)) = events_range {
        CliMode::Events { start, end, json }
    } else if let Some(date) = agenda_date {
        CliMode::Agenda(date)
    } else if let Some(date) = slots_date {
        CliMode::Slots(date)
    } else {
        CliMode::Default
    };

    Ok(CliArgs { mode, force_sample })
}

pub fn usage() -> String {
    "Usage: slotcal [--agenda [YYYY/MM/DD]] [--slots [YYYY/MM/DD]] [--events YYYY/MM/DD YYYY/MM/DD [--json]] [--sample]".to_string()
}

fn parse_optional_date(
    args: &mut std::iter::Peekable<impl Iterator<Item = String>>,
) -> Result<NaiveDate, String> {
    if let Some(next) = args.peek()
        && !next.starts_with("--")
    {
        let date_str = args.next().expect("peeked value must exist");
        parse_date(&date_str)
    } else {
        Ok(Local::now().date_naive())
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date_str, "%Y/%m/%d")
        .map_err(|_| format!("Invalid date '{}'. Use YYYY/MM/DD.", date_str))
}

pub fn run(args: CliArgs) -> Result<(), io::Error> {
    let config = Config::load_or_create().map_err(|e| io::Error::other(e.to_string()))?;

    let mut calendar = Calendar::new();
    if config.agenda.seed_sample_events || args.force_sample {
        crate::sample_events::seed_sample_events(&mut calendar);
    }

    match args.mode {
        CliMode::Default => {
            let today = Local::now().date_naive();
            let end = today
                .checked_add_days(Days::new(config.agenda.default_window_days as u64))
                .unwrap_or(today);
            run_events(&calendar, &config, today, end, false)
        }
        CliMode::Agenda(date) => run_agenda(&calendar, &config, date),
        CliMode::Slots(date) => run_slots(&calendar, &config, date),
        CliMode::Events { start, end, json } => run_events(&calendar, &config, start, end, json),
    }
}

fn run_agenda(calendar: &Calendar, config: &Config, date: NaiveDate) -> Result<(), io::Error> {
    let grouped = calendar.find_events(date, date);
    let events = grouped.get(&date).map(Vec::as_slice).unwrap_or(&[]);
    let agenda = format_agenda_text(config, date, events);
    display_with_pager(&agenda)
}

fn run_slots(calendar: &Calendar, config: &Config, date: NaiveDate) -> Result<(), io::Error> {
    let slots = calendar.find_available_slots(date);
    println!("{}", format_slots_text(config, date, &slots));
    Ok(())
}

fn run_events(
    calendar: &Calendar,
    config: &Config,
    start: NaiveDate,
    end: NaiveDate,
    json: bool,
) -> Result<(), io::Error> {
    let grouped = calendar.find_events(start, end);

    if json {
        let rendered = serde_json::to_string_pretty(&grouped)
            .map_err(|e| io::Error::other(e.to_string()))?;
        println!("{rendered}");
        return Ok(());
    }

    let mut lines = Vec::new();
    if grouped.is_empty() {
        lines.push("No events in this range.".to_string());
    }
    for (date, events) in &grouped {
        lines.push(date.format(&config.display.date_format).to_string());
        for event in events {
            lines.push(format!("  {}", build_agenda_line(config, event)));
        }
        lines.push(String::new());
    }
    println!("{}", lines.join("\n"));
    Ok(())
}

fn format_agenda_text(config: &Config, date: NaiveDate, events: &[&Event]) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Agenda for {}", date.format("%A, %B %d, %Y")));
    lines.push(String::new());

    if events.is_empty() {
        lines.push("No events scheduled.".to_string());
    } else {
        for event in events {
            lines.push(format!("- {}", build_agenda_line(config, event)));
            for reminder in &event.reminders {
                lines.push(format!("    {}", reminder));
            }
        }
    }

    lines.join("\n")
}

fn format_slots_text(config: &Config, date: NaiveDate, slots: &[NaiveTime]) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "Free slots on {}",
        date.format(&config.display.date_format)
    ));
    lines.push(String::new());

    if slots.is_empty() {
        lines.push("Nothing scheduled on this date yet; every slot is free.".to_string());
    } else {
        for chunk in slots.chunks(8) {
            let row: Vec<String> = chunk
                .iter()
                .map(|slot| slot.format(&config.display.time_format).to_string())
                .collect();
            lines.push(row.join("  "));
        }
    }

    lines.join("\n")
}

fn build_agenda_line(config: &Config, event: &Event) -> String {
    let time_label = format!(
        "{}-{}",
        event.start.format(&config.display.time_format),
        event.end.format(&config.display.time_format)
    );

    let mut line = format!("{:<13} {}", time_label, event.title);
    if !event.description.is_empty() {
        line.push_str(&format!(" ({})", event.description));
    }
    line
}

fn display_with_pager(text: &str) -> Result<(), io::Error> {
    let pager_value = env::var("PAGER").unwrap_or_else(|_| "less".to_string());
    let mut parts = pager_value.split_whitespace();
    let cmd = match parts.next() {
        Some(c) => c,
        None => {
            print!("{text}");
            return Ok(());
        }
    };
    let args: Vec<&str> = parts.collect();

    match Command::new(cmd)
        .args(&args)
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(mut child) => {
            if let Some(stdin) = child.stdin.as_mut() {
                stdin.write_all(text.as_bytes())?;
            }
            let _ = child.wait();
        }
        Err(_) => {
            print!("{text}");
        }
    }

    Ok(())
}
