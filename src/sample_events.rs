use chrono::{Local, NaiveTime};

use slotcal::calendar::{Calendar, ReminderKind};

pub fn seed_sample_events(calendar: &mut Calendar) {
    let today = Local::now().date_naive();

    let Some(tomorrow) = today.succ_opt() else { return };
    let Some(next_day) = tomorrow.succ_opt() else { return };

    let events = vec![
        ("Morning Standup", "Daily team sync", today, (9, 0), (9, 30)),
        ("Team Sync", "Cross-team planning", today, (14, 0), (15, 0)),
        ("Code Review", "Go through open changes", tomorrow, (10, 0), (11, 0)),
        ("Sprint Planning", "Scope the next sprint", tomorrow, (15, 0), (16, 30)),
        ("1-on-1 with Manager", "Career check-in", next_day, (11, 0), (11, 30)),
    ];

    for (title, description, date, (start_h, start_m), (end_h, end_m)) in events {
        let Some(start) = NaiveTime::from_hms_opt(start_h, start_m, 0) else { continue };
        let Some(end) = NaiveTime::from_hms_opt(end_h, end_m, 0) else { continue };

        let event_id = match calendar.add_event(title, description, date, start, end) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Skipping sample event {}: {}", title, e);
                continue;
            }
        };

        if title == "Sprint Planning"
            && let Some(remind_at) = date.and_hms_opt(8, 0, 0)
        {
            let _ = calendar.add_reminder(&event_id, remind_at, ReminderKind::Email);
        }
    }
}
