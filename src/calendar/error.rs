use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("date {0} is earlier than today")]
    DateInPast(NaiveDate),
    #[error("slot {time} on {date} is already booked")]
    SlotUnavailable { date: NaiveDate, time: NaiveTime },
    #[error("no event with id {0}")]
    EventNotFound(String),
    #[error("event {event_id} has no reminder at index {index}")]
    ReminderNotFound { event_id: String, index: usize },
    #[error("invalid time range {start}-{end}: times must fall on 15-minute boundaries with start before end")]
    InvalidTimeRange { start: NaiveTime, end: NaiveTime },
}
