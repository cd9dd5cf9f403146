pub mod calendar;
pub mod storage;

pub use calendar::{Calendar, CalendarError, Event, Reminder, ReminderKind};
pub use calendar::{Clock, FixedClock, SystemClock};
