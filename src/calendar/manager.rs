use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::calendar::clock::{Clock, SystemClock};
use crate::calendar::day::{self, Day};
use crate::calendar::error::CalendarError;
use crate::calendar::event::{Event, Reminder, ReminderKind};

/// Aggregate root: owns all events and the per-date slot tables, and keeps
/// them consistent. Days are created on first booking and never removed.
pub struct Calendar {
    days: HashMap<NaiveDate, Day>,
    events: HashMap<String, Event>,
    clock: Box<dyn Clock>,
}

impl Calendar {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            days: HashMap::new(),
            events: HashMap::new(),
            clock,
        }
    }

    /// Schedules a new event and returns its generated id. No state changes
    /// on failure, apart from the lazily created (still empty) Day.
    pub fn add_event(
        &mut self,
        title: &str,
        description: &str,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<String, CalendarError> {
        day::validate_range(start, end)?;

        if date < self.clock.today() {
            return Err(CalendarError::DateInPast(date));
        }

        let event = Event::new(title, description, date, start, end);
        let day = self.days.entry(date).or_insert_with(|| Day::new(date));
        day.add_event(&event.id, start, end)?;

        let event_id = event.id.clone();
        tracing::info!("Created event {} ({} on {})", event_id, title, date);
        self.events.insert(event_id.clone(), event);

        Ok(event_id)
    }

    pub fn add_reminder(
        &mut self,
        event_id: &str,
        date_time: NaiveDateTime,
        kind: ReminderKind,
    ) -> Result<(), CalendarError> {
        let event = self
            .events
            .get_mut(event_id)
            .ok_or_else(|| CalendarError::EventNotFound(event_id.to_string()))?;

        event.reminders.push(Reminder::new(date_time, kind));
        Ok(())
    }

    pub fn delete_reminder(&mut self, event_id: &str, index: usize) -> Result<(), CalendarError> {
        let event = self
            .events
            .get_mut(event_id)
            .ok_or_else(|| CalendarError::EventNotFound(event_id.to_string()))?;

        if index >= event.reminders.len() {
            return Err(CalendarError::ReminderNotFound {
                event_id: event_id.to_string(),
                index,
            });
        }

        event.reminders.remove(index);
        Ok(())
    }

    pub fn list_reminders(&self, event_id: &str) -> Result<&[Reminder], CalendarError> {
        self.events
            .get(event_id)
            .map(|event| event.reminders.as_slice())
            .ok_or_else(|| CalendarError::EventNotFound(event_id.to_string()))
    }

    /// Free slot start times for a date, chronological. A date that never had
    /// an event has no Day and reports every slot free via an empty list.
    pub fn find_available_slots(&self, date: NaiveDate) -> Vec<NaiveTime> {
        self.days
            .get(&date)
            .map(|day| day.available_slots())
            .unwrap_or_default()
    }

    /// Reschedules an event and replaces its fields. On a date change the new
    /// date's slots are booked before the old ones are freed, so a rejected
    /// move leaves the event fully intact.
    pub fn update_event(
        &mut self,
        event_id: &str,
        title: &str,
        description: &str,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<(), CalendarError> {
        day::validate_range(start, end)?;

        let old_date = self
            .events
            .get(event_id)
            .ok_or_else(|| CalendarError::EventNotFound(event_id.to_string()))?
            .date;

        if old_date == date {
            let day = self
                .days
                .get_mut(&date)
                .ok_or_else(|| CalendarError::EventNotFound(event_id.to_string()))?;
            day.update_event(event_id, start, end)?;
        } else {
            let new_day = self.days.entry(date).or_insert_with(|| Day::new(date));
            new_day.add_event(event_id, start, end)?;

            if let Some(old_day) = self.days.get_mut(&old_date) {
                old_day.delete_event(event_id)?;
            }
        }

        if let Some(event) = self.events.get_mut(event_id) {
            event.title = title.to_string();
            event.description = description.to_string();
            event.date = date;
            event.start = start;
            event.end = end;
        }

        tracing::info!("Updated event {} ({} on {})", event_id, title, date);
        Ok(())
    }

    /// Unregisters an event and frees its slots in whichever Day holds them.
    pub fn delete_event(&mut self, event_id: &str) -> Result<(), CalendarError> {
        if self.events.remove(event_id).is_none() {
            return Err(CalendarError::EventNotFound(event_id.to_string()));
        }

        if let Some(day) = self.days.values_mut().find(|day| day.holds_event(event_id)) {
            day.delete_event(event_id)?;
        }

        tracing::info!("Deleted event {}", event_id);
        Ok(())
    }

    /// Events with a date in [start_date, end_date], grouped by date in
    /// chronological order; within a date, sorted by start time.
    pub fn find_events(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> BTreeMap<NaiveDate, Vec<&Event>> {
        let mut grouped: BTreeMap<NaiveDate, Vec<&Event>> = BTreeMap::new();
        for event in self.events.values() {
            if event.date >= start_date && event.date <= end_date {
                grouped.entry(event.date).or_default().push(event);
            }
        }

        for events in grouped.values_mut() {
            events.sort_by_key(|event| event.start);
        }

        grouped
    }

    pub fn get_event(&self, event_id: &str) -> Option<&Event> {
        self.events.get(event_id)
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new()
    }
}
