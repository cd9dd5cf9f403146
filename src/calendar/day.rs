use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::calendar::error::CalendarError;

pub const SLOT_MINUTES: u32 = 15;
pub const SLOTS_PER_DAY: usize = 96;

/// Occupancy table for one calendar date: 96 fixed 15-minute slots,
/// keyed by slot start time, each holding the booking event's id or nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Day {
    date: NaiveDate,
    slots: BTreeMap<NaiveTime, Option<String>>,
}

/// Rejects ranges the slot grid cannot represent: times off the 15-minute
/// boundary, times with a seconds component, or start >= end.
pub fn validate_range(start: NaiveTime, end: NaiveTime) -> Result<(), CalendarError> {
    let on_grid = |t: NaiveTime| t.second() == 0 && t.nanosecond() == 0 && t.minute() % SLOT_MINUTES == 0;
    if start >= end || !on_grid(start) || !on_grid(end) {
        return Err(CalendarError::InvalidTimeRange { start, end });
    }
    Ok(())
}

fn slot_starts(start: NaiveTime, end: NaiveTime) -> impl Iterator<Item = NaiveTime> {
    let first = start.hour() * 60 + start.minute();
    let last = end.hour() * 60 + end.minute();
    (first..last)
        .step_by(SLOT_MINUTES as usize)
        .filter_map(|minute| NaiveTime::from_hms_opt(minute / 60, minute % 60, 0))
}

impl Day {
    pub fn new(date: NaiveDate) -> Self {
        let slots = (0..SLOTS_PER_DAY as u32)
            .filter_map(|i| NaiveTime::from_hms_opt(i * SLOT_MINUTES / 60, i * SLOT_MINUTES % 60, 0))
            .map(|slot| (slot, None))
            .collect();

        Self { date, slots }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Books every slot in [start, end) for `event_id`. The whole range is
    /// checked before any slot is written, so a rejected booking changes
    /// nothing.
    pub fn add_event(
        &mut self,
        event_id: &str,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<(), CalendarError> {
        validate_range(start, end)?;

        for slot in slot_starts(start, end) {
            if let Some(Some(occupant)) = self.slots.get(&slot)
                && occupant != event_id
            {
                return Err(CalendarError::SlotUnavailable {
                    date: self.date,
                    time: slot,
                });
            }
        }

        for slot in slot_starts(start, end) {
            if let Some(entry) = self.slots.get_mut(&slot) {
                *entry = Some(event_id.to_string());
            }
        }

        Ok(())
    }

    /// Frees every slot booked by `event_id`.
    pub fn delete_event(&mut self, event_id: &str) -> Result<(), CalendarError> {
        let mut cleared = false;
        for entry in self.slots.values_mut() {
            if entry.as_deref() == Some(event_id) {
                *entry = None;
                cleared = true;
            }
        }

        if cleared {
            Ok(())
        } else {
            Err(CalendarError::EventNotFound(event_id.to_string()))
        }
    }

    /// Moves an existing booking to [start, end). The new range is validated
    /// while treating the event's own slots as free, so a rejected move
    /// leaves the old booking in place.
    pub fn update_event(
        &mut self,
        event_id: &str,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<(), CalendarError> {
        validate_range(start, end)?;

        if !self.holds_event(event_id) {
            return Err(CalendarError::EventNotFound(event_id.to_string()));
        }

        for slot in slot_starts(start, end) {
            if let Some(Some(occupant)) = self.slots.get(&slot)
                && occupant != event_id
            {
                return Err(CalendarError::SlotUnavailable {
                    date: self.date,
                    time: slot,
                });
            }
        }

        for entry in self.slots.values_mut() {
            if entry.as_deref() == Some(event_id) {
                *entry = None;
            }
        }
        for slot in slot_starts(start, end) {
            if let Some(entry) = self.slots.get_mut(&slot) {
                *entry = Some(event_id.to_string());
            }
        }

        Ok(())
    }

    pub fn holds_event(&self, event_id: &str) -> bool {
        self.slots
            .values()
            .any(|entry| entry.as_deref() == Some(event_id))
    }

    /// Unbooked slot start times in chronological order.
    pub fn available_slots(&self) -> Vec<NaiveTime> {
        self.slots
            .iter()
            .filter(|(_, entry)| entry.is_none())
            .map(|(slot, _)| *slot)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_day() -> Day {
        Day::new(NaiveDate::from_ymd_opt(2099, 1, 1).unwrap())
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot(index: usize) -> NaiveTime {
        let minutes = index as u32 * SLOT_MINUTES;
        time(minutes / 60, minutes % 60)
    }

    #[test]
    fn new_day_has_96_free_slots() {
        let day = test_day();
        let available = day.available_slots();

        assert_eq!(available.len(), SLOTS_PER_DAY);
        assert_eq!(available[0], time(0, 0));
        assert_eq!(available[SLOTS_PER_DAY - 1], time(23, 45));
    }

    #[test]
    fn available_slots_are_chronological() {
        let day = test_day();
        let available = day.available_slots();

        assert!(available.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn add_event_books_every_slot_in_range() {
        let mut day = test_day();
        day.add_event("ev1", time(9, 0), time(10, 0)).unwrap();

        let available = day.available_slots();
        for booked in [time(9, 0), time(9, 15), time(9, 30), time(9, 45)] {
            assert!(!available.contains(&booked));
        }
        assert!(available.contains(&time(8, 45)));
        assert!(available.contains(&time(10, 0)));
    }

    #[test]
    fn add_event_fails_on_occupied_slot() {
        let mut day = test_day();
        day.add_event("ev1", time(9, 0), time(10, 0)).unwrap();

        let result = day.add_event("ev2", time(9, 30), time(10, 30));

        assert_eq!(
            result,
            Err(CalendarError::SlotUnavailable {
                date: day.date(),
                time: time(9, 30),
            })
        );
    }

    #[test]
    fn rejected_add_books_nothing() {
        let mut day = test_day();
        day.add_event("ev1", time(10, 0), time(10, 30)).unwrap();

        // ev2's head slots are free but its tail collides with ev1
        let result = day.add_event("ev2", time(9, 0), time(10, 15));
        assert!(result.is_err());

        let available = day.available_slots();
        for untouched in [time(9, 0), time(9, 15), time(9, 30), time(9, 45)] {
            assert!(available.contains(&untouched));
        }
    }

    #[test]
    fn add_event_over_own_slots_succeeds() {
        let mut day = test_day();
        day.add_event("ev1", time(9, 0), time(10, 0)).unwrap();

        day.add_event("ev1", time(9, 0), time(10, 0)).unwrap();
    }

    #[test]
    fn delete_event_frees_all_its_slots() {
        let mut day = test_day();
        day.add_event("ev1", time(9, 0), time(10, 0)).unwrap();

        day.delete_event("ev1").unwrap();

        assert_eq!(day.available_slots().len(), SLOTS_PER_DAY);
    }

    #[test]
    fn delete_unknown_event_fails() {
        let mut day = test_day();

        let result = day.delete_event("ghost");

        assert_eq!(result, Err(CalendarError::EventNotFound("ghost".to_string())));
    }

    #[test]
    fn update_event_moves_booking() {
        let mut day = test_day();
        day.add_event("ev1", time(9, 0), time(10, 0)).unwrap();

        day.update_event("ev1", time(14, 0), time(15, 0)).unwrap();

        let available = day.available_slots();
        assert!(available.contains(&time(9, 0)));
        assert!(!available.contains(&time(14, 0)));
        assert!(!available.contains(&time(14, 45)));
    }

    #[test]
    fn update_event_may_overlap_its_own_old_range() {
        let mut day = test_day();
        day.add_event("ev1", time(9, 0), time(10, 0)).unwrap();

        day.update_event("ev1", time(9, 30), time(10, 30)).unwrap();

        let available = day.available_slots();
        assert!(available.contains(&time(9, 0)));
        assert!(available.contains(&time(9, 15)));
        assert!(!available.contains(&time(9, 30)));
        assert!(!available.contains(&time(10, 15)));
    }

    #[test]
    fn rejected_update_keeps_old_booking() {
        let mut day = test_day();
        day.add_event("ev1", time(9, 0), time(10, 0)).unwrap();
        day.add_event("ev2", time(14, 0), time(15, 0)).unwrap();

        let result = day.update_event("ev1", time(14, 30), time(15, 30));
        assert!(result.is_err());

        let available = day.available_slots();
        assert!(!available.contains(&time(9, 0)));
        assert!(!available.contains(&time(9, 45)));
    }

    #[test]
    fn update_unknown_event_fails() {
        let mut day = test_day();

        let result = day.update_event("ghost", time(9, 0), time(10, 0));

        assert_eq!(result, Err(CalendarError::EventNotFound("ghost".to_string())));
    }

    #[test]
    fn unaligned_start_is_rejected() {
        let mut day = test_day();

        let result = day.add_event("ev1", time(9, 10), time(10, 0));

        assert_eq!(
            result,
            Err(CalendarError::InvalidTimeRange {
                start: time(9, 10),
                end: time(10, 0),
            })
        );
    }

    #[test]
    fn seconds_component_is_rejected() {
        let mut day = test_day();
        let start = NaiveTime::from_hms_opt(9, 0, 30).unwrap();

        let result = day.add_event("ev1", start, time(10, 0));

        assert!(matches!(result, Err(CalendarError::InvalidTimeRange { .. })));
    }

    #[test]
    fn empty_and_inverted_ranges_are_rejected() {
        let mut day = test_day();

        assert!(day.add_event("ev1", time(9, 0), time(9, 0)).is_err());
        assert!(day.add_event("ev1", time(10, 0), time(9, 0)).is_err());
    }

    proptest! {
        #[test]
        fn booking_accounts_for_every_slot(start_index in 0usize..SLOTS_PER_DAY, len in 1usize..=SLOTS_PER_DAY) {
            let len = len.min(SLOTS_PER_DAY - start_index);
            // the grid cannot express an end bound of midnight
            prop_assume!(start_index + len < SLOTS_PER_DAY);

            let mut day = test_day();
            day.add_event("ev1", slot(start_index), slot(start_index + len)).unwrap();

            let available = day.available_slots();
            prop_assert_eq!(available.len(), SLOTS_PER_DAY - len);
            for i in start_index..start_index + len {
                prop_assert!(!available.contains(&slot(i)));
            }
        }

        #[test]
        fn delete_restores_every_booked_slot(start_index in 0usize..SLOTS_PER_DAY, len in 1usize..=SLOTS_PER_DAY) {
            let len = len.min(SLOTS_PER_DAY - start_index);
            prop_assume!(start_index + len < SLOTS_PER_DAY);

            let mut day = test_day();
            day.add_event("ev1", slot(start_index), slot(start_index + len)).unwrap();
            day.delete_event("ev1").unwrap();

            prop_assert_eq!(day.available_slots().len(), SLOTS_PER_DAY);
        }
    }
}
