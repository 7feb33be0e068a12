//! Bookable time slots.

use chrono::Weekday;

/// Every slot a trial class can be booked in.
pub const TIMESLOTS: [&str; 6] = ["5:30", "6:30", "7:30", "16:30", "18:00", "19:00"];

/// The early class that does not run on Tuesdays and Thursdays.
pub const EARLY_SLOT: &str = "5:30";

/// Read-only view over [`TIMESLOTS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeslotCatalog;

impl TimeslotCatalog {
    pub fn contains(&self, slot: &str) -> bool {
        self.iter().any(|known| known == slot)
    }

    /// Whether `slot` actually runs on `weekday`.
    pub fn runs_on(&self, slot: &str, weekday: Weekday) -> bool {
        !(slot == EARLY_SLOT && matches!(weekday, Weekday::Tue | Weekday::Thu))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> {
        TIMESLOTS.iter().copied()
    }
}
