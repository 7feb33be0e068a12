//! Input validation for the booking form.
//!
//! # Data Flow
//! ```text
//! JSON body
//!     → ScheduleSubmission (untyped object)
//!     → schedule.rs (per-field clean rules)
//!     → Ok(CleanedSchedule) | Err(FieldErrors)
//! ```

pub mod schedule;
pub mod timeslot;

pub use schedule::{validate, CleanedSchedule, FieldErrors, ScheduleSubmission};
pub use timeslot::{TimeslotCatalog, TIMESLOTS};
