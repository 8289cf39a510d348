//! Production window resolution and time slot partitioning.

mod slots;
mod window;

pub use crate::period::{last_day_of_month, next_year_start};
pub use slots::{next_time_slot, time_slots, TimeSlot, TimeSlots};
pub use window::{combine_pair_windows, resolve_effective_window, resolve_sensor_window, PlanError};
