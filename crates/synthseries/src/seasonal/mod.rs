//! Seasonal factors - calendar effects
//!
//! Weekday and public-holiday effects. Both depend only on the calendar
//! date, the holiday factor additionally on the row's country.

pub mod holiday;
pub mod weekday;

pub use holiday::HolidayFactor;
pub use weekday::WeekdayFactor;
