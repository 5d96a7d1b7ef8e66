//! # Time-of-day Greeting
//!
//! A pure lookup from local hour-of-day to a fixed greeting string. The
//! bands are contiguous and exhaustive over all 24 hours:
//!
//! | Hours   | Greeting          |
//! |---------|-------------------|
//! | 0..5    | Good night!       |
//! | 5..11   | Good morning!     |
//! | 11..14  | Lunchtime!        |
//! | 14..18  | Good afternoon!   |
//! | 18..22  | Good evening!     |
//! | 22..24  | Good night!       |
//!
//! There is no localization framework; this table is the entire greeting
//! vocabulary.

use chrono::{DateTime, Local, Timelike};

/// Greeting for the given instant's local hour.
pub fn greeting(now: DateTime<Local>) -> &'static str {
    greeting_for_hour(now.hour())
}

/// Band lookup by hour (0-23). Hours outside that range cannot occur with
/// `chrono`, but the catch-all arm keeps the match total anyway.
pub fn greeting_for_hour(hour: u32) -> &'static str {
    match hour {
        5..=10 => "Good morning!",
        11..=13 => "Lunchtime!",
        14..=17 => "Good afternoon!",
        18..=21 => "Good evening!",
        _ => "Good night!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_exhaustive_over_24_hours() {
        // Every hour selects exactly one greeting (the function is total,
        // so this is really a "no panic, non-empty" sweep)
        for hour in 0..24 {
            assert!(!greeting_for_hour(hour).is_empty(), "hour {hour}");
        }
    }

    #[test]
    fn band_boundaries_are_deterministic() {
        assert_eq!(greeting_for_hour(0), "Good night!");
        assert_eq!(greeting_for_hour(4), "Good night!");
        assert_eq!(greeting_for_hour(5), "Good morning!");
        assert_eq!(greeting_for_hour(10), "Good morning!");
        assert_eq!(greeting_for_hour(11), "Lunchtime!");
        assert_eq!(greeting_for_hour(13), "Lunchtime!");
        assert_eq!(greeting_for_hour(14), "Good afternoon!");
        assert_eq!(greeting_for_hour(17), "Good afternoon!");
        assert_eq!(greeting_for_hour(18), "Good evening!");
        assert_eq!(greeting_for_hour(21), "Good evening!");
        assert_eq!(greeting_for_hour(22), "Good night!");
        assert_eq!(greeting_for_hour(23), "Good night!");
    }
}
