//! Spoken time of day

use std::fmt;

use chrono::{NaiveTime, Timelike};

/// Coarse part of the day used in the greeting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPart {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl DayPart {
    /// 05-11 morning, 12-16 afternoon, 17-20 evening, otherwise night
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=20 => Self::Evening,
            _ => Self::Night,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}

impl fmt::Display for DayPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Greeting plus 12-hour clock, e.g. "Good evening! The current time is 07:05 PM"
#[must_use]
pub fn time_greeting(time: NaiveTime) -> String {
    let part = DayPart::from_hour(time.hour());
    format!(
        "Good {part}! The current time is {}",
        time.format("%I:%M %p")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn day_part_boundaries() {
        assert_eq!(DayPart::from_hour(4), DayPart::Night);
        assert_eq!(DayPart::from_hour(5), DayPart::Morning);
        assert_eq!(DayPart::from_hour(11), DayPart::Morning);
        assert_eq!(DayPart::from_hour(12), DayPart::Afternoon);
        assert_eq!(DayPart::from_hour(16), DayPart::Afternoon);
        assert_eq!(DayPart::from_hour(17), DayPart::Evening);
        assert_eq!(DayPart::from_hour(20), DayPart::Evening);
        assert_eq!(DayPart::from_hour(21), DayPart::Night);
        assert_eq!(DayPart::from_hour(0), DayPart::Night);
    }

    #[test]
    fn formats_twelve_hour_clock() {
        assert_eq!(
            time_greeting(at(19, 5)),
            "Good evening! The current time is 07:05 PM"
        );
        assert_eq!(
            time_greeting(at(0, 30)),
            "Good night! The current time is 12:30 AM"
        );
        assert_eq!(
            time_greeting(at(12, 0)),
            "Good afternoon! The current time is 12:00 PM"
        );
    }

    #[test]
    fn same_instant_same_sentence() {
        let t = at(9, 41);
        assert_eq!(time_greeting(t), time_greeting(t));
        assert_eq!(time_greeting(t), "Good morning! The current time is 09:41 AM");
    }
}
