//! Processing period model

use chrono::{Datelike, Local, NaiveDate};

/// Calendar month a collection run belongs to.
///
/// Forecast pages only print a day-of-month, so the period supplies the
/// month and year. It also names the dataset file a run merges into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingPeriod {
    pub year: i32,
    /// 1-based month
    pub month: u32,
}

impl ProcessingPeriod {
    #[must_use]
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Period of the local calendar date
    #[must_use]
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self::new(today.year(), today.month())
    }

    /// The following month, wrapping December into January of the next year
    #[must_use]
    pub fn next(self) -> Self {
        if self.month >= 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Date for a day-of-month in this period, `None` if the day does not exist
    #[must_use]
    pub fn date(self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_wraps_year() {
        assert_eq!(ProcessingPeriod::new(2026, 10).next(), ProcessingPeriod::new(2026, 11));
        assert_eq!(ProcessingPeriod::new(2026, 12).next(), ProcessingPeriod::new(2027, 1));
    }

    #[test]
    fn test_date_rejects_impossible_day() {
        let period = ProcessingPeriod::new(2026, 2);
        assert_eq!(
            period.date(28),
            NaiveDate::from_ymd_opt(2026, 2, 28)
        );
        assert!(period.date(30).is_none());
        assert!(period.date(0).is_none());
    }
}
