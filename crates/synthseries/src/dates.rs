//! Ordered date axis of a generated series.

use crate::{GeneratorError, Result};
use chrono::{Days, NaiveDate};

/// Non-empty, strictly increasing sequence of dates.
///
/// Inclusive day ranges are stored as their bounds and never materialized,
/// so a huge range costs nothing until the generator walks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    axis: Axis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Axis {
    Daily {
        start: NaiveDate,
        end: NaiveDate,
        len: usize,
    },
    Listed(Vec<NaiveDate>),
}

impl DateRange {
    /// Every calendar day from `start` to `end`, both inclusive.
    pub fn inclusive(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(GeneratorError::InvalidRange(format!(
                "start {start} is after end {end}"
            )));
        }
        let len = usize::try_from((end - start).num_days())
            .ok()
            .and_then(|days| days.checked_add(1))
            .ok_or_else(|| {
                GeneratorError::InvalidRange(format!("range {start} to {end} is too long"))
            })?;
        Ok(Self {
            axis: Axis::Daily { start, end, len },
        })
    }

    /// An explicit list of dates, which must be non-empty and strictly increasing.
    pub fn from_dates(dates: Vec<NaiveDate>) -> Result<Self> {
        if dates.is_empty() {
            return Err(GeneratorError::InvalidRange("no dates given".to_string()));
        }
        if let Some(pair) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(GeneratorError::InvalidRange(format!(
                "dates must be strictly increasing, found {} followed by {}",
                pair[0], pair[1]
            )));
        }
        Ok(Self {
            axis: Axis::Listed(dates),
        })
    }

    /// First date.
    pub fn start(&self) -> NaiveDate {
        match &self.axis {
            Axis::Daily { start, .. } => *start,
            Axis::Listed(dates) => dates[0],
        }
    }

    /// Last date.
    pub fn end(&self) -> NaiveDate {
        match &self.axis {
            Axis::Daily { end, .. } => *end,
            Axis::Listed(dates) => dates[dates.len() - 1],
        }
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        match &self.axis {
            Axis::Daily { len, .. } => *len,
            Axis::Listed(dates) => dates.len(),
        }
    }

    /// Always false; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Date at ordinal `index`, if in range.
    pub fn get(&self, index: usize) -> Option<NaiveDate> {
        match &self.axis {
            Axis::Daily { start, len, .. } if index < *len => {
                start.checked_add_days(Days::new(index as u64))
            }
            Axis::Daily { .. } => None,
            Axis::Listed(dates) => dates.get(index).copied(),
        }
    }

    /// Iterate the dates in order.
    pub fn iter(&self) -> DateIter<'_> {
        DateIter {
            range: self,
            next: 0,
        }
    }

    /// Ordinal position of `date` in the range, if present.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        match &self.axis {
            Axis::Daily { start, end, .. } if (*start..=*end).contains(&date) => {
                usize::try_from((date - *start).num_days()).ok()
            }
            Axis::Daily { .. } => None,
            Axis::Listed(dates) => dates.binary_search(&date).ok(),
        }
    }
}

/// Iterator over the dates of a [`DateRange`].
#[derive(Debug, Clone)]
pub struct DateIter<'a> {
    range: &'a DateRange,
    next: usize,
}

impl Iterator for DateIter<'_> {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let date = self.range.get(self.next)?;
        self.next += 1;
        Some(date)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.range.len().saturating_sub(self.next);
        (left, Some(left))
    }
}

impl ExactSizeIterator for DateIter<'_> {}

impl<'a> IntoIterator for &'a DateRange {
    type Item = NaiveDate;
    type IntoIter = DateIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_inclusive_range() {
        let range = DateRange::inclusive(date(2024, 2, 27), date(2024, 3, 1)).unwrap();
        assert_eq!(range.len(), 4);
        assert_eq!(range.start(), date(2024, 2, 27));
        assert_eq!(range.end(), date(2024, 3, 1));
        assert_eq!(range.position(date(2024, 2, 29)), Some(2));
        assert_eq!(range.position(date(2024, 3, 2)), None);
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::inclusive(date(2024, 1, 1), date(2024, 1, 1)).unwrap();
        assert_eq!(range.len(), 1);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let err = DateRange::inclusive(date(2024, 1, 2), date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidRange(_)));
    }

    #[test]
    fn test_explicit_dates_must_increase() {
        assert!(DateRange::from_dates(vec![]).is_err());
        assert!(DateRange::from_dates(vec![date(2024, 1, 1), date(2024, 1, 1)]).is_err());
        assert!(DateRange::from_dates(vec![date(2024, 1, 2), date(2024, 1, 1)]).is_err());

        let range = DateRange::from_dates(vec![date(2024, 1, 1), date(2024, 1, 8)]).unwrap();
        assert_eq!(range.len(), 2);
        assert_eq!(range.position(date(2024, 1, 8)), Some(1));
        assert_eq!(range.iter().collect::<Vec<_>>(), [date(2024, 1, 1), date(2024, 1, 8)]);
    }

    #[test]
    fn test_wide_range_is_not_materialized() {
        let start = NaiveDate::from_ymd_opt(-200_000, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(200_000, 12, 31).unwrap();
        let range = DateRange::inclusive(start, end).unwrap();

        assert_eq!(range.len(), (end - start).num_days() as usize + 1);
        assert_eq!(range.get(range.len() - 1), Some(end));
        assert_eq!(range.get(range.len()), None);
        assert_eq!(range.position(end), Some(range.len() - 1));
    }

    #[test]
    fn test_iter_walks_every_day() {
        let range = DateRange::inclusive(date(2024, 2, 27), date(2024, 3, 1)).unwrap();
        let days: Vec<NaiveDate> = range.iter().collect();
        assert_eq!(
            days,
            [date(2024, 2, 27), date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)]
        );
        assert_eq!(range.iter().len(), 4);
    }
}
