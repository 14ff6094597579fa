//! Public-holiday calendars.
//!
//! Built-in calendars cover the national holidays of a handful of countries,
//! computed from fixed dates, Easter offsets and nth-weekday rules. Extra
//! holidays can be loaded from CSV (`country, date, name`) on top of them.
//! Observed-day substitution for holidays falling on weekends is not modelled.

use crate::{GeneratorError, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Same month and day every year
    Fixed(u32, u32),
    /// Days relative to Western Easter Sunday
    Easter(i64),
    /// nth weekday of a month; negative counts from the end
    NthWeekday(u32, Weekday, i32),
}

#[derive(Debug)]
struct CountryCalendar {
    code: &'static str,
    name: &'static str,
    holidays: &'static [(Rule, &'static str)],
}

const NETHERLANDS: &[(Rule, &str)] = &[
    (Rule::Fixed(1, 1), "New Year's Day"),
    (Rule::Easter(-2), "Good Friday"),
    (Rule::Easter(0), "Easter Sunday"),
    (Rule::Easter(1), "Easter Monday"),
    (Rule::Fixed(4, 27), "King's Day"),
    (Rule::Fixed(5, 5), "Liberation Day"),
    (Rule::Easter(39), "Ascension Day"),
    (Rule::Easter(49), "Whit Sunday"),
    (Rule::Easter(50), "Whit Monday"),
    (Rule::Fixed(12, 25), "Christmas Day"),
    (Rule::Fixed(12, 26), "Second Day of Christmas"),
];

const GERMANY: &[(Rule, &str)] = &[
    (Rule::Fixed(1, 1), "New Year's Day"),
    (Rule::Easter(-2), "Good Friday"),
    (Rule::Easter(1), "Easter Monday"),
    (Rule::Fixed(5, 1), "Labour Day"),
    (Rule::Easter(39), "Ascension Day"),
    (Rule::Easter(50), "Whit Monday"),
    (Rule::Fixed(10, 3), "German Unity Day"),
    (Rule::Fixed(12, 25), "Christmas Day"),
    (Rule::Fixed(12, 26), "Second Day of Christmas"),
];

const FRANCE: &[(Rule, &str)] = &[
    (Rule::Fixed(1, 1), "New Year's Day"),
    (Rule::Easter(1), "Easter Monday"),
    (Rule::Fixed(5, 1), "Labour Day"),
    (Rule::Fixed(5, 8), "Victory in Europe Day"),
    (Rule::Easter(39), "Ascension Day"),
    (Rule::Easter(50), "Whit Monday"),
    (Rule::Fixed(7, 14), "Bastille Day"),
    (Rule::Fixed(8, 15), "Assumption Day"),
    (Rule::Fixed(11, 1), "All Saints' Day"),
    (Rule::Fixed(11, 11), "Armistice Day"),
    (Rule::Fixed(12, 25), "Christmas Day"),
];

const BELGIUM: &[(Rule, &str)] = &[
    (Rule::Fixed(1, 1), "New Year's Day"),
    (Rule::Easter(1), "Easter Monday"),
    (Rule::Fixed(5, 1), "Labour Day"),
    (Rule::Easter(39), "Ascension Day"),
    (Rule::Easter(50), "Whit Monday"),
    (Rule::Fixed(7, 21), "National Day"),
    (Rule::Fixed(8, 15), "Assumption Day"),
    (Rule::Fixed(11, 1), "All Saints' Day"),
    (Rule::Fixed(11, 11), "Armistice Day"),
    (Rule::Fixed(12, 25), "Christmas Day"),
];

const UNITED_KINGDOM: &[(Rule, &str)] = &[
    (Rule::Fixed(1, 1), "New Year's Day"),
    (Rule::Easter(-2), "Good Friday"),
    (Rule::Easter(1), "Easter Monday"),
    (Rule::NthWeekday(5, Weekday::Mon, 1), "Early May Bank Holiday"),
    (Rule::NthWeekday(5, Weekday::Mon, -1), "Spring Bank Holiday"),
    (Rule::NthWeekday(8, Weekday::Mon, -1), "Summer Bank Holiday"),
    (Rule::Fixed(12, 25), "Christmas Day"),
    (Rule::Fixed(12, 26), "Boxing Day"),
];

const UNITED_STATES: &[(Rule, &str)] = &[
    (Rule::Fixed(1, 1), "New Year's Day"),
    (Rule::NthWeekday(1, Weekday::Mon, 3), "Martin Luther King Jr. Day"),
    (Rule::NthWeekday(2, Weekday::Mon, 3), "Washington's Birthday"),
    (Rule::NthWeekday(5, Weekday::Mon, -1), "Memorial Day"),
    (Rule::Fixed(6, 19), "Juneteenth"),
    (Rule::Fixed(7, 4), "Independence Day"),
    (Rule::NthWeekday(9, Weekday::Mon, 1), "Labor Day"),
    (Rule::NthWeekday(10, Weekday::Mon, 2), "Columbus Day"),
    (Rule::Fixed(11, 11), "Veterans Day"),
    (Rule::NthWeekday(11, Weekday::Thu, 4), "Thanksgiving"),
    (Rule::Fixed(12, 25), "Christmas Day"),
];

const BUILT_IN: &[CountryCalendar] = &[
    CountryCalendar { code: "NL", name: "Netherlands", holidays: NETHERLANDS },
    CountryCalendar { code: "DE", name: "Germany", holidays: GERMANY },
    CountryCalendar { code: "FR", name: "France", holidays: FRANCE },
    CountryCalendar { code: "BE", name: "Belgium", holidays: BELGIUM },
    CountryCalendar { code: "GB", name: "United Kingdom", holidays: UNITED_KINGDOM },
    CountryCalendar { code: "US", name: "United States", holidays: UNITED_STATES },
];

/// Western Easter Sunday (anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

impl Rule {
    fn date_in(self, year: i32) -> Option<NaiveDate> {
        match self {
            Self::Fixed(month, day) => NaiveDate::from_ymd_opt(year, month, day),
            Self::Easter(offset) => easter_sunday(year).map(|e| e + Duration::days(offset)),
            Self::NthWeekday(month, weekday, n) if n > 0 => {
                NaiveDate::from_weekday_of_month_opt(year, month, weekday, n as u8)
            }
            Self::NthWeekday(month, weekday, n) => {
                let next_month = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)
                }?;
                let mut date = next_month.pred_opt()?;
                while date.weekday() != weekday {
                    date = date.pred_opt()?;
                }
                date.checked_sub_signed(Duration::weeks(i64::from(-n - 1)))
            }
        }
    }
}

/// Public holidays per country.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    extra: HashMap<String, HashMap<NaiveDate, String>>,
    extra_names: HashMap<String, String>,
}

impl HolidayCalendar {
    /// Calendar with only the built-in countries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a holiday for `country` on top of the built-in rules.
    ///
    /// Countries without a built-in calendar become known once they have a
    /// holiday added.
    pub fn add_holiday(&mut self, country: &str, date: NaiveDate, name: &str) {
        let key = self.canonical(country);
        self.extra_names
            .entry(key.clone())
            .or_insert_with(|| country.trim().to_string());
        self.extra
            .entry(key)
            .or_default()
            .insert(date, name.to_string());
    }

    /// Parse extra holidays from CSV with a header row: `country, date, name`.
    pub fn load_csv<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        for record in csv.records() {
            let record = record?;
            let (Some(country), Some(raw_date)) = (record.get(0), record.get(1)) else {
                return Err(GeneratorError::configuration(
                    "holiday rows need a country and a date",
                ));
            };
            let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
                GeneratorError::configuration(format!("invalid holiday date '{raw_date}': {e}"))
            })?;
            self.add_holiday(country, date, record.get(2).unwrap_or("Holiday"));
        }
        Ok(())
    }

    /// Built-in calendar extended with the holidays in a CSV file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut calendar = Self::new();
        calendar.load_csv(std::fs::File::open(path)?)?;
        Ok(calendar)
    }

    fn built_in(country: &str) -> Option<&'static CountryCalendar> {
        let country = country.trim();
        BUILT_IN.iter().find(|c| {
            c.code.eq_ignore_ascii_case(country) || c.name.eq_ignore_ascii_case(country)
        })
    }

    /// Key shared by a country's code and name.
    fn canonical(&self, country: &str) -> String {
        Self::built_in(country).map_or_else(
            || country.trim().to_lowercase(),
            |c| c.code.to_lowercase(),
        )
    }

    /// Whether any holidays are known for `country` (ISO code or English name).
    pub fn knows(&self, country: &str) -> bool {
        Self::built_in(country).is_some() || self.extra.contains_key(&self.canonical(country))
    }

    /// Countries with holiday data, by display name.
    pub fn countries(&self) -> Vec<&str> {
        let mut countries: Vec<&str> = BUILT_IN.iter().map(|c| c.name).collect();
        let mut extra: Vec<&str> = self
            .extra_names
            .iter()
            .filter(|(key, _)| !BUILT_IN.iter().any(|c| c.code.eq_ignore_ascii_case(key)))
            .map(|(_, name)| name.as_str())
            .collect();
        extra.sort_unstable();
        countries.extend(extra);
        countries
    }

    /// Name of the holiday on `date` in `country`, if any.
    ///
    /// Explicitly added holidays take precedence over built-in rules.
    pub fn holiday(&self, country: &str, date: NaiveDate) -> Option<&str> {
        if let Some(name) = self
            .extra
            .get(&self.canonical(country))
            .and_then(|days| days.get(&date))
        {
            return Some(name.as_str());
        }
        Self::built_in(country)?
            .holidays
            .iter()
            .find(|(rule, _)| rule.date_in(date.year()) == Some(date))
            .map(|(_, name)| *name)
    }

    /// Whether `date` is a public holiday in `country`.
    pub fn is_holiday(&self, country: &str, date: NaiveDate) -> bool {
        self.holiday(country, date).is_some()
    }
}
