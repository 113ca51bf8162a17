use chrono::{Datelike, Days, NaiveDate};

/// Date format used by the bulletin form and the command line.
pub const FORM_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a `dd/mm/yyyy` date.
pub fn parse_form_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), FORM_DATE_FORMAT).ok()
}

/// Render a date the way the bulletin form expects it.
pub fn format_form_date(date: NaiveDate) -> String {
    date.format(FORM_DATE_FORMAT).to_string()
}

/// Year/week tag attached to every record scraped for a query date.
///
/// `week` is the ISO-8601 week number while `year` is the plain calendar year
/// of the query date, so 30/12/2024 is tagged `2024`/`1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BulletinWeek {
    pub year: i32,
    pub week: u32,
}

impl BulletinWeek {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            week: date.iso_week().week(),
        }
    }
}

/// Monday of `week` in `year`, counting weeks the `%W` way: week 1 starts on
/// the first Monday of the year and the days before it form week 0.
///
/// This is not ISO-8601 numbering; see [`BulletinWeek::of`] for the week tag.
pub fn week_anchor(year: i32, week: u32) -> Option<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let offset = jan1.weekday().num_days_from_monday() as u64;
    if week == 0 {
        // Monday on or before 1 January
        return jan1.checked_sub_days(Days::new(offset));
    }
    let week0_len = (7 - offset) % 7;
    jan1.checked_add_days(Days::new(week0_len + 7 * (week as u64 - 1)))
}

/// Query dates from `start` to `end` inclusive, one week apart.
#[derive(Clone, Debug)]
pub struct WeeklyDates {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl WeeklyDates {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            next: Some(start),
            end,
        }
    }
}

impl Iterator for WeeklyDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next.filter(|d| *d <= self.end)?;
        self.next = current.checked_add_days(Days::new(7));
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = match self.next {
            Some(d) if d <= self.end => ((self.end - d).num_days() / 7 + 1) as usize,
            _ => 0,
        };
        (n, Some(n))
    }
}

impl ExactSizeIterator for WeeklyDates {}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_form_date(s).unwrap()
    }

    #[test]
    fn test_weekly_dates_inclusive_end() {
        let dates: Vec<_> = WeeklyDates::new(d("01/01/2024"), d("22/01/2024")).collect();
        assert_eq!(
            dates,
            vec![
                d("01/01/2024"),
                d("08/01/2024"),
                d("15/01/2024"),
                d("22/01/2024")
            ]
        );
    }

    #[test]
    fn test_weekly_dates_count_matches_formula() {
        let start = d("03/02/2023");
        for extra in 0..60 {
            let end = start + Days::new(extra);
            let dates: Vec<_> = WeeklyDates::new(start, end).collect();
            assert_eq!(dates.len() as u64, extra / 7 + 1, "end offset {extra}");
            assert_eq!(dates[0], start);
            assert!(*dates.last().unwrap() <= end);
            for pair in dates.windows(2) {
                assert_eq!((pair[1] - pair[0]).num_days(), 7);
            }
            assert_eq!(WeeklyDates::new(start, end).len(), dates.len());
        }
    }

    #[test]
    fn test_weekly_dates_empty_when_start_after_end() {
        let mut it = WeeklyDates::new(d("10/01/2024"), d("09/01/2024"));
        assert_eq!(it.len(), 0);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn test_weekly_dates_restartable() {
        let walker = WeeklyDates::new(d("01/01/2024"), d("31/01/2024"));
        let first: Vec<_> = walker.clone().collect();
        let second: Vec<_> = walker.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[test]
    fn test_week_anchor() {
        assert_eq!(week_anchor(2024, 10), Some(d("04/03/2024")));
        assert_eq!(week_anchor(2024, 1), Some(d("01/01/2024")));
        // 2020 starts on a Wednesday: week 1 begins on the first Monday
        assert_eq!(week_anchor(2020, 1), Some(d("06/01/2020")));
        assert_eq!(week_anchor(2020, 0), Some(d("30/12/2019")));
    }

    #[test]
    fn test_anchor_and_iso_week_diverge() {
        // %W week 10 of 2020 starts on 09/03/2020, which ISO numbers as week 11
        let anchor = week_anchor(2020, 10).unwrap();
        assert_eq!(anchor, d("09/03/2020"));
        assert_eq!(BulletinWeek::of(anchor).week, 11);

        // 01/01/2020 is ISO week 1 but %W week 0
        let new_year = d("01/01/2020");
        assert_eq!(BulletinWeek::of(new_year).week, 1);
        assert_eq!(new_year.format("%W").to_string(), "00");

        // in 2024 both schemes agree
        assert_eq!(BulletinWeek::of(week_anchor(2024, 10).unwrap()).week, 10);
    }

    #[test]
    fn test_bulletin_week_uses_calendar_year() {
        let w = BulletinWeek::of(d("30/12/2024"));
        assert_eq!(w, BulletinWeek { year: 2024, week: 1 });
    }

    #[test]
    fn test_form_date_round_trip_format() {
        assert_eq!(format_form_date(d("5/3/2024")), "05/03/2024");
        assert!(parse_form_date("2024-03-05").is_none());
        assert!(parse_form_date("31/02/2024").is_none());
    }
}
