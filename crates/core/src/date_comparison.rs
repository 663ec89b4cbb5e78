//! Three-valued comparison of partial dates against calendar dates.

use chrono::{Datelike, Months, NaiveDate};
use treatline_types::PartialDate;

/// Whether `date` lies after `min_date`.
///
/// `None` when the year is unknown, or when the year matches and the month is unknown or equal.
pub fn is_after_date(min_date: NaiveDate, date: PartialDate) -> Option<bool> {
    let year = date.year()?;
    if year > min_date.year() {
        Some(true)
    } else if year == min_date.year() {
        match date.month() {
            Some(month) if month != min_date.month() => Some(month > min_date.month()),
            _ => None,
        }
    } else {
        Some(false)
    }
}

pub fn is_before_date(max_date: NaiveDate, date: PartialDate) -> Option<bool> {
    is_after_date(max_date, date).map(|after| !after)
}

/// Smallest number of whole weeks that can lie between `start` and `stop`.
///
/// The start is taken at the end of its month (December when unknown) and the stop at the first
/// of its month (January when unknown). Never negative.
pub fn min_weeks_between(start: PartialDate, stop: PartialDate) -> Option<i64> {
    let start_of_start_month = NaiveDate::from_ymd_opt(start.year()?, start.month().unwrap_or(12), 1)?;
    let start_date = start_of_start_month
        .checked_add_months(Months::new(1))?
        .pred_opt()?;
    let stop_date = NaiveDate::from_ymd_opt(stop.year()?, stop.month().unwrap_or(1), 1)?;

    Some((stop_date - start_date).num_weeks().max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::date;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn after_date_is_undetermined_without_year() {
        let min = ymd(2022, 6, 1);
        assert_eq!(is_after_date(min, PartialDate::UNKNOWN), None);
        assert_eq!(is_after_date(min, PartialDate::new(None, Some(8)).expect("date")), None);
    }

    #[test]
    fn after_date_compares_year_then_month() {
        let min = ymd(2022, 6, 15);
        assert_eq!(is_after_date(min, PartialDate::of_year(2023)), Some(true));
        assert_eq!(is_after_date(min, PartialDate::of_year(2021)), Some(false));
        assert_eq!(is_after_date(min, PartialDate::of_year(2022)), None);
        assert_eq!(is_after_date(min, date(2022, 6)), None);
        assert_eq!(is_after_date(min, date(2022, 7)), Some(true));
        assert_eq!(is_after_date(min, date(2022, 5)), Some(false));
    }

    #[test]
    fn before_date_negates_after_date() {
        let max = ymd(2022, 6, 15);
        assert_eq!(is_before_date(max, date(2022, 5)), Some(true));
        assert_eq!(is_before_date(max, date(2022, 6)), None);
        assert_eq!(is_before_date(max, PartialDate::of_year(2023)), Some(false));
    }

    #[test]
    fn min_weeks_uses_most_conservative_days() {
        // 2020-01-31 .. 2020-09-01 is 214 days.
        assert_eq!(min_weeks_between(date(2020, 1), date(2020, 9)), Some(30));
        // Unknown months: 2020-12-31 .. 2021-01-01.
        assert_eq!(
            min_weeks_between(PartialDate::of_year(2020), PartialDate::of_year(2021)),
            Some(0)
        );
        assert_eq!(min_weeks_between(date(2021, 5), date(2020, 1)), Some(0));
        assert_eq!(min_weeks_between(PartialDate::UNKNOWN, date(2020, 1)), None);
        assert_eq!(min_weeks_between(date(2020, 1), PartialDate::UNKNOWN), None);
    }
}
