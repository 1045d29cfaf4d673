use std::convert::TryFrom;

use chrono::{Datelike, Duration, NaiveDate, ParseResult};

const ISO_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// Days counted as one month of holding.
pub const DAYS_PER_MONTH: i64 = 30;

/// Moves `date` forward by whole years, then by whole months.
///
/// Each step lands on the same day-of-month; a day that does not exist in the
/// target month rolls forward into the next one (Jan 31 + 1 month is Mar 2 or
/// Mar 3, Feb 29 + 1 year is Mar 1). Returns `None` outside chrono's range.
pub fn advance(date: NaiveDate, years: u32, months: u32) -> Option<NaiveDate> {
    let shifted = add_months(date, i64::from(years) * 12)?;
    add_months(shifted, i64::from(months))
}

fn add_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + months;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = total.rem_euclid(12) as u32 + 1;

    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?;
    first_of_month.checked_add_signed(Duration::days(i64::from(date.day()) - 1))
}

/// Whole months between two dates, counting every 30 days as a month.
pub fn holding_period_months(start: NaiveDate, end: NaiveDate) -> u32 {
    let days = end.signed_duration_since(start).num_days().abs();
    u32::try_from(days / DAYS_PER_MONTH).unwrap_or(u32::MAX)
}

/// Label of the April to March financial year covering simulation year `year`
/// (1-based) of an investment started in `start_year`, e.g. `FY 2024-25`.
pub fn financial_year_label(start_year: i32, year: u32) -> String {
    let fy_start = start_year + year as i32 - 1;
    format!("FY {}-{:02}", fy_start, (fy_start + 1).rem_euclid(100))
}

/// Accepts `2024-04-01` as well as `01/04/2024`.
pub fn parse_date(raw: &str) -> ParseResult<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, ISO_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, DISPLAY_FORMAT))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn advance_by_months_within_year() {
        assert_eq!(advance(date(2024, 1, 15), 0, 5), Some(date(2024, 6, 15)));
    }

    #[test]
    fn advance_rolls_over_year_boundary() {
        assert_eq!(advance(date(2024, 11, 1), 0, 3), Some(date(2025, 2, 1)));
        assert_eq!(advance(date(2024, 11, 1), 2, 3), Some(date(2027, 2, 1)));
    }

    #[test]
    fn advance_overflows_short_months_forward() {
        assert_eq!(advance(date(2025, 1, 31), 0, 1), Some(date(2025, 3, 3)));
        assert_eq!(advance(date(2024, 1, 31), 0, 1), Some(date(2024, 3, 2)));
    }

    #[test]
    fn leap_day_plus_one_year_is_march_first() {
        assert_eq!(advance(date(2024, 2, 29), 1, 0), Some(date(2025, 3, 1)));
    }

    #[test]
    fn years_are_applied_before_months() {
        // Feb 29 -> Mar 1 2025 first, then one month on.
        assert_eq!(advance(date(2024, 2, 29), 1, 1), Some(date(2025, 4, 1)));
    }

    #[test]
    fn advance_out_of_range_is_none() {
        assert_eq!(advance(NaiveDate::MAX, 1, 0), None);
    }

    #[test]
    fn holding_period_uses_thirty_day_months() {
        let start = date(2024, 1, 1);
        assert_eq!(holding_period_months(start, start), 0);
        assert_eq!(holding_period_months(start, date(2024, 1, 30)), 0);
        assert_eq!(holding_period_months(start, date(2024, 1, 31)), 1);
        assert_eq!(holding_period_months(start, date(2024, 12, 1)), 11);
        // 360 days is already twelve "months", a few days short of a calendar year.
        assert_eq!(holding_period_months(start, date(2024, 12, 26)), 12);
        assert_eq!(holding_period_months(start, date(2025, 1, 1)), 12);
    }

    #[test]
    fn holding_period_is_symmetric() {
        let a = date(2023, 5, 10);
        let b = date(2024, 9, 2);
        assert_eq!(holding_period_months(a, b), holding_period_months(b, a));
    }

    #[test]
    fn financial_year_labels() {
        assert_eq!(financial_year_label(2024, 1), "FY 2024-25");
        assert_eq!(financial_year_label(2024, 3), "FY 2026-27");
        assert_eq!(financial_year_label(2099, 1), "FY 2099-00");
    }

    #[test]
    fn parses_both_date_forms() {
        assert_eq!(parse_date("2024-04-01").unwrap(), date(2024, 4, 1));
        assert_eq!(parse_date(" 01/04/2024 ").unwrap(), date(2024, 4, 1));
        assert!(parse_date("April 1st").is_err());
    }

    #[test]
    fn formats_day_first() {
        assert_eq!(format_date(date(2025, 3, 9)), "09/03/2025");
    }
}
