use std::io::{stdout, Write};
use std::str::FromStr;

use crate::calendar;
use crate::simulation::{AnnualTaxSummary, SimulationResult, WithdrawalRecord, YearlyResult};

use anyhow::{bail, Result};
use num_format::{CustomFormat, Grouping, ToFormattedString};
use serde::{Serialize, Serializer};

const NO_WITHDRAWALS: &str = "No SWP withdrawals for this year";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Summary,
    Portfolio,
    Tax,
    Schedule,
    All,
}

impl FromStr for Report {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "summary" => Report::Summary,
            "portfolio" => Report::Portfolio,
            "tax" => Report::Tax,
            "schedule" => Report::Schedule,
            "all" => Report::All,
            other => bail!(
                "unknown report `{}` (expected summary, portfolio, tax, schedule or all)",
                other
            ),
        })
    }
}

#[derive(Serialize)]
struct SummaryOutput {
    #[serde(serialize_with = "currency", rename = "Final Portfolio Value")]
    final_portfolio_value: f64,

    #[serde(serialize_with = "currency", rename = "Total SWP Withdrawn")]
    total_swp_withdrawn: f64,

    #[serde(serialize_with = "currency", rename = "Total Taxes Paid")]
    total_taxes_paid: f64,

    #[serde(serialize_with = "currency", rename = "Net Portfolio Value")]
    net_portfolio_value: f64,

    #[serde(serialize_with = "currency", rename = "Total Capital Gains")]
    total_capital_gains: f64,
}

impl From<&SimulationResult> for SummaryOutput {
    fn from(result: &SimulationResult) -> Self {
        Self {
            final_portfolio_value: result.final_portfolio_value,
            total_swp_withdrawn: result.total_swp_withdrawn,
            total_taxes_paid: result.total_taxes_paid,
            net_portfolio_value: result.net_portfolio_value,
            total_capital_gains: result.total_capital_gains,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PortfolioOutput {
    year: u32,

    #[serde(serialize_with = "currency", rename = "Debt Balance")]
    debt_balance: f64,

    #[serde(serialize_with = "currency", rename = "Equity Balance")]
    equity_balance: f64,

    #[serde(serialize_with = "currency", rename = "Annual SWP")]
    annual_swp: f64,

    #[serde(serialize_with = "currency", rename = "Capital Gains Tax")]
    capital_gains_tax: f64,

    #[serde(serialize_with = "currency", rename = "Total Value")]
    total_portfolio_value: f64,

    #[serde(serialize_with = "currency", rename = "Net Value (After Tax)")]
    net_portfolio_value: f64,
}

impl From<&YearlyResult> for PortfolioOutput {
    fn from(row: &YearlyResult) -> Self {
        Self {
            year: row.year,
            debt_balance: row.debt_balance,
            equity_balance: row.equity_balance,
            annual_swp: row.annual_swp,
            capital_gains_tax: row.capital_gains_tax,
            total_portfolio_value: row.total_portfolio_value,
            net_portfolio_value: row.net_portfolio_value,
        }
    }
}

#[derive(Serialize)]
struct TaxOutput<'a> {
    #[serde(rename = "Financial Year")]
    financial_year: &'a str,

    #[serde(serialize_with = "currency", rename = "Total Withdrawals")]
    total_withdrawals: f64,

    #[serde(serialize_with = "currency", rename = "Capital Gains")]
    total_capital_gains: f64,

    #[serde(serialize_with = "currency", rename = "LTCG Tax")]
    ltcg_tax: f64,

    #[serde(serialize_with = "currency", rename = "STCG Tax")]
    stcg_tax: f64,

    #[serde(serialize_with = "currency", rename = "Total Tax")]
    total_tax: f64,
}

impl<'a> From<&'a AnnualTaxSummary> for TaxOutput<'a> {
    fn from(row: &'a AnnualTaxSummary) -> Self {
        Self {
            financial_year: &row.financial_year,
            total_withdrawals: row.total_withdrawals,
            total_capital_gains: row.total_capital_gains,
            ltcg_tax: row.ltcg_tax,
            stcg_tax: row.stcg_tax,
            total_tax: row.total_tax,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ScheduleOutput {
    date: String,

    #[serde(serialize_with = "currency")]
    amount: f64,

    #[serde(rename = "Holding Period")]
    holding_period: String,

    #[serde(serialize_with = "currency", rename = "Capital Gains")]
    capital_gain: f64,

    #[serde(rename = "Tax Rate")]
    tax_rate: String,

    #[serde(serialize_with = "currency", rename = "Tax Amount")]
    tax_amount: f64,
}

impl From<&WithdrawalRecord> for ScheduleOutput {
    fn from(record: &WithdrawalRecord) -> Self {
        Self {
            date: calendar::format_date(record.date),
            amount: record.amount,
            holding_period: format!("{} months", record.holding_period_months),
            capital_gain: record.capital_gain,
            tax_rate: format!("{}%", record.tax_rate()),
            tax_amount: record.tax_amount,
        }
    }
}

/// Rupees, rounded to the unit, grouped the Indian way: `₹10,72,290`.
pub fn format_currency(amount: f64) -> String {
    lazy_static! {
        static ref INR_FMT: CustomFormat = CustomFormat::builder()
            .grouping(Grouping::Indian)
            .separator(",")
            .build()
            .expect("static currency format is valid");
    }

    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_formatted_string(&*INR_FMT);

    if rounded < 0 {
        format!("-₹{}", digits)
    } else {
        format!("₹{}", digits)
    }
}

fn currency<S>(n: &f64, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&format_currency(*n))
}

/// Keeps the schedule page within `1..=total_years`. A page past the end
/// (e.g. after the horizon shrank) goes back to the first year.
pub fn schedule_year(requested: usize, total_years: usize) -> usize {
    if requested == 0 || requested > total_years {
        1
    } else {
        requested
    }
}

fn write_rows<W, T, I>(out: &mut W, rows: I) -> Result<()>
where
    W: Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_summary<W: Write>(out: &mut W, result: &SimulationResult) -> Result<()> {
    write_rows(out, std::iter::once(SummaryOutput::from(result)))
}

pub fn write_portfolio<W: Write>(out: &mut W, result: &SimulationResult) -> Result<()> {
    write_rows(out, result.yearly_results.iter().map(PortfolioOutput::from))
}

pub fn write_tax<W: Write>(out: &mut W, result: &SimulationResult) -> Result<()> {
    write_rows(out, result.annual_tax_summary.iter().map(TaxOutput::from))
}

pub fn write_schedule<W: Write>(out: &mut W, result: &SimulationResult, year: usize) -> Result<()> {
    let year = schedule_year(year, result.simulation_years());
    writeln!(out, "SWP Schedule: Year {}", year)?;

    match result.withdrawals_for_year(year) {
        Some(records) if !records.is_empty() => {
            write_rows(out, records.iter().map(ScheduleOutput::from))
        }
        _ => {
            writeln!(out, "{}", NO_WITHDRAWALS)?;
            Ok(())
        }
    }
}

pub fn write_report<W: Write>(
    out: &mut W,
    result: &SimulationResult,
    report: Report,
    year: usize,
) -> Result<()> {
    match report {
        Report::Summary => write_summary(out, result),
        Report::Portfolio => write_portfolio(out, result),
        Report::Tax => write_tax(out, result),
        Report::Schedule => write_schedule(out, result, year),
        Report::All => {
            write_summary(out, result)?;
            writeln!(out)?;
            write_portfolio(out, result)?;
            writeln!(out)?;
            write_tax(out, result)?;
            writeln!(out)?;
            write_schedule(out, result, year)
        }
    }
}

pub fn print(result: &SimulationResult, report: Report, year: usize) -> Result<()> {
    let stdout = stdout();
    let mut out = stdout.lock();
    write_report(&mut out, result, report, year)
}

pub fn print_placeholder() -> Result<()> {
    let stdout = stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "Enter an invested amount, a simulation horizon and an allocation to see the projection"
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{run_simulation, SimulationInput};

    use chrono::NaiveDate;

    fn sample() -> SimulationResult {
        let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        run_simulation(&SimulationInput {
            invested_amount: 1_000_000.0,
            start_date: start,
            swp_start_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            simulation_years: 3,
            debt_percent: 70.0,
            equity_percent: 30.0,
            debt_return: 7.0,
            equity_return: 12.0,
            enable_swp: true,
            swp_amount: 5_000.0,
            swp_increase: 0.0,
        })
    }

    fn render(report: Report, year: usize) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, &sample(), report, year).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn currency_uses_indian_grouping() {
        assert_eq!(format_currency(0.0), "₹0");
        assert_eq!(format_currency(999.4), "₹999");
        assert_eq!(format_currency(100_000.0), "₹1,00,000");
        assert_eq!(format_currency(1_072_290.06), "₹10,72,290");
        assert_eq!(format_currency(123_456_789.0), "₹12,34,56,789");
        assert_eq!(format_currency(-1_500.0), "-₹1,500");
    }

    #[test]
    fn schedule_page_stays_in_range() {
        assert_eq!(schedule_year(0, 5), 1);
        assert_eq!(schedule_year(3, 5), 3);
        assert_eq!(schedule_year(5, 5), 5);
        assert_eq!(schedule_year(6, 5), 1);
    }

    #[test]
    fn portfolio_has_one_row_per_year() {
        let output = render(Report::Portfolio, 1);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines[0],
            "Year,Debt Balance,Equity Balance,Annual SWP,Capital Gains Tax,Total Value,Net Value (After Tax)"
        );
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("1,"));
        assert!(lines[3].starts_with("3,"));
    }

    #[test]
    fn tax_table_is_labelled_by_financial_year() {
        let output = render(Report::Tax, 1);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines[0],
            "Financial Year,Total Withdrawals,Capital Gains,LTCG Tax,STCG Tax,Total Tax"
        );
        assert!(lines[1].starts_with("FY 2024-25,₹0,"));
        assert!(lines[2].starts_with("FY 2025-26,\"₹60,000\","));
    }

    #[test]
    fn empty_schedule_year_says_so() {
        let output = render(Report::Schedule, 1);
        assert_eq!(
            output,
            format!("SWP Schedule: Year 1\n{}\n", NO_WITHDRAWALS)
        );
    }

    #[test]
    fn schedule_lists_each_withdrawal() {
        let output = render(Report::Schedule, 2);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "SWP Schedule: Year 2");
        assert_eq!(
            lines[1],
            "Date,Amount,Holding Period,Capital Gains,Tax Rate,Tax Amount"
        );
        assert_eq!(lines.len(), 14);
        assert!(lines[2].starts_with("01/04/2025,\"₹5,000\",12 months,"));
        assert!(lines[2].contains(",12.5%,"));
    }

    #[test]
    fn out_of_range_schedule_year_falls_back_to_first() {
        assert_eq!(render(Report::Schedule, 9), render(Report::Schedule, 1));
    }

    #[test]
    fn all_prints_every_table() {
        let output = render(Report::All, 2);

        assert!(output.starts_with("Final Portfolio Value,"));
        assert!(output.contains("\nYear,Debt Balance,"));
        assert!(output.contains("\nFinancial Year,"));
        assert!(output.contains("\nSWP Schedule: Year 2\n"));
        assert_eq!(output.matches("\n\n").count(), 3);
    }

    #[test]
    fn parses_report_names() {
        assert_eq!("Schedule".parse::<Report>().unwrap(), Report::Schedule);
        assert_eq!("all".parse::<Report>().unwrap(), Report::All);
        assert!("chart".parse::<Report>().is_err());
    }
}
