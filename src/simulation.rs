use crate::accounting::{PortfolioState, Totals};
use crate::calendar;
use crate::tax::TaxTreatment;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, trace};

const MONTHS_PER_YEAR: u32 = 12;

/// A validated set of projection inputs.
///
/// `debt_percent + equity_percent` is expected to be 100 and `swp_start_date`
/// not to precede `start_date`; the config layer checks both.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationInput {
    pub invested_amount: f64,
    pub start_date: NaiveDate,
    pub swp_start_date: NaiveDate,
    pub simulation_years: u32,
    pub debt_percent: f64,
    pub equity_percent: f64,
    /// Annual %, compounded monthly at `debt_return / 12`.
    pub debt_return: f64,
    /// Annual %, compounded once a year.
    pub equity_return: f64,
    pub enable_swp: bool,
    /// Monthly withdrawal in the first year.
    pub swp_amount: f64,
    /// Yearly step-up of the withdrawal, in %.
    pub swp_increase: f64,
}

impl SimulationInput {
    fn monthly_debt_rate(&self) -> f64 {
        self.debt_return / 100.0 / 12.0
    }

    fn annual_equity_rate(&self) -> f64 {
        self.equity_return / 100.0
    }

    /// Monthly withdrawal for simulation year `year` (1-based).
    pub fn swp_amount_for_year(&self, year: u32) -> f64 {
        self.swp_amount * (1.0 + self.swp_increase / 100.0).powi(year as i32 - 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalRecord {
    pub date: NaiveDate,
    pub amount: f64,
    pub holding_period_months: u32,
    pub capital_gain: f64,
    pub treatment: TaxTreatment,
    pub tax_amount: f64,
}

impl WithdrawalRecord {
    /// 0, 12.5 or 30.
    pub fn tax_rate(&self) -> f64 {
        self.treatment.rate_percent()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearlyResult {
    pub year: u32,
    pub debt_balance: f64,
    pub equity_balance: f64,
    pub annual_swp: f64,
    pub capital_gains_tax: f64,
    pub total_portfolio_value: f64,
    pub net_portfolio_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnualTaxSummary {
    pub financial_year: String,
    pub total_withdrawals: f64,
    pub total_capital_gains: f64,
    pub ltcg_tax: f64,
    pub stcg_tax: f64,
    pub total_tax: f64,
}

/// Everything produced for one simulated year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearStep {
    pub yearly: YearlyResult,
    pub tax_summary: AnnualTaxSummary,
    pub withdrawals: Vec<WithdrawalRecord>,
    /// Running totals through the end of this year.
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub yearly_results: Vec<YearlyResult>,
    pub annual_tax_summary: Vec<AnnualTaxSummary>,
    /// One list per simulated year; index 0 holds year 1.
    pub withdrawals: Vec<Vec<WithdrawalRecord>>,
    pub final_portfolio_value: f64,
    pub net_portfolio_value: f64,
    pub total_swp_withdrawn: f64,
    pub total_taxes_paid: f64,
    pub total_capital_gains: f64,
}

impl SimulationResult {
    fn from_steps(steps: Vec<YearStep>) -> Self {
        let totals = steps.last().map(|s| s.totals).unwrap_or_default();
        let (final_portfolio_value, net_portfolio_value) = steps
            .last()
            .map(|s| (s.yearly.total_portfolio_value, s.yearly.net_portfolio_value))
            .unwrap_or_default();

        let mut yearly_results = Vec::with_capacity(steps.len());
        let mut annual_tax_summary = Vec::with_capacity(steps.len());
        let mut withdrawals = Vec::with_capacity(steps.len());

        for step in steps {
            yearly_results.push(step.yearly);
            annual_tax_summary.push(step.tax_summary);
            withdrawals.push(step.withdrawals);
        }

        Self {
            yearly_results,
            annual_tax_summary,
            withdrawals,
            final_portfolio_value,
            net_portfolio_value,
            total_swp_withdrawn: totals.swp_withdrawn,
            total_taxes_paid: totals.taxes_paid,
            total_capital_gains: totals.capital_gains,
        }
    }

    pub fn simulation_years(&self) -> usize {
        self.yearly_results.len()
    }

    /// Withdrawals of simulation year `year`, counted from 1.
    pub fn withdrawals_for_year(&self, year: usize) -> Option<&[WithdrawalRecord]> {
        year.checked_sub(1)
            .and_then(|index| self.withdrawals.get(index))
            .map(Vec::as_slice)
    }
}

/// Projects the portfolio for `input.simulation_years` years.
pub fn run_simulation(input: &SimulationInput) -> SimulationResult {
    info!(
        years = input.simulation_years,
        swp = input.enable_swp,
        "running projection"
    );

    let steps = Simulation::new(input)
        .take(input.simulation_years as usize)
        .collect();

    SimulationResult::from_steps(steps)
}

/// Yields one `YearStep` per simulated year, carrying the portfolio forward.
pub struct Simulation<'a> {
    input: &'a SimulationInput,
    state: PortfolioState,
    year: u32,
}

impl<'a> Simulation<'a> {
    pub fn new(input: &'a SimulationInput) -> Self {
        Simulation {
            input,
            state: PortfolioState::new(
                input.invested_amount,
                input.debt_percent,
                input.equity_percent,
            ),
            year: 0,
        }
    }

    fn step(&mut self) -> YearStep {
        let input = self.input;
        let year = self.year;
        let swp_amount = input.swp_amount_for_year(year);
        let monthly_rate = input.monthly_debt_rate();

        let mut withdrawals = Vec::new();
        let mut ltcg_tax = 0.0;
        let mut stcg_tax = 0.0;
        let mut annual_swp = 0.0;
        let mut capital_gains = 0.0;

        for month in 1..=MONTHS_PER_YEAR {
            self.state.grow_debt(monthly_rate);
            let unit_price = self.state.unit_price();

            if !input.enable_swp || !self.state.can_withdraw(swp_amount) {
                continue;
            }

            let date = match calendar::advance(input.start_date, year - 1, month - 1) {
                Some(date) => date,
                None => {
                    debug!(year, month, "withdrawal date out of calendar range, skipping");
                    continue;
                }
            };

            if date < input.swp_start_date {
                debug!(year, month, %date, "before SWP start, skipping");
                continue;
            }

            let holding_period_months = calendar::holding_period_months(input.start_date, date);
            let redemption = self.state.quote(swp_amount, unit_price);
            let treatment = TaxTreatment::classify(holding_period_months, redemption.capital_gain);
            let tax_amount = treatment.tax_on(redemption.capital_gain);

            match treatment {
                TaxTreatment::LongTerm => ltcg_tax += tax_amount,
                TaxTreatment::ShortTerm => stcg_tax += tax_amount,
                TaxTreatment::Exempt => {}
            }

            self.state.redeem(swp_amount, &redemption, tax_amount);
            annual_swp += swp_amount;
            capital_gains += redemption.capital_gain;

            trace!(
                %date,
                amount = swp_amount,
                units = redemption.units,
                cost_basis = redemption.cost_basis,
                gain = redemption.capital_gain,
                tax = tax_amount,
                "withdrawal"
            );

            withdrawals.push(WithdrawalRecord {
                date,
                amount: swp_amount,
                holding_period_months,
                capital_gain: redemption.capital_gain,
                treatment,
                tax_amount,
            });
        }

        self.state.grow_equity(input.annual_equity_rate());

        let yearly = YearlyResult {
            year,
            debt_balance: self.state.debt_balance,
            equity_balance: self.state.equity_balance,
            annual_swp,
            capital_gains_tax: ltcg_tax + stcg_tax,
            total_portfolio_value: self.state.total_value(),
            net_portfolio_value: self.state.net_value(),
        };

        let tax_summary = AnnualTaxSummary {
            financial_year: calendar::financial_year_label(input.start_date.year(), year),
            total_withdrawals: annual_swp,
            total_capital_gains: capital_gains,
            ltcg_tax,
            stcg_tax,
            total_tax: ltcg_tax + stcg_tax,
        };

        YearStep {
            yearly,
            tax_summary,
            withdrawals,
            totals: self.state.totals,
        }
    }
}

impl<'a> Iterator for Simulation<'a> {
    type Item = YearStep;

    fn next(&mut self) -> Option<Self::Item> {
        self.year += 1;
        Some(self.step())
    }
}
