use crate::tax;

/// Debt-fund units are bought at 1 and never repurchased.
pub const COST_BASIS_PER_UNIT: f64 = 1.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub taxes_paid: f64,
    pub swp_withdrawn: f64,
    pub capital_gains: f64,
}

/// Outcome of selling debt-fund units to fund one withdrawal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Redemption {
    pub units: f64,
    pub cost_basis: f64,
    pub capital_gain: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub debt_balance: f64,
    pub equity_balance: f64,
    pub total_units: f64,
    pub cost_basis_per_unit: f64,
    pub totals: Totals,
}

impl PortfolioState {
    pub fn new(invested_amount: f64, debt_percent: f64, equity_percent: f64) -> Self {
        let debt_balance = invested_amount * (debt_percent / 100.0);
        let equity_balance = invested_amount * (equity_percent / 100.0);

        Self {
            debt_balance,
            equity_balance,
            total_units: debt_balance / COST_BASIS_PER_UNIT,
            cost_basis_per_unit: COST_BASIS_PER_UNIT,
            totals: Totals::default(),
        }
    }

    pub fn grow_debt(&mut self, monthly_rate: f64) {
        self.debt_balance = grow(self.debt_balance, monthly_rate);
    }

    pub fn grow_equity(&mut self, annual_rate: f64) {
        self.equity_balance = grow(self.equity_balance, annual_rate);
    }

    pub fn unit_price(&self) -> f64 {
        self.debt_balance / self.total_units
    }

    /// Withdrawals are all-or-nothing: the debt balance has to cover the full amount.
    pub fn can_withdraw(&self, amount: f64) -> bool {
        self.debt_balance >= amount
    }

    /// Prices the units needed to raise `amount` at `unit_price`, without
    /// touching the balances.
    pub fn quote(&self, amount: f64, unit_price: f64) -> Redemption {
        // A zero withdrawal redeems nothing, even from an empty fund.
        let units = if amount == 0.0 {
            0.0
        } else {
            amount / unit_price
        };
        let cost_basis = units * self.cost_basis_per_unit;

        Redemption {
            units,
            cost_basis,
            capital_gain: tax::realised_gain(amount, cost_basis),
        }
    }

    pub fn redeem(&mut self, amount: f64, redemption: &Redemption, tax_amount: f64) {
        self.debt_balance -= amount;
        self.total_units -= redemption.units;

        self.totals.swp_withdrawn += amount;
        self.totals.taxes_paid += tax_amount;
        self.totals.capital_gains += redemption.capital_gain;
    }

    pub fn total_value(&self) -> f64 {
        self.debt_balance + self.equity_balance
    }

    /// Portfolio value less every tax paid so far.
    pub fn net_value(&self) -> f64 {
        self.total_value() - self.totals.taxes_paid
    }
}

pub fn grow(balance: f64, rate: f64) -> f64 {
    balance * (1.0 + rate)
}
