/// Flat rate on long-term capital gains.
pub const LTCG_RATE: f64 = 0.125;

/// Flat rate on short-term capital gains.
pub const STCG_RATE: f64 = 0.30;

/// Holding period, in months, from which a gain is long-term.
pub const LONG_TERM_THRESHOLD_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxTreatment {
    /// No gain was realised, so nothing is owed.
    Exempt,
    LongTerm,
    ShortTerm,
}

impl TaxTreatment {
    pub fn classify(holding_period_months: u32, capital_gain: f64) -> TaxTreatment {
        if capital_gain <= 0.0 {
            TaxTreatment::Exempt
        } else if holding_period_months >= LONG_TERM_THRESHOLD_MONTHS {
            TaxTreatment::LongTerm
        } else {
            TaxTreatment::ShortTerm
        }
    }

    pub fn rate(self) -> f64 {
        match self {
            TaxTreatment::Exempt => 0.0,
            TaxTreatment::LongTerm => LTCG_RATE,
            TaxTreatment::ShortTerm => STCG_RATE,
        }
    }

    /// Rate as displayed: 0, 12.5 or 30.
    pub fn rate_percent(self) -> f64 {
        match self {
            TaxTreatment::Exempt => 0.0,
            TaxTreatment::LongTerm => 12.5,
            TaxTreatment::ShortTerm => 30.0,
        }
    }

    pub fn tax_on(self, capital_gain: f64) -> f64 {
        match self {
            TaxTreatment::Exempt => 0.0,
            _ => capital_gain * self.rate(),
        }
    }
}

/// Gain realised on a sale; losses are floored at zero.
pub fn realised_gain(proceeds: f64, cost_basis: f64) -> f64 {
    f64::max(0.0, proceeds - cost_basis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_gain_is_exempt_regardless_of_holding() {
        assert_eq!(TaxTreatment::classify(0, 0.0), TaxTreatment::Exempt);
        assert_eq!(TaxTreatment::classify(40, 0.0), TaxTreatment::Exempt);
        assert_eq!(TaxTreatment::Exempt.tax_on(0.0), 0.0);
        assert_eq!(TaxTreatment::Exempt.rate_percent(), 0.0);
    }

    #[test]
    fn twelve_months_is_long_term() {
        assert_eq!(TaxTreatment::classify(11, 10.0), TaxTreatment::ShortTerm);
        assert_eq!(TaxTreatment::classify(12, 10.0), TaxTreatment::LongTerm);
    }

    #[test]
    fn rates() {
        assert_eq!(TaxTreatment::LongTerm.tax_on(1_000.0), 125.0);
        assert_eq!(TaxTreatment::ShortTerm.tax_on(1_000.0), 300.0);
        assert_eq!(TaxTreatment::LongTerm.rate_percent(), 12.5);
        assert_eq!(TaxTreatment::ShortTerm.rate_percent(), 30.0);
    }

    #[test]
    fn losses_are_floored() {
        assert_eq!(realised_gain(100.0, 120.0), 0.0);
        assert_eq!(realised_gain(100.0, 80.0), 20.0);
    }
}
