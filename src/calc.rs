use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// A repayment quote, both figures carried to exactly two decimal places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanQuote {
    pub monthly_payment: Decimal,
    pub total_repayment: Decimal,
}

/// Standard amortized-payment formula: with monthly rate r and term n,
/// monthly = P * r / (1 - (1 + r)^-n). A zero rate degenerates to straight
/// division, since the denominator would otherwise vanish.
///
/// The total repayment multiplies the already-rounded monthly payment, so
/// monthly * term always equals the total to the cent.
pub fn quote(loan_amount: f64, interest_rate: f64, loan_term: u32) -> LoanQuote {
    let monthly_rate = interest_rate / 100.0 / 12.0;
    let raw_monthly = if monthly_rate == 0.0 {
        loan_amount / f64::from(loan_term)
    } else {
        (loan_amount * monthly_rate) / (1.0 - (1.0 + monthly_rate).powi(-(loan_term as i32)))
    };

    let monthly_payment = to_cents(raw_monthly);
    let total_repayment = round_cents(monthly_payment * Decimal::from(loan_term));

    LoanQuote {
        monthly_payment,
        total_repayment,
    }
}

fn to_cents(value: f64) -> Decimal {
    round_cents(Decimal::from_f64(value).unwrap_or_default())
}

fn round_cents(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
