/// Converts an annual percentage (e.g. `5.38`) into a monthly decimal rate.
pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 100.0 / 12.0
}

/// Fixed fully-amortizing payment for `principal` over `term_months`.
///
/// `monthly_rate` must be positive; a zero rate divides by zero and yields a
/// non-finite payment. Callers guarantee the rate before reaching this point.
pub fn monthly_payment(principal: f64, monthly_rate: f64, term_months: u32) -> f64 {
    let growth = (1.0 + monthly_rate).powi(term_months as i32);
    principal * (monthly_rate * growth) / (growth - 1.0)
}

pub fn loan_to_value_percent(principal: f64, property_price: f64) -> f64 {
    if property_price <= 0.0 {
        return 0.0;
    }
    principal / property_price * 100.0
}
