//! Financial calculators for the Tools view.
//!
//! Pure arithmetic, no state: SIP projection, stock averaging, allotment
//! probability, CAGR, Indian equity capital-gains tax, the Graham number,
//! and the per-lot investment estimate shown for an IPO application.

/// Calculators available in the Tools view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Systematic investment plan future value
    Sip,
    /// Average purchase price across multiple buys
    StockAverage,
    /// IPO allotment probability from offered vs applied shares
    Allotment,
    /// Compound annual growth rate
    Cagr,
    /// Capital-gains tax on an equity sale
    CapitalGains,
    /// Graham fair-value estimate
    Graham,
}

impl Tool {
    /// Returns a slice containing all calculator variants.
    pub fn all() -> &'static [Tool] {
        &[
            Tool::Sip,
            Tool::StockAverage,
            Tool::Allotment,
            Tool::Cagr,
            Tool::CapitalGains,
            Tool::Graham,
        ]
    }

    /// Returns a human-readable display label for the calculator.
    pub fn label(&self) -> &'static str {
        match self {
            Tool::Sip => "SIP",
            Tool::StockAverage => "Stock Average",
            Tool::Allotment => "Allotment Prob",
            Tool::Cagr => "CAGR",
            Tool::CapitalGains => "Capital Gains",
            Tool::Graham => "Graham Value",
        }
    }

    /// Parses user input into a Tool.
    ///
    /// Matching is case-insensitive and supports aliases:
    /// - "sip" -> Sip
    /// - "average" | "avg" -> StockAverage
    /// - "allotment" | "prob" -> Allotment
    /// - "cagr" -> Cagr
    /// - "tax" | "gains" -> CapitalGains
    /// - "graham" -> Graham
    ///
    /// Returns `None` if the input doesn't match any calculator.
    #[allow(dead_code)]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Tool> {
        match s.to_lowercase().trim() {
            "sip" => Some(Tool::Sip),
            "average" | "avg" => Some(Tool::StockAverage),
            "allotment" | "prob" => Some(Tool::Allotment),
            "cagr" => Some(Tool::Cagr),
            "tax" | "gains" => Some(Tool::CapitalGains),
            "graham" => Some(Tool::Graham),
            _ => None,
        }
    }
}

/// Result of a SIP projection, rounded to whole currency units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SipProjection {
    /// Total amount invested over the period
    pub invested: f64,
    /// Wealth gained over the invested amount
    pub gains: f64,
    /// Future value at the end of the period
    pub total: f64,
}

/// Projects the future value of a monthly SIP.
///
/// FV = P × ({[1 + i]^n − 1} / i) × (1 + i), with i the monthly rate and
/// n the number of monthly installments. A zero rate degenerates to the
/// invested amount.
pub fn sip_projection(monthly: f64, annual_rate_pct: f64, years: u32) -> SipProjection {
    let n = (years * 12) as f64;
    let invested = monthly * n;
    let i = annual_rate_pct / 12.0 / 100.0;

    let total = if i == 0.0 {
        invested
    } else {
        monthly * (((1.0 + i).powf(n) - 1.0) / i) * (1.0 + i)
    };

    SipProjection {
        invested: invested.round(),
        gains: (total - invested).round(),
        total: total.round(),
    }
}

/// Aggregate of a multi-buy position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockAverage {
    /// Sum of price × quantity over all rows
    pub total_cost: f64,
    /// Sum of quantities
    pub total_qty: f64,
    /// Weighted average price; zero when no shares were bought
    pub average: f64,
}

/// Computes the weighted average purchase price over (price, quantity) rows.
pub fn average_price(rows: &[(f64, f64)]) -> StockAverage {
    let mut total_cost = 0.0;
    let mut total_qty = 0.0;

    for (price, qty) in rows {
        total_cost += price * qty;
        total_qty += qty;
    }

    let average = if total_qty > 0.0 {
        total_cost / total_qty
    } else {
        0.0
    };

    StockAverage {
        total_cost,
        total_qty,
        average,
    }
}

/// Probability of at least one lot being allotted, as a percentage.
///
/// Capped at 100; zero when nothing was applied for.
pub fn allotment_probability(offered_shares: f64, applied_shares: f64) -> f64 {
    if applied_shares <= 0.0 {
        return 0.0;
    }
    ((offered_shares / applied_shares) * 100.0).min(100.0)
}

/// Compound annual growth rate as a percentage.
///
/// Returns `None` for non-positive inputs or a zero period.
pub fn cagr(initial: f64, final_value: f64, years: f64) -> Option<f64> {
    if initial <= 0.0 || final_value <= 0.0 || years <= 0.0 {
        return None;
    }
    Some(((final_value / initial).powf(1.0 / years) - 1.0) * 100.0)
}

/// Holding period beyond which an equity sale is long-term
pub const LONG_TERM_DAYS: u32 = 365;

/// Annual LTCG exemption on listed equity, in currency units
pub const LTCG_EXEMPTION: f64 = 125_000.0;

/// Long-term capital-gains rate on listed equity
pub const LTCG_RATE: f64 = 0.125;

/// Short-term capital-gains rate on listed equity
pub const STCG_RATE: f64 = 0.20;

/// Breakdown of the tax on an equity sale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapitalGains {
    /// Realized gain (negative for a loss)
    pub gain: f64,
    /// Gain subject to tax after the applicable exemption
    pub taxable_gain: f64,
    /// Tax due
    pub tax: f64,
    /// Whether the holding qualified as long-term
    pub is_long_term: bool,
}

/// Computes capital-gains tax on a listed equity sale under the Indian
/// regime: 12.5% beyond the ₹1.25L exemption when held over a year,
/// 20% otherwise. Losses carry no tax.
pub fn capital_gains_tax(
    buy_price: f64,
    sell_price: f64,
    quantity: f64,
    holding_days: u32,
) -> CapitalGains {
    let gain = (sell_price - buy_price) * quantity;
    let is_long_term = holding_days > LONG_TERM_DAYS;

    let (taxable_gain, rate) = if gain <= 0.0 {
        (0.0, 0.0)
    } else if is_long_term {
        ((gain - LTCG_EXEMPTION).max(0.0), LTCG_RATE)
    } else {
        (gain, STCG_RATE)
    };

    CapitalGains {
        gain,
        taxable_gain,
        tax: taxable_gain * rate,
        is_long_term,
    }
}

/// Graham fair-value estimate: √(22.5 × EPS × book value per share).
///
/// Returns `None` when either input is non-positive (the formula has no
/// meaning for loss-making or negative-equity companies).
pub fn graham_number(eps: f64, book_value_per_share: f64) -> Option<f64> {
    if eps <= 0.0 || book_value_per_share <= 0.0 {
        return None;
    }
    Some((22.5 * eps * book_value_per_share).sqrt())
}

/// Capital required for one lot at the band extremes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvestmentEstimate {
    /// One lot at the lower band
    pub min_amount: f64,
    /// One lot at the upper band
    pub max_amount: f64,
}

/// Estimates the application amount for one lot of an IPO.
pub fn lot_investment(lot_size: u32, min_price: f64, max_price: f64) -> InvestmentEstimate {
    InvestmentEstimate {
        min_amount: lot_size as f64 * min_price,
        max_amount: lot_size as f64 * max_price,
    }
}
