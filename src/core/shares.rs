//! Per-share distributions and yield.

use crate::core::financing::PhaseCashFlows;
use crate::domain::model::PhaseTag;
use crate::utils::error::{ModelError, Result};
use crate::utils::validation::{validate_non_negative, validate_positive};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseShareEconomics {
    pub phase: PhaseTag,
    pub per_share_monthly: f64,
    pub per_share_annual: f64,
    pub yield_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShareEconomics {
    pub share_price: f64,
    pub total_shares: u64,
    pub interest_only_years: f64,
    pub interest_only: PhaseShareEconomics,
    pub amortizing: PhaseShareEconomics,
}

impl ShareEconomics {
    pub fn phase(&self, phase: PhaseTag) -> &PhaseShareEconomics {
        match phase {
            PhaseTag::InterestOnly => &self.interest_only,
            PhaseTag::Amortizing => &self.amortizing,
        }
    }

    /// Equity actually represented by issued shares.
    pub fn issued_equity(&self) -> f64 {
        self.total_shares as f64 * self.share_price
    }
}

/// Annual yield on the share price, in percent. Every report derives yield here.
pub fn yield_percent(per_share_annual: f64, share_price: f64) -> f64 {
    per_share_annual / share_price * 100.0
}

/// Whole shares the equity supports. Never rounds up.
pub fn total_shares(equity_amount: f64, share_price: f64) -> Result<u64> {
    validate_non_negative("equity_amount", equity_amount)?;
    validate_positive("share_price", share_price)?;

    let mut shares = (equity_amount / share_price).floor() as u64;
    // 浮點誤差可能讓 floor 多算一股
    while shares > 0 && shares as f64 * share_price > equity_amount {
        shares -= 1;
    }
    Ok(shares)
}

pub fn compute_share_economics(
    equity_amount: f64,
    share_price: f64,
    cash_flows: &PhaseCashFlows,
    interest_only_years: f64,
) -> Result<ShareEconomics> {
    let shares = total_shares(equity_amount, share_price)?;
    if shares == 0 {
        return Err(ModelError::invalid_input(
            "share_price",
            share_price,
            format!("Share price exceeds the raised equity of {:.2}", equity_amount),
        ));
    }

    let per_phase = |phase: PhaseTag| {
        let per_share_annual = cash_flows.phase(phase).annual_cash_flow / shares as f64;
        PhaseShareEconomics {
            phase,
            per_share_monthly: per_share_annual / 12.0,
            per_share_annual,
            yield_percent: yield_percent(per_share_annual, share_price),
        }
    };

    Ok(ShareEconomics {
        share_price,
        total_shares: shares,
        interest_only_years,
        interest_only: per_phase(PhaseTag::InterestOnly),
        amortizing: per_phase(PhaseTag::Amortizing),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::financing::CashFlowPhase;

    fn flows(interest_only: f64, amortizing: f64) -> PhaseCashFlows {
        let phase = |phase, annual_cash_flow: f64| CashFlowPhase {
            phase,
            annual_debt_service: 0.0,
            monthly_cash_flow: annual_cash_flow / 12.0,
            annual_cash_flow,
            cash_on_cash_return_percent: 0.0,
            debt_service_coverage: None,
        };
        PhaseCashFlows {
            interest_only: phase(PhaseTag::InterestOnly, interest_only),
            amortizing: phase(PhaseTag::Amortizing, amortizing),
        }
    }

    #[test]
    fn test_scenario_a_per_share_yield() {
        let economics =
            compute_share_economics(3_232_500.0, 1_000.0, &flows(450_000.0, 364_527.0), 3.0).unwrap();

        assert_eq!(economics.total_shares, 3_232);
        assert!((economics.amortizing.per_share_annual - 112.79).abs() < 0.005);
        assert!((economics.amortizing.yield_percent - 11.28).abs() < 0.005);
        assert!((economics.amortizing.per_share_monthly * 12.0 - economics.amortizing.per_share_annual).abs() < 1e-9);
        assert!(economics.issued_equity() <= 3_232_500.0);
    }

    #[test]
    fn test_scenario_b_floor_invariant() {
        let equity = 29_165_000.0 - 29_165_000.0 * 0.70;
        let shares = total_shares(equity, 5_000.0).unwrap();
        assert_eq!(shares, 1_749);
        assert!(shares as f64 * 5_000.0 <= equity);
    }

    #[test]
    fn test_floor_invariant_over_awkward_prices() {
        for price in [0.1, 3.0, 7.77, 33.33, 999.99, 1_000.0, 4_999.5] {
            let equity = 3_232_500.000_000_001;
            let shares = total_shares(equity, price).unwrap();
            assert!(shares as f64 * price <= equity, "price {}", price);
            assert!((shares + 1) as f64 * price > equity, "price {}", price);
        }
    }

    #[test]
    fn test_zero_share_price_is_guarded() {
        let result = compute_share_economics(1_000_000.0, 0.0, &flows(1.0, 1.0), 0.0);
        assert!(matches!(result, Err(ModelError::InvalidInput { .. })));

        let result = compute_share_economics(1_000_000.0, f64::NAN, &flows(1.0, 1.0), 0.0);
        assert!(matches!(result, Err(ModelError::InvalidInput { .. })));
    }

    #[test]
    fn test_share_price_above_equity_is_guarded() {
        let result = compute_share_economics(500.0, 1_000.0, &flows(1.0, 1.0), 0.0);
        assert!(matches!(result, Err(ModelError::InvalidInput { .. })));
    }

    #[test]
    fn test_identical_inputs_give_bit_identical_output() {
        let cash = flows(421_381.25, 364_527.0);
        let a = compute_share_economics(3_232_500.0, 1_000.0, &cash, 3.0).unwrap();
        let b = compute_share_economics(3_232_500.0, 1_000.0, &cash, 3.0).unwrap();
        assert_eq!(a.amortizing.per_share_annual.to_bits(), b.amortizing.per_share_annual.to_bits());
        assert_eq!(a.interest_only.yield_percent.to_bits(), b.interest_only.yield_percent.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_yield_is_single_formula() {
        let economics =
            compute_share_economics(1_000_000.0, 500.0, &flows(80_000.0, 60_000.0), 2.0).unwrap();
        for phase in [PhaseTag::InterestOnly, PhaseTag::Amortizing] {
            let p = economics.phase(phase);
            assert_eq!(p.yield_percent, yield_percent(p.per_share_annual, economics.share_price));
        }
    }
}
