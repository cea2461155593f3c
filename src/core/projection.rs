//! Multi-year total return per share, and its scaling to an investor position.
//!
//! Appreciation is a flat fraction of the share price taken once over the
//! whole holding period. It does not compound with the number of years.

use crate::core::shares::ShareEconomics;
use crate::domain::model::{AppreciationPolicy, Archetype, ShareParameters};
use crate::utils::error::{ModelError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub holding_period_years: f64,
    pub total_distributions: f64,
    pub appreciation: f64,
    pub terminal_value_per_share: f64,
    pub total_return_per_share: f64,
    pub equity_multiple: f64,
    pub annualized_return_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionTable {
    pub archetype: Archetype,
    pub share_price: f64,
    pub rows: Vec<ProjectionResult>,
}

pub fn validate_holding_period(years: f64) -> Result<()> {
    if !years.is_finite() || years <= 0.0 {
        return Err(ModelError::InvalidHoldingPeriod { years });
    }
    Ok(())
}

/// Distributions per share over `years`, weighted by financing phase.
pub fn cumulative_distributions(economics: &ShareEconomics, years: f64) -> f64 {
    let interest_only_years = years.min(economics.interest_only_years);
    let amortizing_years = (years - economics.interest_only_years).max(0.0);

    interest_only_years * economics.interest_only.per_share_annual
        + amortizing_years * economics.amortizing.per_share_annual
}

fn annualized_return_percent(equity_multiple: f64, years: f64) -> f64 {
    if equity_multiple <= 0.0 {
        // 全額虧損
        return -100.0;
    }
    (equity_multiple.powf(1.0 / years) - 1.0) * 100.0
}

pub fn project(
    economics: &ShareEconomics,
    archetype: Archetype,
    years: f64,
    policy: &AppreciationPolicy,
) -> Result<ProjectionResult> {
    validate_holding_period(years)?;

    let share_price = economics.share_price;
    let total_distributions = cumulative_distributions(economics, years);
    let appreciation = share_price * policy.rate_for(archetype);
    let equity_multiple = (total_distributions + appreciation + share_price) / share_price;

    Ok(ProjectionResult {
        holding_period_years: years,
        total_distributions,
        appreciation,
        terminal_value_per_share: share_price + appreciation,
        total_return_per_share: total_distributions + appreciation,
        equity_multiple,
        annualized_return_percent: annualized_return_percent(equity_multiple, years),
    })
}

/// Rows come back in the order the periods were requested.
pub fn project_table(
    economics: &ShareEconomics,
    archetype: Archetype,
    holding_periods: &[f64],
    policy: &AppreciationPolicy,
) -> Result<ProjectionTable> {
    let rows = holding_periods
        .iter()
        .map(|&years| project(economics, archetype, years, policy))
        .collect::<Result<Vec<_>>>()?;

    Ok(ProjectionTable {
        archetype,
        share_price: economics.share_price,
        rows,
    })
}

// ---------------------------------------------------------------------------
// Investor position
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionRow {
    pub holding_period_years: f64,
    pub total_distributions: f64,
    pub appreciation: f64,
    pub total_return: f64,
    pub ending_value: f64,
    pub equity_multiple: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorPosition {
    pub shares: u64,
    pub investment_amount: f64,
    pub interest_only_monthly_distribution: f64,
    pub amortizing_monthly_distribution: f64,
    pub amortizing_annual_distribution: f64,
    pub rows: Vec<PositionRow>,
}

pub fn investor_position(
    economics: &ShareEconomics,
    params: &ShareParameters,
    table: &ProjectionTable,
    shares: u64,
) -> Result<InvestorPosition> {
    if shares == 0 || shares > economics.total_shares {
        return Err(ModelError::invalid_input(
            "shares",
            shares,
            format!("Share count must be between 1 and {}", economics.total_shares),
        ));
    }

    let units = shares as f64;
    let investment_amount = units * economics.share_price;
    let max_investment = params
        .max_investment
        .unwrap_or_else(|| economics.issued_equity());
    if investment_amount < params.min_investment || investment_amount > max_investment {
        return Err(ModelError::InvestmentOutOfRange {
            amount: investment_amount,
            min: params.min_investment,
            max: max_investment,
        });
    }

    let rows = table
        .rows
        .iter()
        .map(|row| PositionRow {
            holding_period_years: row.holding_period_years,
            total_distributions: row.total_distributions * units,
            appreciation: row.appreciation * units,
            total_return: row.total_return_per_share * units,
            ending_value: row.terminal_value_per_share * units,
            equity_multiple: row.equity_multiple,
        })
        .collect();

    Ok(InvestorPosition {
        shares,
        investment_amount,
        interest_only_monthly_distribution: economics.interest_only.per_share_monthly * units,
        amortizing_monthly_distribution: economics.amortizing.per_share_monthly * units,
        amortizing_annual_distribution: economics.amortizing.per_share_annual * units,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shares::PhaseShareEconomics;
    use crate::domain::model::PhaseTag;

    fn economics(io_annual: f64, amort_annual: f64, io_years: f64) -> ShareEconomics {
        let phase = |phase, annual: f64| PhaseShareEconomics {
            phase,
            per_share_monthly: annual / 12.0,
            per_share_annual: annual,
            yield_percent: annual / 1_000.0 * 100.0,
        };
        ShareEconomics {
            share_price: 1_000.0,
            total_shares: 3_232,
            interest_only_years: io_years,
            interest_only: phase(PhaseTag::InterestOnly, io_annual),
            amortizing: phase(PhaseTag::Amortizing, amort_annual),
        }
    }

    #[test]
    fn test_phase_weighted_distributions() {
        let e = economics(130.0, 112.0, 3.0);
        // 3 * 130 + 2 * 112
        assert!((cumulative_distributions(&e, 5.0) - 614.0).abs() < 1e-9);
        // shorter than the interest-only period
        assert!((cumulative_distributions(&e, 2.0) - 260.0).abs() < 1e-9);
        assert!((cumulative_distributions(&e, 3.0) - 390.0).abs() < 1e-9);
    }

    #[test]
    fn test_projection_metrics() {
        let e = economics(130.0, 112.0, 3.0);
        let policy = AppreciationPolicy::default().with_rate(Archetype::Multifamily, 0.25);
        let result = project(&e, Archetype::Multifamily, 5.0, &policy).unwrap();

        assert!((result.appreciation - 250.0).abs() < 1e-9);
        assert!((result.terminal_value_per_share - 1_250.0).abs() < 1e-9);
        assert!((result.total_return_per_share - 864.0).abs() < 1e-9);
        assert!((result.equity_multiple - 1.864).abs() < 1e-12);
        let expected = (1.864_f64.powf(0.2) - 1.0) * 100.0;
        assert!((result.annualized_return_percent - expected).abs() < 1e-9);
    }

    #[test]
    fn test_appreciation_is_flat_across_holding_periods() {
        let e = economics(100.0, 100.0, 0.0);
        let policy = AppreciationPolicy::default();
        let short = project(&e, Archetype::GroundLease, 1.0, &policy).unwrap();
        let long = project(&e, Archetype::GroundLease, 10.0, &policy).unwrap();
        assert_eq!(short.appreciation, long.appreciation);
    }

    #[test]
    fn test_injected_policy_overrides_default() {
        let e = economics(100.0, 100.0, 0.0);
        let policy = AppreciationPolicy::default().with_rate(Archetype::Business, 0.0);
        let result = project(&e, Archetype::Business, 5.0, &policy).unwrap();
        assert_eq!(result.appreciation, 0.0);
        assert!((result.equity_multiple - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_holding_periods() {
        let e = economics(100.0, 100.0, 0.0);
        let policy = AppreciationPolicy::default();
        for years in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = project(&e, Archetype::Multifamily, years, &policy);
            assert!(matches!(result, Err(ModelError::InvalidHoldingPeriod { .. })));
        }
    }

    #[test]
    fn test_total_loss_reports_minus_one_hundred() {
        let e = economics(-400.0, -400.0, 0.0);
        let policy = AppreciationPolicy::default().with_rate(Archetype::Business, 0.0);
        let result = project(&e, Archetype::Business, 5.0, &policy).unwrap();
        assert!(result.equity_multiple < 0.0);
        assert_eq!(result.annualized_return_percent, -100.0);
    }

    #[test]
    fn test_table_preserves_request_order() {
        let e = economics(130.0, 112.0, 3.0);
        let table =
            project_table(&e, Archetype::Multifamily, &[10.0, 1.0, 5.0], &AppreciationPolicy::default())
                .unwrap();
        let years: Vec<f64> = table.rows.iter().map(|r| r.holding_period_years).collect();
        assert_eq!(years, vec![10.0, 1.0, 5.0]);
    }

    #[test]
    fn test_position_scales_linearly() {
        let e = economics(130.0, 112.0, 3.0);
        let params = ShareParameters::default();
        let table =
            project_table(&e, Archetype::Multifamily, &[5.0], &AppreciationPolicy::default()).unwrap();

        let one = investor_position(&e, &params, &table, 10).unwrap();
        let two = investor_position(&e, &params, &table, 20).unwrap();

        assert!((two.rows[0].total_distributions - 2.0 * one.rows[0].total_distributions).abs() < 1e-9);
        assert!((two.rows[0].appreciation - 2.0 * one.rows[0].appreciation).abs() < 1e-9);
        assert!((two.investment_amount - 20_000.0).abs() < 1e-9);
        assert_eq!(one.rows[0].equity_multiple, two.rows[0].equity_multiple);
    }

    #[test]
    fn test_position_bounds() {
        let e = economics(130.0, 112.0, 3.0);
        let params = ShareParameters {
            share_price: 1_000.0,
            min_investment: 5_000.0,
            max_investment: Some(50_000.0),
        };
        let table =
            project_table(&e, Archetype::Multifamily, &[5.0], &AppreciationPolicy::default()).unwrap();

        assert!(matches!(
            investor_position(&e, &params, &table, 2),
            Err(ModelError::InvestmentOutOfRange { .. })
        ));
        assert!(matches!(
            investor_position(&e, &params, &table, 51),
            Err(ModelError::InvestmentOutOfRange { .. })
        ));
        assert!(matches!(
            investor_position(&e, &params, &table, 0),
            Err(ModelError::InvalidInput { .. })
        ));
        assert!(matches!(
            investor_position(&e, &params, &table, 10_000),
            Err(ModelError::InvalidInput { .. })
        ));
        assert!(investor_position(&e, &params, &table, 5).is_ok());
    }
}
