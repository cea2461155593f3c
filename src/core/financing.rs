//! Debt/equity split, two-phase debt service, and cash flow after debt.

use crate::domain::model::{FinancingTerms, ModelWarning, PhaseTag};
use crate::utils::error::{ModelError, Result};
use crate::utils::validation::{validate_non_negative, validate_positive, validate_range};
use serde::{Deserialize, Serialize};

const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancingStructure {
    pub acquisition_price: f64,
    pub loan_amount: f64,
    pub equity_amount: f64,
    pub interest_only_years: f64,
    pub interest_only_debt_service: f64,
    pub amortizing_debt_service: f64,
}

impl FinancingStructure {
    pub fn annual_debt_service(&self, phase: PhaseTag) -> f64 {
        match phase {
            PhaseTag::InterestOnly => self.interest_only_debt_service,
            PhaseTag::Amortizing => self.amortizing_debt_service,
        }
    }

    pub fn is_debt_free(&self) -> bool {
        self.loan_amount == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPhase {
    pub phase: PhaseTag,
    pub annual_debt_service: f64,
    pub monthly_cash_flow: f64,
    pub annual_cash_flow: f64,
    pub cash_on_cash_return_percent: f64,
    /// NOI over debt service; `None` when the phase carries no debt.
    pub debt_service_coverage: Option<f64>,
}

impl CashFlowPhase {
    pub fn is_negative(&self) -> bool {
        self.annual_cash_flow < 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseCashFlows {
    pub interest_only: CashFlowPhase,
    pub amortizing: CashFlowPhase,
}

impl PhaseCashFlows {
    pub fn phase(&self, phase: PhaseTag) -> &CashFlowPhase {
        match phase {
            PhaseTag::InterestOnly => &self.interest_only,
            PhaseTag::Amortizing => &self.amortizing,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CashFlowPhase> {
        [&self.interest_only, &self.amortizing].into_iter()
    }

    /// Over-leveraged phases still compute; they are reported, not rejected.
    pub fn warnings(&self) -> Vec<ModelWarning> {
        self.iter()
            .filter(|phase| phase.is_negative())
            .map(|phase| ModelWarning::NegativeCashFlowAfterDebt {
                phase: phase.phase,
                annual_cash_flow: phase.annual_cash_flow,
            })
            .collect()
    }
}

pub fn validate_terms(terms: &FinancingTerms) -> Result<()> {
    validate_non_negative("financing.loan_to_value", terms.loan_to_value)?;
    if terms.loan_to_value >= 1.0 {
        return Err(ModelError::invalid_input(
            "financing.loan_to_value",
            terms.loan_to_value,
            "Loan-to-value must be below 1 so some equity is raised",
        ));
    }
    validate_non_negative("financing.interest_rate", terms.interest_rate)?;
    validate_range("financing.interest_rate", terms.interest_rate, 0.0, 1.0)?;
    validate_non_negative("financing.interest_only_years", terms.interest_only_years)?;
    validate_non_negative("financing.loan_term_years", terms.loan_term_years)?;

    if terms.loan_to_value > 0.0 {
        validate_positive("financing.amortization_years", terms.amortization_years)?;
        if terms.interest_only_years > terms.loan_term_years {
            return Err(ModelError::invalid_input(
                "financing.interest_only_years",
                terms.interest_only_years,
                format!(
                    "Interest-only period cannot exceed the {} year loan term",
                    terms.loan_term_years
                ),
            ));
        }
    }
    Ok(())
}

/// Level monthly payment of a fully amortizing loan.
pub fn amortizing_monthly_payment(principal: f64, annual_rate: f64, months: f64) -> f64 {
    if principal == 0.0 || months <= 0.0 {
        return 0.0;
    }
    let r = annual_rate / MONTHS_PER_YEAR;
    if r == 0.0 {
        return principal / months;
    }
    principal * r / (1.0 - (1.0 + r).powf(-months))
}

pub fn compute_financing(acquisition_price: f64, terms: &FinancingTerms) -> Result<FinancingStructure> {
    validate_positive("acquisition_price", acquisition_price)?;
    validate_terms(terms)?;

    let loan_amount = acquisition_price * terms.loan_to_value;
    let equity_amount = acquisition_price - loan_amount;

    let interest_only_debt_service = loan_amount * terms.interest_rate;
    let amortizing_debt_service = amortizing_monthly_payment(
        loan_amount,
        terms.interest_rate,
        terms.amortization_years * MONTHS_PER_YEAR,
    ) * MONTHS_PER_YEAR;

    Ok(FinancingStructure {
        acquisition_price,
        loan_amount,
        equity_amount,
        interest_only_years: terms.interest_only_years,
        interest_only_debt_service,
        amortizing_debt_service,
    })
}

fn cash_flow_phase(annual_noi: f64, financing: &FinancingStructure, phase: PhaseTag) -> CashFlowPhase {
    let annual_debt_service = financing.annual_debt_service(phase);
    let annual_cash_flow = annual_noi - annual_debt_service;
    let debt_service_coverage = if annual_debt_service > 0.0 {
        Some(annual_noi / annual_debt_service)
    } else {
        None
    };

    CashFlowPhase {
        phase,
        annual_debt_service,
        monthly_cash_flow: annual_cash_flow / MONTHS_PER_YEAR,
        annual_cash_flow,
        cash_on_cash_return_percent: annual_cash_flow / financing.equity_amount * 100.0,
        debt_service_coverage,
    }
}

/// The only place cash flow after debt is derived from NOI.
pub fn cash_flow_phases(annual_noi: f64, financing: &FinancingStructure) -> PhaseCashFlows {
    PhaseCashFlows {
        interest_only: cash_flow_phase(annual_noi, financing, PhaseTag::InterestOnly),
        amortizing: cash_flow_phase(annual_noi, financing, PhaseTag::Amortizing),
    }
}

pub fn cap_rate_percent(annual_noi: f64, acquisition_price: f64) -> f64 {
    annual_noi / acquisition_price * 100.0
}
