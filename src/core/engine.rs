use crate::core::financing::{self, FinancingStructure, PhaseCashFlows};
use crate::core::normalizer::PropertyNormalizer;
use crate::core::operating::{self, OperatingStatement};
use crate::core::projection::{self, InvestorPosition, ProjectionTable};
use crate::core::shares::{self, ShareEconomics};
use crate::domain::model::{Archetype, Listing, ModelWarning, RawPropertyRecord};
use crate::domain::ports::AssumptionsProvider;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};

/// Headline figures for a listing page, taken from the stabilized (amortizing) phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentSummary {
    pub property_id: String,
    pub archetype: Archetype,
    pub monthly_distribution_per_share: f64,
    pub annual_yield_percent: f64,
    pub total_shares: u64,
    pub min_investment: f64,
    pub interest_only_monthly_distribution_per_share: f64,
    pub interest_only_yield_percent: f64,
}

impl InvestmentSummary {
    fn new(listing: &Listing, economics: &ShareEconomics) -> Self {
        Self {
            property_id: listing.property.id.clone(),
            archetype: listing.property.archetype,
            monthly_distribution_per_share: economics.amortizing.per_share_monthly,
            annual_yield_percent: economics.amortizing.yield_percent,
            total_shares: economics.total_shares,
            min_investment: listing.shares.min_investment,
            interest_only_monthly_distribution_per_share: economics.interest_only.per_share_monthly,
            interest_only_yield_percent: economics.interest_only.yield_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentReport {
    pub listing: Listing,
    pub operating: OperatingStatement,
    pub financing: FinancingStructure,
    pub cash_flows: PhaseCashFlows,
    pub cap_rate_percent: f64,
    pub economics: ShareEconomics,
    pub summary: InvestmentSummary,
    pub projections: ProjectionTable,
    pub warnings: Vec<ModelWarning>,
}

impl InvestmentReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Runs a listing through normalization, NOI, financing, share economics and
/// projections. Holds nothing between calls besides the assumptions.
pub struct InvestmentModel<C: AssumptionsProvider> {
    assumptions: C,
}

impl<C: AssumptionsProvider> InvestmentModel<C> {
    pub fn new(assumptions: C) -> Self {
        Self { assumptions }
    }

    pub fn normalize(&self, raw: &RawPropertyRecord) -> Result<Listing> {
        PropertyNormalizer::new(&self.assumptions).normalize(raw)
    }

    pub fn evaluate(&self, raw: &RawPropertyRecord) -> Result<InvestmentReport> {
        self.evaluate_for_periods(raw, self.assumptions.holding_periods())
    }

    pub fn evaluate_for_periods(
        &self,
        raw: &RawPropertyRecord,
        holding_periods: &[f64],
    ) -> Result<InvestmentReport> {
        let listing = self.normalize(raw)?;
        self.evaluate_listing(listing, holding_periods)
    }

    pub fn evaluate_listing(&self, listing: Listing, holding_periods: &[f64]) -> Result<InvestmentReport> {
        let property = &listing.property;

        let operating = operating::compute_noi(property);
        let financing = financing::compute_financing(property.acquisition_price, &listing.financing)?;
        let cash_flows = financing::cash_flow_phases(operating.annual_noi, &financing);
        let economics = shares::compute_share_economics(
            financing.equity_amount,
            listing.shares.share_price,
            &cash_flows,
            financing.interest_only_years,
        )?;
        let projections = projection::project_table(
            &economics,
            property.archetype,
            holding_periods,
            self.assumptions.appreciation_policy(),
        )?;

        Ok(InvestmentReport {
            cap_rate_percent: financing::cap_rate_percent(operating.annual_noi, property.acquisition_price),
            summary: InvestmentSummary::new(&listing, &economics),
            warnings: cash_flows.warnings(),
            listing,
            operating,
            financing,
            cash_flows,
            economics,
            projections,
        })
    }

    /// Scales a report to the investor's share count. Recomputed on every call.
    pub fn position(&self, report: &InvestmentReport, shares: u64) -> Result<InvestorPosition> {
        projection::investor_position(
            &report.economics,
            &report.listing.shares,
            &report.projections,
            shares,
        )
    }
}
