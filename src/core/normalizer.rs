//! Raw listing records to canonical `Property` values.
//!
//! The archetype is resolved here, once. Its revenue profile and expense
//! schedule are fixed on the property, so nothing downstream branches on the
//! archetype string again.

use crate::domain::model::{
    Archetype, ArchetypeDefaults, ExpenseCategory, ExpenseItem, ExpenseSchedule, FinancingTerms,
    Listing, OperatingProfile, Property, RawExpenses, RawFinancingTerms, RawPropertyRecord,
    RawShareParameters, ShareParameters,
};
use crate::domain::ports::AssumptionsProvider;
use crate::utils::error::{ModelError, Result};
use crate::utils::validation::{
    validate_fraction, validate_non_empty_string, validate_non_negative, validate_positive,
    validate_required_field,
};

const MONTHS_PER_YEAR: f64 = 12.0;

pub struct PropertyNormalizer<'a, C: AssumptionsProvider> {
    assumptions: &'a C,
}

impl<'a, C: AssumptionsProvider> PropertyNormalizer<'a, C> {
    pub fn new(assumptions: &'a C) -> Self {
        Self { assumptions }
    }

    pub fn normalize(&self, raw: &RawPropertyRecord) -> Result<Listing> {
        validate_non_empty_string("id", &raw.id)?;
        let archetype: Archetype = raw.archetype.parse()?;
        let defaults = self.assumptions.archetype_defaults(archetype);

        let acquisition_price =
            *validate_required_field(&raw.id, "acquisition_price", &raw.acquisition_price)?;
        if !acquisition_price.is_finite() || acquisition_price <= 0.0 {
            return Err(ModelError::IncompleteProperty {
                property_id: raw.id.clone(),
                field: "acquisition_price".to_string(),
            });
        }
        if let Some(sqft) = raw.square_footage {
            validate_non_negative("square_footage", sqft)?;
        }

        let profile = self.operating_profile(raw, archetype, &defaults)?;
        let expenses = self.expense_schedule(
            archetype,
            acquisition_price,
            raw.expenses.as_ref(),
            &defaults,
        )?;

        let property = Property {
            id: raw.id.clone(),
            archetype,
            acquisition_price,
            year_built: raw.year_built,
            square_footage: raw.square_footage,
            profile,
            expenses,
        };

        Ok(Listing {
            property,
            financing: self.financing_terms(raw.financing.as_ref()),
            shares: self.share_parameters(raw.shares.as_ref())?,
        })
    }

    fn operating_profile(
        &self,
        raw: &RawPropertyRecord,
        archetype: Archetype,
        defaults: &ArchetypeDefaults,
    ) -> Result<OperatingProfile> {
        let profile = match archetype {
            Archetype::SingleFamily | Archetype::Multifamily => {
                let unit_count = if archetype == Archetype::SingleFamily {
                    1
                } else {
                    raw.unit_count.unwrap_or(defaults.unit_count)
                };
                if unit_count == 0 {
                    return Err(ModelError::invalid_input(
                        "unit_count",
                        unit_count,
                        "Unit count must be at least 1",
                    ));
                }
                let avg_rent_per_unit =
                    *validate_required_field(&raw.id, "monthly_rent", &raw.monthly_rent)?;
                validate_non_negative("monthly_rent", avg_rent_per_unit)?;
                let occupancy_rate = raw.occupancy_rate.unwrap_or(defaults.occupancy_rate);
                validate_fraction("occupancy_rate", occupancy_rate)?;

                OperatingProfile::Rental {
                    unit_count,
                    avg_rent_per_unit,
                    occupancy_rate,
                }
            }
            Archetype::Business => {
                let metrics = raw.business_metrics.clone().unwrap_or_default();
                let monthly_gross_revenue = *validate_required_field(
                    &raw.id,
                    "business_metrics.monthly_gross_revenue",
                    &metrics.monthly_gross_revenue,
                )?;
                validate_non_negative("business_metrics.monthly_gross_revenue", monthly_gross_revenue)?;
                let operating_margin = metrics.operating_margin.unwrap_or(defaults.operating_margin);
                validate_fraction("business_metrics.operating_margin", operating_margin)?;

                OperatingProfile::Business {
                    monthly_gross_revenue,
                    operating_margin,
                }
            }
            Archetype::GroundLease => {
                let monthly_lease =
                    *validate_required_field(&raw.id, "monthly_rent", &raw.monthly_rent)?;
                validate_non_negative("monthly_rent", monthly_lease)?;
                OperatingProfile::GroundLease { monthly_lease }
            }
        };
        Ok(profile)
    }

    fn expense_schedule(
        &self,
        archetype: Archetype,
        acquisition_price: f64,
        raw: Option<&RawExpenses>,
        defaults: &ArchetypeDefaults,
    ) -> Result<ExpenseSchedule> {
        let raw = raw.cloned().unwrap_or_default();

        let platform_fee_rate = raw
            .platform_fee_rate
            .unwrap_or_else(|| self.assumptions.platform_fee_rate());
        validate_fraction("expenses.platform_fee_rate", platform_fee_rate)?;
        let platform_fee =
            ExpenseItem::percent_of_income(ExpenseCategory::PlatformFee, platform_fee_rate);

        // 淨租約只保留平台費，其餘費用由承租人負擔
        if archetype == Archetype::GroundLease {
            return Ok(ExpenseSchedule::new(vec![platform_fee]));
        }

        let management_fee_rate = raw
            .management_fee_rate
            .unwrap_or(defaults.management_fee_rate);
        validate_fraction("expenses.management_fee_rate", management_fee_rate)?;

        let insurance_monthly = raw
            .insurance_monthly
            .unwrap_or(acquisition_price * defaults.insurance_rate / MONTHS_PER_YEAR);
        validate_non_negative("expenses.insurance_monthly", insurance_monthly)?;

        let property_tax_monthly = raw
            .property_tax_monthly
            .unwrap_or(acquisition_price * defaults.property_tax_rate / MONTHS_PER_YEAR);
        validate_non_negative("expenses.property_tax_monthly", property_tax_monthly)?;

        // 維修費可填固定金額或收入比例，固定金額優先
        let maintenance = match (raw.maintenance_monthly, raw.maintenance_rate) {
            (Some(monthly), _) => {
                validate_non_negative("expenses.maintenance_monthly", monthly)?;
                ExpenseItem::fixed(ExpenseCategory::Maintenance, monthly)
            }
            (None, rate) => {
                let rate = rate.unwrap_or(defaults.maintenance_rate);
                validate_fraction("expenses.maintenance_rate", rate)?;
                ExpenseItem::percent_of_income(ExpenseCategory::Maintenance, rate)
            }
        };

        Ok(ExpenseSchedule::new(vec![
            ExpenseItem::percent_of_income(ExpenseCategory::Management, management_fee_rate),
            ExpenseItem::fixed(ExpenseCategory::Insurance, insurance_monthly),
            ExpenseItem::fixed(ExpenseCategory::PropertyTax, property_tax_monthly),
            maintenance,
            platform_fee,
        ]))
    }

    /// Term-by-term merge over the configured defaults. Validation happens in financing.
    fn financing_terms(&self, raw: Option<&RawFinancingTerms>) -> FinancingTerms {
        let defaults = self.assumptions.default_financing();
        let Some(raw) = raw else {
            return defaults;
        };

        FinancingTerms {
            loan_to_value: raw.loan_to_value.unwrap_or(defaults.loan_to_value),
            interest_rate: raw.interest_rate.unwrap_or(defaults.interest_rate),
            interest_only_years: raw
                .interest_only_years
                .unwrap_or(defaults.interest_only_years),
            amortization_years: raw.amortization_years.unwrap_or(defaults.amortization_years),
            loan_term_years: raw.loan_term_years.unwrap_or(defaults.loan_term_years),
        }
    }

    fn share_parameters(&self, raw: Option<&RawShareParameters>) -> Result<ShareParameters> {
        let defaults = self.assumptions.default_share_parameters();
        let raw = raw.cloned().unwrap_or_default();

        let share_price = raw.share_price.unwrap_or(defaults.share_price);
        validate_positive("shares.share_price", share_price)?;
        // 未指定最低投資額時，最少一股
        let min_investment = raw
            .min_investment
            .unwrap_or_else(|| defaults.min_investment.max(share_price));
        validate_non_negative("shares.min_investment", min_investment)?;

        let max_investment = raw.max_investment.or(defaults.max_investment);
        if let Some(max) = max_investment {
            validate_positive("shares.max_investment", max)?;
            if max < min_investment {
                return Err(ModelError::invalid_input(
                    "shares.max_investment",
                    max,
                    format!("Maximum investment is below the minimum of {}", min_investment),
                ));
            }
        }

        Ok(ShareParameters {
            share_price,
            min_investment,
            max_investment,
        })
    }
}
