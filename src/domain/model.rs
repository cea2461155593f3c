use crate::utils::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Archetype
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    SingleFamily,
    Multifamily,
    Business,
    GroundLease,
}

impl Archetype {
    pub const ALL: [Archetype; 4] = [
        Archetype::SingleFamily,
        Archetype::Multifamily,
        Archetype::Business,
        Archetype::GroundLease,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::SingleFamily => "single_family",
            Archetype::Multifamily => "multifamily",
            Archetype::Business => "business",
            Archetype::GroundLease => "ground_lease",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Archetype {
    type Err = ModelError;

    /// 接受 `single_family`、`Single-Family`、`SingleFamily` 等寫法
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "singlefamily" | "sfr" => Ok(Archetype::SingleFamily),
            "multifamily" => Ok(Archetype::Multifamily),
            "business" => Ok(Archetype::Business),
            "groundlease" | "netlease" => Ok(Archetype::GroundLease),
            _ => Err(ModelError::UnsupportedArchetype {
                archetype: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw input records, as delivered by the listing collaborator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPropertyRecord {
    pub id: String,
    pub archetype: String,
    pub acquisition_price: Option<f64>,
    pub square_footage: Option<f64>,
    pub year_built: Option<i32>,
    /// Average rent per unit, single-family rent, or the fixed ground lease payment.
    pub monthly_rent: Option<f64>,
    pub unit_count: Option<u32>,
    pub occupancy_rate: Option<f64>,
    pub business_metrics: Option<RawBusinessMetrics>,
    pub expenses: Option<RawExpenses>,
    pub financing: Option<RawFinancingTerms>,
    pub shares: Option<RawShareParameters>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBusinessMetrics {
    pub monthly_gross_revenue: Option<f64>,
    pub operating_margin: Option<f64>,
}

/// Explicit expense lines; anything missing falls back to archetype defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawExpenses {
    pub management_fee_rate: Option<f64>,
    pub insurance_monthly: Option<f64>,
    pub property_tax_monthly: Option<f64>,
    pub maintenance_monthly: Option<f64>,
    pub maintenance_rate: Option<f64>,
    pub platform_fee_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFinancingTerms {
    pub loan_to_value: Option<f64>,
    pub interest_rate: Option<f64>,
    pub interest_only_years: Option<f64>,
    pub amortization_years: Option<f64>,
    pub loan_term_years: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawShareParameters {
    pub share_price: Option<f64>,
    pub min_investment: Option<f64>,
    pub max_investment: Option<f64>,
}

// ---------------------------------------------------------------------------
// Canonical entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Management,
    Insurance,
    PropertyTax,
    Maintenance,
    PlatformFee,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum ExpenseBasis {
    Fixed { monthly: f64 },
    PercentOfIncome { rate: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub category: ExpenseCategory,
    #[serde(flatten)]
    pub basis: ExpenseBasis,
}

impl ExpenseItem {
    pub fn fixed(category: ExpenseCategory, monthly: f64) -> Self {
        Self {
            category,
            basis: ExpenseBasis::Fixed { monthly },
        }
    }

    pub fn percent_of_income(category: ExpenseCategory, rate: f64) -> Self {
        Self {
            category,
            basis: ExpenseBasis::PercentOfIncome { rate },
        }
    }

    pub fn monthly_amount(&self, gross_monthly_income: f64) -> f64 {
        match self.basis {
            ExpenseBasis::Fixed { monthly } => monthly,
            ExpenseBasis::PercentOfIncome { rate } => gross_monthly_income * rate,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSchedule {
    pub items: Vec<ExpenseItem>,
}

impl ExpenseSchedule {
    pub fn new(items: Vec<ExpenseItem>) -> Self {
        Self { items }
    }
}

/// Archetype-specific revenue drivers. One variant per operating model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum OperatingProfile {
    Rental {
        unit_count: u32,
        avg_rent_per_unit: f64,
        occupancy_rate: f64,
    },
    Business {
        monthly_gross_revenue: f64,
        operating_margin: f64,
    },
    GroundLease {
        monthly_lease: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub archetype: Archetype,
    pub acquisition_price: f64,
    pub year_built: Option<i32>,
    pub square_footage: Option<f64>,
    pub profile: OperatingProfile,
    pub expenses: ExpenseSchedule,
}

impl Property {
    pub fn price_per_square_foot(&self) -> Option<f64> {
        self.square_footage
            .filter(|sqft| *sqft > 0.0)
            .map(|sqft| self.acquisition_price / sqft)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancingTerms {
    pub loan_to_value: f64,
    pub interest_rate: f64,
    pub interest_only_years: f64,
    pub amortization_years: f64,
    pub loan_term_years: f64,
}

impl FinancingTerms {
    pub fn debt_free() -> Self {
        Self {
            loan_to_value: 0.0,
            ..Self::default()
        }
    }
}

impl Default for FinancingTerms {
    fn default() -> Self {
        Self {
            loan_to_value: 0.70,
            interest_rate: 0.0675,
            interest_only_years: 3.0,
            amortization_years: 30.0,
            loan_term_years: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShareParameters {
    pub share_price: f64,
    pub min_investment: f64,
    /// `None` caps an investment at the raised equity.
    pub max_investment: Option<f64>,
}

impl Default for ShareParameters {
    fn default() -> Self {
        Self {
            share_price: 1_000.0,
            min_investment: 1_000.0,
            max_investment: None,
        }
    }
}

/// A normalized listing: the property plus the terms it is offered under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub property: Property,
    pub financing: FinancingTerms,
    pub shares: ShareParameters,
}

// ---------------------------------------------------------------------------
// Default assumptions
// ---------------------------------------------------------------------------

/// Operating assumptions used when a raw record leaves a field blank.
///
/// Insurance and property tax are quoted as annual fractions of the
/// acquisition price; management and maintenance as fractions of gross
/// monthly income. `unit_count` only applies to multifamily listings;
/// single-family homes are always one unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeDefaults {
    pub unit_count: u32,
    pub occupancy_rate: f64,
    pub operating_margin: f64,
    pub management_fee_rate: f64,
    pub insurance_rate: f64,
    pub property_tax_rate: f64,
    pub maintenance_rate: f64,
}

/// 多戶住宅未提供戶數時的預設值
pub const DEFAULT_MULTIFAMILY_UNITS: u32 = 24;

impl ArchetypeDefaults {
    pub fn for_archetype(archetype: Archetype) -> Self {
        match archetype {
            Archetype::SingleFamily => Self {
                unit_count: 1,
                occupancy_rate: 0.95,
                operating_margin: 1.0,
                management_fee_rate: 0.10,
                insurance_rate: 0.005,
                property_tax_rate: 0.012,
                maintenance_rate: 0.08,
            },
            Archetype::Multifamily => Self {
                unit_count: DEFAULT_MULTIFAMILY_UNITS,
                occupancy_rate: 0.93,
                operating_margin: 1.0,
                management_fee_rate: 0.08,
                insurance_rate: 0.004,
                property_tax_rate: 0.012,
                maintenance_rate: 0.05,
            },
            Archetype::Business => Self {
                unit_count: 1,
                occupancy_rate: 1.0,
                operating_margin: 0.25,
                management_fee_rate: 0.0,
                insurance_rate: 0.003,
                property_tax_rate: 0.010,
                maintenance_rate: 0.02,
            },
            // 淨租約：承租人負擔所有營運費用
            Archetype::GroundLease => Self {
                unit_count: 1,
                occupancy_rate: 1.0,
                operating_margin: 1.0,
                management_fee_rate: 0.0,
                insurance_rate: 0.0,
                property_tax_rate: 0.0,
                maintenance_rate: 0.0,
            },
        }
    }
}

/// Flat appreciation fraction per archetype, applied once over a holding period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct AppreciationPolicy {
    rates: BTreeMap<Archetype, f64>,
}

impl AppreciationPolicy {
    pub fn new(rates: BTreeMap<Archetype, f64>) -> Self {
        Self { rates }
    }

    pub fn with_rate(mut self, archetype: Archetype, rate: f64) -> Self {
        self.rates.insert(archetype, rate);
        self
    }

    /// Archetypes absent from the table appreciate by zero.
    pub fn rate_for(&self, archetype: Archetype) -> f64 {
        self.rates.get(&archetype).copied().unwrap_or(0.0)
    }

}

impl Default for AppreciationPolicy {
    fn default() -> Self {
        Self::new(BTreeMap::from([
            (Archetype::SingleFamily, 0.20),
            (Archetype::Multifamily, 0.25),
            (Archetype::Business, 0.15),
            (Archetype::GroundLease, 0.10),
        ]))
    }
}

impl TryFrom<BTreeMap<String, f64>> for AppreciationPolicy {
    type Error = ModelError;

    fn try_from(table: BTreeMap<String, f64>) -> Result<Self> {
        let mut rates = BTreeMap::new();
        for (key, rate) in table {
            let archetype: Archetype = key.parse()?;
            if !rate.is_finite() || rate <= -1.0 {
                return Err(ModelError::invalid_input(
                    &format!("appreciation.{}", key),
                    rate,
                    "Appreciation rate must be finite and greater than -1",
                ));
            }
            rates.insert(archetype, rate);
        }
        Ok(Self { rates })
    }
}

impl From<AppreciationPolicy> for BTreeMap<String, f64> {
    fn from(policy: AppreciationPolicy) -> Self {
        policy
            .rates
            .into_iter()
            .map(|(archetype, rate)| (archetype.as_str().to_string(), rate))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Phases & warnings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseTag {
    InterestOnly,
    Amortizing,
}

impl fmt::Display for PhaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseTag::InterestOnly => write!(f, "interest-only"),
            PhaseTag::Amortizing => write!(f, "amortizing"),
        }
    }
}

/// Result states the consumer must surface but that do not stop the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelWarning {
    NegativeCashFlowAfterDebt { phase: PhaseTag, annual_cash_flow: f64 },
}

impl fmt::Display for ModelWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelWarning::NegativeCashFlowAfterDebt {
                phase,
                annual_cash_flow,
            } => write!(
                f,
                "Cash flow after debt service is negative during the {} phase ({:.2} per year)",
                phase, annual_cash_flow
            ),
        }
    }
}
