//! Gross income, operating expenses and NOI per archetype.
//!
//! Debt service never appears here; financing is layered on top of the
//! statement this module produces.

use crate::domain::model::{ExpenseCategory, OperatingProfile, Property};
use crate::domain::ports::OperatingModel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpenseLine {
    pub category: ExpenseCategory,
    pub monthly: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingStatement {
    pub gross_monthly_income: f64,
    pub monthly_expenses: f64,
    pub expense_lines: Vec<ExpenseLine>,
    pub monthly_noi: f64,
    pub annual_noi: f64,
}

impl OperatingStatement {
    pub fn annual_gross_income(&self) -> f64 {
        self.gross_monthly_income * 12.0
    }

    /// Operating expenses as a fraction of gross income; zero when there is no income.
    pub fn expense_ratio(&self) -> f64 {
        if self.gross_monthly_income > 0.0 {
            self.monthly_expenses / self.gross_monthly_income
        } else {
            0.0
        }
    }
}

impl OperatingModel for OperatingProfile {
    fn gross_monthly_income(&self) -> f64 {
        match *self {
            OperatingProfile::Rental {
                unit_count,
                avg_rent_per_unit,
                occupancy_rate,
            } => avg_rent_per_unit * f64::from(unit_count) * occupancy_rate,
            OperatingProfile::Business {
                monthly_gross_revenue,
                operating_margin,
            } => monthly_gross_revenue * operating_margin,
            OperatingProfile::GroundLease { monthly_lease } => monthly_lease,
        }
    }
}

pub fn compute_noi(property: &Property) -> OperatingStatement {
    let gross_monthly_income = property.profile.gross_monthly_income();

    let expense_lines: Vec<ExpenseLine> = property
        .expenses
        .items
        .iter()
        .map(|item| ExpenseLine {
            category: item.category,
            monthly: item.monthly_amount(gross_monthly_income),
        })
        .collect();
    let monthly_expenses = property.profile.monthly_expenses(&property.expenses);
    let monthly_noi = gross_monthly_income - monthly_expenses;

    OperatingStatement {
        gross_monthly_income,
        monthly_expenses,
        expense_lines,
        monthly_noi,
        annual_noi: monthly_noi * 12.0,
    }
}
