use crate::domain::model::{
    AppreciationPolicy, Archetype, ArchetypeDefaults, ExpenseSchedule, FinancingTerms,
    ShareParameters,
};

/// Revenue side of one property archetype.
///
/// Implementors only describe how gross income is produced; expenses and NOI
/// share one calculation in the provided method so every archetype nets
/// income the same way.
pub trait OperatingModel {
    fn gross_monthly_income(&self) -> f64;

    fn monthly_expenses(&self, schedule: &ExpenseSchedule) -> f64 {
        let gross = self.gross_monthly_income();
        schedule
            .items
            .iter()
            .map(|item| item.monthly_amount(gross))
            .sum()
    }
}

/// Source of the documented default assumptions.
pub trait AssumptionsProvider {
    fn archetype_defaults(&self, archetype: Archetype) -> ArchetypeDefaults;
    fn platform_fee_rate(&self) -> f64;
    fn default_financing(&self) -> FinancingTerms;
    fn default_share_parameters(&self) -> ShareParameters;
    fn appreciation_policy(&self) -> &AppreciationPolicy;
    fn holding_periods(&self) -> &[f64];
}
