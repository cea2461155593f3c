//! Presentation boundary: the only place figures are rounded.

use crate::core::engine::InvestmentReport;
use crate::core::projection::{InvestorPosition, ProjectionTable};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::io::Write;

pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round_percent(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn round_multiple(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One CSV row of the projection table, already rounded for display.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionCsvRow {
    pub property_id: String,
    pub holding_period_years: f64,
    pub total_distributions: f64,
    pub appreciation: f64,
    pub total_return: f64,
    pub equity_multiple: f64,
    pub annualized_return_percent: f64,
}

impl ProjectionCsvRow {
    fn rows(property_id: &str, table: &ProjectionTable) -> Vec<Self> {
        table
            .rows
            .iter()
            .map(|row| Self {
                property_id: property_id.to_string(),
                holding_period_years: row.holding_period_years,
                total_distributions: round_currency(row.total_distributions),
                appreciation: round_currency(row.appreciation),
                total_return: round_currency(row.total_return_per_share),
                equity_multiple: round_multiple(row.equity_multiple),
                annualized_return_percent: round_percent(row.annualized_return_percent),
            })
            .collect()
    }
}

pub fn write_projection_csv<W: Write>(reports: &[InvestmentReport], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut count = 0;
    for report in reports {
        for row in ProjectionCsvRow::rows(&report.listing.property.id, &report.projections) {
            csv_writer.serialize(row)?;
            count += 1;
        }
    }
    csv_writer.flush()?;
    tracing::debug!("Wrote {} projection rows as CSV", count);
    Ok(())
}

#[derive(Debug, Serialize)]
struct ReportEnvelope<'a> {
    generated_at: DateTime<Utc>,
    reports: &'a [InvestmentReport],
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<&'a InvestorPosition>,
}

/// Full-precision JSON export; consumers round for themselves.
pub fn to_json(
    reports: &[InvestmentReport],
    position: Option<&InvestorPosition>,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    let envelope = ReportEnvelope {
        generated_at,
        reports,
        position,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Text report for one property. Renders through `Display`, so callers can
/// write it straight to any formatter.
pub struct ReportView<'a>(pub &'a InvestmentReport);

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let property = &report.listing.property;
        let operating = &report.operating;
        let summary = &report.summary;

        writeln!(f, "🏢 {} ({})", property.id, property.archetype)?;
        writeln!(f, "  Acquisition price:   ${:.2}", round_currency(property.acquisition_price))?;
        if let Some(ppsf) = property.price_per_square_foot() {
            writeln!(f, "  Price per sq ft:     ${:.2}", round_currency(ppsf))?;
        }
        writeln!(
            f,
            "  Gross income:        ${:.2}/mo, ${:.2}/yr",
            round_currency(operating.gross_monthly_income),
            round_currency(operating.annual_gross_income())
        )?;
        writeln!(
            f,
            "  Expenses / mo:       ${:.2} ({:.1}% of income)",
            round_currency(operating.monthly_expenses),
            round_percent(operating.expense_ratio() * 100.0)
        )?;
        writeln!(f, "  Annual NOI:          ${:.2}", round_currency(operating.annual_noi))?;
        writeln!(f, "  Cap rate:            {:.1}%", round_percent(report.cap_rate_percent))?;
        writeln!(
            f,
            "  Loan / equity:       ${:.2} / ${:.2}",
            round_currency(report.financing.loan_amount),
            round_currency(report.financing.equity_amount)
        )?;

        for phase in report.cash_flows.iter() {
            let dscr = phase
                .debt_service_coverage
                .map(|d| format!("{:.2}x", d))
                .unwrap_or_else(|| "n/a".to_string());
            writeln!(
                f,
                "  {:<14} debt service ${:.2}, cash flow ${:.2}/yr, cash-on-cash {:.1}%, DSCR {}",
                phase.phase.to_string(),
                round_currency(phase.annual_debt_service),
                round_currency(phase.annual_cash_flow),
                round_percent(phase.cash_on_cash_return_percent),
                dscr
            )?;
        }

        writeln!(f)?;
        writeln!(f, "📋 Investment Summary:")?;
        writeln!(f, "  Total shares:        {}", summary.total_shares)?;
        writeln!(f, "  Share price:         ${:.2}", round_currency(report.economics.share_price))?;
        writeln!(f, "  Minimum investment:  ${:.2}", round_currency(summary.min_investment))?;
        writeln!(
            f,
            "  Distribution/share:  ${:.2}/mo ({:.1}% yield)",
            round_currency(summary.monthly_distribution_per_share),
            round_percent(summary.annual_yield_percent)
        )?;
        writeln!(
            f,
            "  During interest-only: ${:.2}/mo ({:.1}% yield)",
            round_currency(summary.interest_only_monthly_distribution_per_share),
            round_percent(summary.interest_only_yield_percent)
        )?;

        writeln!(f)?;
        write!(f, "{}", ProjectionTableView(&report.projections))?;

        for warning in &report.warnings {
            writeln!(f, "⚠️  {}", warning)?;
        }
        Ok(())
    }
}

pub struct ProjectionTableView<'a>(pub &'a ProjectionTable);

impl fmt::Display for ProjectionTableView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.0;
        writeln!(f, "📈 Projection per share (${:.2}):", round_currency(table.share_price))?;
        writeln!(
            f,
            "  {:>6} {:>14} {:>13} {:>13} {:>9} {:>11}",
            "Years", "Distributions", "Appreciation", "Total return", "Multiple", "Annualized"
        )?;
        for row in &table.rows {
            writeln!(
                f,
                "  {:>6} {:>14.2} {:>13.2} {:>13.2} {:>8.2}x {:>10.1}%",
                row.holding_period_years,
                round_currency(row.total_distributions),
                round_currency(row.appreciation),
                round_currency(row.total_return_per_share),
                round_multiple(row.equity_multiple),
                round_percent(row.annualized_return_percent)
            )?;
        }
        Ok(())
    }
}

pub struct PositionView<'a>(pub &'a InvestorPosition);

impl fmt::Display for PositionView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let position = self.0;
        writeln!(
            f,
            "👤 Position: {} shares (${:.2})",
            position.shares,
            round_currency(position.investment_amount)
        )?;
        writeln!(
            f,
            "  Monthly distribution: ${:.2} (interest-only ${:.2})",
            round_currency(position.amortizing_monthly_distribution),
            round_currency(position.interest_only_monthly_distribution)
        )?;
        for row in &position.rows {
            writeln!(
                f,
                "  {:>4} yrs: distributions ${:.2}, appreciation ${:.2}, total return ${:.2}, ending value ${:.2}",
                row.holding_period_years,
                round_currency(row.total_distributions),
                round_currency(row.appreciation),
                round_currency(row.total_return),
                round_currency(row.ending_value)
            )?;
        }
        Ok(())
    }
}

pub fn render_report(report: &InvestmentReport) -> String {
    ReportView(report).to_string()
}

pub fn render_position(position: &InvestorPosition) -> String {
    PositionView(position).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_rules() {
        assert_eq!(round_currency(112.786_819), 112.79);
        assert_eq!(round_currency(-3.456), -3.46);
        assert_eq!(round_percent(11.278_68), 11.3);
        assert_eq!(round_percent(6.04), 6.0);
        assert_eq!(round_multiple(1.534_9), 1.53);
    }

    #[test]
    fn test_projection_table_uses_multiple_rounding() {
        let table = ProjectionTable {
            archetype: crate::domain::model::Archetype::Multifamily,
            share_price: 1000.0,
            rows: vec![crate::core::projection::ProjectionResult {
                holding_period_years: 5.0,
                total_distributions: 563.934,
                appreciation: 250.0,
                terminal_value_per_share: 1250.0,
                total_return_per_share: 813.934,
                equity_multiple: 1.813_934,
                annualized_return_percent: 12.6,
            }],
        };

        let text = ProjectionTableView(&table).to_string();
        assert!(text.contains("1.81x"));
        assert!(text.contains("563.93"));

        let rows = ProjectionCsvRow::rows("p-1", &table);
        assert_eq!(rows[0].equity_multiple, 1.81);
    }
}
