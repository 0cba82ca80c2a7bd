use std::io::Write;

use serde::Serialize;

use crate::{
    currency::Amount,
    errors::{PlanError, Result},
    plan::Period,
};

/// One exported line: a transaction plus the total debt left after its period.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    period_date: String,
    label: &'a str,
    kind: &'static str,
    amount: Amount,
    total_debt_after_period: Amount,
}

/// Writes one CSV row per transaction, with a header line. Dates are ISO `YYYY-MM-DD`.
pub fn write_csv<W: Write>(periods: &[Period], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    let mut rows = 0usize;
    for period in periods {
        let total_debt = period.total_debt();
        let period_date = period
            .date
            .to_naive_date()
            .map_or_else(|| period.date.to_string(), |date| date.to_string());
        for txn in &period.transactions {
            csv.serialize(ExportRow {
                period_date: period_date.clone(),
                label: &txn.label,
                kind: txn.kind.as_str(),
                amount: txn.amount,
                total_debt_after_period: total_debt,
            })?;
            rows += 1;
        }
    }
    if rows == 0 {
        csv.write_record([
            "period_date",
            "label",
            "kind",
            "amount",
            "total_debt_after_period",
        ])?;
    }
    csv.flush()
        .map_err(|err| PlanError::Export(err.to_string()))?;
    tracing::debug!(rows, "exported projection to csv");
    Ok(())
}

pub fn to_csv_string(periods: &[Period]) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(periods, &mut buffer)?;
    String::from_utf8(buffer).map_err(|err| PlanError::Export(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_projection_still_has_a_header() {
        let csv = to_csv_string(&[]).expect("export");
        assert_eq!(csv, "period_date,label,kind,amount,total_debt_after_period\n");
    }

    #[test]
    fn dates_carry_the_year_across_long_projections() {
        use crate::{
            calendar::{PayDay, PeriodMarker},
            plan::FinancialConfiguration,
            simulation::simulate,
        };
        use std::collections::HashSet;

        let start = PeriodMarker::new(PayDay::Fifth, 0, 2026).expect("marker");
        let periods = simulate(&FinancialConfiguration::with_income(1_000_000), start, 26)
            .expect("simulate");
        let csv = to_csv_string(&periods).expect("export");
        let dates: Vec<&str> = csv
            .lines()
            .skip(1)
            .filter_map(|line| line.split(',').next())
            .collect();
        assert_eq!(dates.first().copied(), Some("2026-01-05"));
        assert_eq!(dates.last().copied(), Some("2027-01-20"));
        let distinct: HashSet<&str> = dates.iter().copied().collect();
        assert_eq!(distinct.len(), 26);
    }
}
