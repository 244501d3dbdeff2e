//! Monthly cash-flow aggregation.
//!
//! The grouping runs inside the database; this module only owns the window
//! arithmetic, the per-backend statement text and the row shape.

use chrono::{DateTime, Datelike, Days, Months, Utc};
use sea_orm::{DbBackend, DbErr, QueryResult};
use serde::{Deserialize, Serialize};

use crate::Amount;

/// Length of the rolling report window.
pub const REPORT_WINDOW_MONTHS: u32 = 24;

/// Totals of one `(year, month)` bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCashFlow {
    pub year: i32,
    /// 1 to 12.
    pub month: u32,
    pub cash_in: Amount,
    pub cash_out: Amount,
}

impl MonthlyCashFlow {
    pub(crate) fn from_row(row: &QueryResult) -> Result<Self, DbErr> {
        let year: i32 = row.try_get("", "year")?;
        let month: i32 = row.try_get("", "month")?;
        let cash_in: i64 = row.try_get("", "cash_in")?;
        let cash_out: i64 = row.try_get("", "cash_out")?;
        let month = u32::try_from(month)
            .map_err(|_| DbErr::Custom(format!("invalid month bucket: {month}")))?;

        Ok(Self {
            year,
            month,
            cash_in: Amount::new(cash_in),
            cash_out: Amount::new(cash_out),
        })
    }
}

/// Buckets sorted by `(year, month)`; months without records are absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowReport {
    pub monthly_data: Vec<MonthlyCashFlow>,
}

/// First instant included in a report anchored at `now`.
///
/// The same day and time 24 months earlier. A leap day with no counterpart
/// rolls over to March 1st.
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(start) = now.checked_sub_months(Months::new(REPORT_WINDOW_MONTHS)) else {
        return DateTime::<Utc>::MIN_UTC;
    };
    if start.day() == now.day() {
        return start;
    }
    start.checked_add_days(Days::new(1)).unwrap_or(start)
}

const SQLITE_MONTHLY_CASH_FLOW: &str = "\
SELECT CAST(strftime('%Y', due_date) AS INTEGER) AS year, \
       CAST(strftime('%m', due_date) AS INTEGER) AS month, \
       CAST(COALESCE(SUM(CASE WHEN direction = 'IN' THEN amount_minor ELSE 0 END), 0) AS BIGINT) AS cash_in, \
       CAST(COALESCE(SUM(CASE WHEN direction = 'OUT' THEN amount_minor ELSE 0 END), 0) AS BIGINT) AS cash_out \
FROM financial_records \
WHERE organization_id = ? AND due_date >= ? \
GROUP BY 1, 2 \
ORDER BY 1, 2";

const POSTGRES_MONTHLY_CASH_FLOW: &str = "\
SELECT CAST(EXTRACT(YEAR FROM due_date) AS INTEGER) AS year, \
       CAST(EXTRACT(MONTH FROM due_date) AS INTEGER) AS month, \
       CAST(COALESCE(SUM(CASE WHEN direction = 'IN' THEN amount_minor ELSE 0 END), 0) AS BIGINT) AS cash_in, \
       CAST(COALESCE(SUM(CASE WHEN direction = 'OUT' THEN amount_minor ELSE 0 END), 0) AS BIGINT) AS cash_out \
FROM financial_records \
WHERE organization_id = $1 AND due_date >= $2 \
GROUP BY 1, 2 \
ORDER BY 1, 2";

/// Aggregation statement for `backend`, taking `(organization_id, since)`.
pub(crate) fn monthly_cash_flow_sql(backend: DbBackend) -> Result<&'static str, DbErr> {
    match backend {
        DbBackend::Sqlite => Ok(SQLITE_MONTHLY_CASH_FLOW),
        DbBackend::Postgres => Ok(POSTGRES_MONTHLY_CASH_FLOW),
        other => Err(DbErr::Custom(format!(
            "cash-flow aggregation is not supported on {other:?}"
        ))),
    }
}
