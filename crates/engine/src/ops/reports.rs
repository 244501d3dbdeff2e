use chrono::{DateTime, Utc};

use crate::{
    RecordStore, ResultEngine,
    report::{CashFlowReport, window_start},
};

use super::{Engine, require_organization};

impl<S: RecordStore> Engine<S> {
    /// Monthly totals over the two years preceding the call.
    pub async fn cash_flow_report(&self, organization_id: i64) -> ResultEngine<CashFlowReport> {
        self.cash_flow_report_at(organization_id, Utc::now()).await
    }

    /// Monthly totals for records due at or after `now` minus two years.
    pub async fn cash_flow_report_at(
        &self,
        organization_id: i64,
        now: DateTime<Utc>,
    ) -> ResultEngine<CashFlowReport> {
        let organization_id = require_organization(organization_id)?;
        let since = window_start(now);

        let monthly_data = self
            .store
            .aggregate_monthly_cash_flow(organization_id, since)
            .await?;
        tracing::debug!(
            organization_id,
            %since,
            buckets = monthly_data.len(),
            "cash-flow report computed"
        );
        Ok(CashFlowReport { monthly_data })
    }
}
