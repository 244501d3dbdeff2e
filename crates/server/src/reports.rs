//! Cash-flow report endpoint

use api_types::report::{CashFlowReport, MonthlyCashFlow};
use axum::{Json, extract::State};

use crate::{ServerError, extract::OrganizationId, server::ServerState};

pub async fn cash_flow(
    OrganizationId(organization_id): OrganizationId,
    State(state): State<ServerState>,
) -> Result<Json<CashFlowReport>, ServerError> {
    let report = state.engine.cash_flow_report(organization_id).await?;

    Ok(Json(CashFlowReport {
        monthly_data: report
            .monthly_data
            .into_iter()
            .map(|bucket| MonthlyCashFlow {
                year: bucket.year,
                month: bucket.month,
                cash_in: bucket.cash_in.as_f64(),
                cash_out: bucket.cash_out.as_f64(),
            })
            .collect(),
    }))
}
