use std::collections::BTreeSet;

use sea_orm::DbErr;

use crate::{
    EngineError, FinancialRecord, NewRecord, RecordStore, ResultEngine,
    page::{Page, PageRequest},
};

use super::{Engine, require_organization};

impl<S: RecordStore> Engine<S> {
    /// Validates and stores a single record.
    pub async fn create_record(
        &self,
        organization_id: i64,
        record: NewRecord,
    ) -> ResultEngine<FinancialRecord> {
        let organization_id = require_organization(organization_id)?;
        let record = record.validate()?;

        let mut created = self
            .store
            .insert_records(organization_id, vec![record])
            .await?;
        let record = created.pop().ok_or(DbErr::RecordNotInserted)?;
        tracing::debug!(organization_id, record_id = record.id, "record created");
        Ok(record)
    }

    /// Validates every record, then stores the batch atomically.
    ///
    /// The first invalid record aborts the batch before anything is written;
    /// its error message is prefixed with the record's zero-based index.
    pub async fn create_records_bulk(
        &self,
        organization_id: i64,
        records: Vec<NewRecord>,
    ) -> ResultEngine<Vec<FinancialRecord>> {
        let organization_id = require_organization(organization_id)?;
        if records.is_empty() {
            return Err(EngineError::InvalidInput(
                "batch must contain at least one record".to_string(),
            ));
        }

        let batch = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                record
                    .validate()
                    .map_err(|err| err.with_context(&format!("record {index}")))
            })
            .collect::<ResultEngine<Vec<_>>>()?;

        let created = self.store.insert_records(organization_id, batch).await?;
        tracing::info!(organization_id, count = created.len(), "record batch committed");
        Ok(created)
    }

    /// Lists records, optionally keeping only those carrying any of `tag_ids`.
    ///
    /// `total` in the returned page counts the whole filtered set.
    pub async fn list_records(
        &self,
        organization_id: i64,
        tag_ids: &[i32],
        page: PageRequest,
    ) -> ResultEngine<Page<FinancialRecord>> {
        let organization_id = require_organization(organization_id)?;
        let tag_ids: BTreeSet<i32> = tag_ids.iter().copied().collect();
        self.store
            .list_records(organization_id, &tag_ids, page)
            .await
    }
}
