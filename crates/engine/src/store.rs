//! Storage capability used by the [`Engine`](crate::Engine).
//!
//! All operations are async and scoped by organization. Implementations own
//! persisted state; callers hold none between calls.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseConnection, DatabaseTransaction, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Statement, TransactionTrait,
    prelude::*,
    sea_query::Query,
};

use crate::{
    EngineError, FinancialRecord, ResultEngine, Tag, ValidRecord,
    page::{Page, PageRequest},
    record_tags, records,
    report::{self, MonthlyCashFlow},
    tags,
};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub trait RecordStore: Send + Sync {
    fn insert_tag(
        &self,
        organization_id: i64,
        name: &str,
    ) -> impl Future<Output = ResultEngine<Tag>> + Send;

    /// Tags of one organization, ascending by id.
    fn list_tags(
        &self,
        organization_id: i64,
        page: PageRequest,
    ) -> impl Future<Output = ResultEngine<Page<Tag>>> + Send;

    /// Inserts the whole batch atomically.
    ///
    /// Every referenced tag must exist within `organization_id`, otherwise
    /// [`EngineError::UnknownTag`] is returned and nothing is written.
    fn insert_records(
        &self,
        organization_id: i64,
        batch: Vec<ValidRecord>,
    ) -> impl Future<Output = ResultEngine<Vec<FinancialRecord>>> + Send;

    /// Records of one organization, ascending by id, each with its full tag
    /// set.
    ///
    /// A non-empty `tag_ids` keeps records carrying at least one of the tags;
    /// a record matching several of them is still returned once.
    fn list_records(
        &self,
        organization_id: i64,
        tag_ids: &BTreeSet<i32>,
        page: PageRequest,
    ) -> impl Future<Output = ResultEngine<Page<FinancialRecord>>> + Send;

    /// Sums amounts per `(year, month)` of `due_date` for records due at or
    /// after `since`, ascending by bucket.
    fn aggregate_monthly_cash_flow(
        &self,
        organization_id: i64,
        since: DateTime<Utc>,
    ) -> impl Future<Output = ResultEngine<Vec<MonthlyCashFlow>>> + Send;
}

/// [`RecordStore`] over a pooled sea-orm connection.
#[derive(Clone, Debug, Default)]
pub struct SqlStore {
    database: DatabaseConnection,
}

impl SqlStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    async fn tags_by_record(
        db_tx: &DatabaseTransaction,
        record_ids: Vec<i32>,
    ) -> ResultEngine<BTreeMap<i32, Vec<Tag>>> {
        let mut by_record: BTreeMap<i32, Vec<Tag>> = BTreeMap::new();
        if record_ids.is_empty() {
            return Ok(by_record);
        }

        let rows: Vec<(record_tags::Model, Option<tags::Model>)> = record_tags::Entity::find()
            .filter(record_tags::Column::FinancialRecordId.is_in(record_ids))
            .find_also_related(tags::Entity)
            .all(db_tx)
            .await?;
        for (link, tag) in rows {
            let Some(tag) = tag else {
                continue;
            };
            by_record
                .entry(link.financial_record_id)
                .or_default()
                .push(Tag::from(tag));
        }
        Ok(by_record)
    }
}

impl RecordStore for SqlStore {
    async fn insert_tag(&self, organization_id: i64, name: &str) -> ResultEngine<Tag> {
        let now = Utc::now();
        let model = tags::ActiveModel {
            id: ActiveValue::NotSet,
            organization_id: ActiveValue::Set(organization_id),
            name: ActiveValue::Set(name.to_string()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&self.database)
        .await?;
        Ok(Tag::from(model))
    }

    async fn list_tags(&self, organization_id: i64, page: PageRequest) -> ResultEngine<Page<Tag>> {
        with_tx!(self, |db_tx| {
            let query = tags::Entity::find().filter(tags::Column::OrganizationId.eq(organization_id));
            let total = query.clone().count(&db_tx).await?;
            let items = query
                .order_by_asc(tags::Column::Id)
                .offset(page.offset())
                .limit(page.limit())
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Tag::from)
                .collect();

            Ok::<_, EngineError>(Page {
                items,
                total,
                request: page,
            })
        })
    }

    async fn insert_records(
        &self,
        organization_id: i64,
        batch: Vec<ValidRecord>,
    ) -> ResultEngine<Vec<FinancialRecord>> {
        with_tx!(self, |db_tx| {
            let referenced: BTreeSet<i32> = batch
                .iter()
                .flat_map(|record| record.tag_ids.iter().copied())
                .collect();
            let known: BTreeMap<i32, Tag> = if referenced.is_empty() {
                BTreeMap::new()
            } else {
                tags::Entity::find()
                    .filter(tags::Column::OrganizationId.eq(organization_id))
                    .filter(tags::Column::Id.is_in(referenced.iter().copied()))
                    .all(&db_tx)
                    .await?
                    .into_iter()
                    .map(|model| (model.id, Tag::from(model)))
                    .collect()
            };

            let mut created = Vec::with_capacity(batch.len());
            for (index, record) in batch.iter().enumerate() {
                let attached: Vec<Tag> = record
                    .tag_ids
                    .iter()
                    .map(|id| {
                        known.get(id).cloned().ok_or_else(|| {
                            EngineError::UnknownTag(format!(
                                "tag {id} does not exist in organization {organization_id}"
                            ))
                            .with_context(&format!("record {index}"))
                        })
                    })
                    .collect::<ResultEngine<_>>()?;

                let model = records::ActiveModel::new_record(organization_id, record, Utc::now())
                    .insert(&db_tx)
                    .await?;

                if !record.tag_ids.is_empty() {
                    let links = record.tag_ids.iter().map(|tag_id| record_tags::ActiveModel {
                        financial_record_id: ActiveValue::Set(model.id),
                        tag_id: ActiveValue::Set(*tag_id),
                    });
                    record_tags::Entity::insert_many(links)
                        .exec_without_returning(&db_tx)
                        .await?;
                }

                created.push(FinancialRecord::from_model(model, attached)?);
            }

            Ok::<_, EngineError>(created)
        })
    }

    async fn list_records(
        &self,
        organization_id: i64,
        tag_ids: &BTreeSet<i32>,
        page: PageRequest,
    ) -> ResultEngine<Page<FinancialRecord>> {
        with_tx!(self, |db_tx| {
            let mut query = records::Entity::find()
                .filter(records::Column::OrganizationId.eq(organization_id));
            if !tag_ids.is_empty() {
                // Semi-join: a record matching several tags still yields one row.
                query = query.filter(
                    records::Column::Id.in_subquery(
                        Query::select()
                            .column(record_tags::Column::FinancialRecordId)
                            .from(record_tags::Entity)
                            .and_where(record_tags::Column::TagId.is_in(tag_ids.iter().copied()))
                            .to_owned(),
                    ),
                );
            }

            let total = query.clone().count(&db_tx).await?;
            let models = query
                .order_by_asc(records::Column::Id)
                .offset(page.offset())
                .limit(page.limit())
                .all(&db_tx)
                .await?;

            let mut tags_by_record =
                Self::tags_by_record(&db_tx, models.iter().map(|model| model.id).collect())
                    .await?;
            let items = models
                .into_iter()
                .map(|model| {
                    let tags = tags_by_record.remove(&model.id).unwrap_or_default();
                    FinancialRecord::from_model(model, tags)
                })
                .collect::<ResultEngine<Vec<_>>>()?;

            Ok::<_, EngineError>(Page {
                items,
                total,
                request: page,
            })
        })
    }

    async fn aggregate_monthly_cash_flow(
        &self,
        organization_id: i64,
        since: DateTime<Utc>,
    ) -> ResultEngine<Vec<MonthlyCashFlow>> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            report::monthly_cash_flow_sql(backend)?,
            vec![organization_id.into(), since.into()],
        );
        let rows = self.database.query_all(stmt).await?;
        rows.iter()
            .map(|row| MonthlyCashFlow::from_row(row).map_err(EngineError::from))
            .collect()
    }
}
