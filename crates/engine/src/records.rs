//! Financial record primitives.
//!
//! A `FinancialRecord` is a directional cash entry of one organization. Records
//! are immutable once written.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Amount, EngineError, ResultEngine, Tag};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }
}

impl TryFrom<&str> for Direction {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            other => Err(EngineError::InvalidDirection(format!(
                "direction must be either 'IN' or 'OUT', got {other:?}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub id: i32,
    pub organization_id: i64,
    pub direction: Direction,
    pub amount: Amount,
    pub due_date: DateTime<Utc>,
    /// Sorted by tag id.
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated record payload, as received from a caller.
#[derive(Clone, Debug, PartialEq)]
pub struct NewRecord {
    pub direction: String,
    pub amount: f64,
    pub due_date: DateTime<Utc>,
    pub tag_ids: Vec<i32>,
}

impl NewRecord {
    /// Checks the direction first, then the amount.
    pub fn validate(self) -> ResultEngine<ValidRecord> {
        let direction = Direction::try_from(self.direction.as_str())?;
        if self.amount < 0.0 {
            return Err(EngineError::InvalidAmount(
                "amount must be greater than or equal to zero".to_string(),
            ));
        }
        let amount = Amount::from_f64(self.amount)?;

        Ok(ValidRecord {
            direction,
            amount,
            due_date: self.due_date,
            tag_ids: self.tag_ids.into_iter().collect(),
        })
    }
}

/// A record payload that passed validation and may be handed to a
/// [`RecordStore`](crate::RecordStore).
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct ValidRecord {
    pub direction: Direction,
    pub amount: Amount,
    pub due_date: DateTime<Utc>,
    pub tag_ids: BTreeSet<i32>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "financial_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub organization_id: i64,
    pub direction: String,
    pub amount_minor: i64,
    pub due_date: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::record_tags::Entity")]
    RecordTags,
}

impl Related<super::record_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecordTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn new_record(
        organization_id: i64,
        record: &ValidRecord,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActiveValue::NotSet,
            organization_id: ActiveValue::Set(organization_id),
            direction: ActiveValue::Set(record.direction.as_str().to_string()),
            amount_minor: ActiveValue::Set(record.amount.cents()),
            due_date: ActiveValue::Set(record.due_date),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }
}

impl FinancialRecord {
    /// Builds a record from its row and its (already loaded) tags.
    pub(crate) fn from_model(model: Model, mut tags: Vec<Tag>) -> ResultEngine<Self> {
        tags.sort_by_key(|tag| tag.id);
        Ok(Self {
            id: model.id,
            organization_id: model.organization_id,
            direction: Direction::try_from(model.direction.as_str())?,
            amount: Amount::new(model.amount_minor),
            due_date: model.due_date,
            tags,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
