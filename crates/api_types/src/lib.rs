use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
}

pub mod tag {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagNew {
        pub name: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TagView {
        pub id: i32,
        pub organization_id: i64,
        pub name: String,
        pub created_at: DateTime<FixedOffset>,
        pub updated_at: DateTime<FixedOffset>,
    }
}

pub mod record {
    use super::*;

    /// Reference to an existing tag of the same organization.
    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    pub struct TagRef {
        pub id: i32,
    }

    /// Request body for creating a record.
    ///
    /// `direction` stays a plain string so that an unknown value reaches the
    /// engine and is reported as a validation error.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordNew {
        pub direction: String,
        /// Major units, rounded to the nearest cent. Must be >= 0.
        pub amount: f64,
        /// RFC3339 timestamp, including timezone offset.
        pub due_date: DateTime<FixedOffset>,
        pub tags: Option<Vec<TagRef>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordView {
        pub id: i32,
        pub organization_id: i64,
        pub direction: Direction,
        pub amount: f64,
        pub due_date: DateTime<FixedOffset>,
        pub tags: Vec<super::tag::TagView>,
        pub created_at: DateTime<FixedOffset>,
        pub updated_at: DateTime<FixedOffset>,
    }
}

pub mod pagination {
    use super::*;

    /// Query string of every listing endpoint.
    ///
    /// Values are kept raw: `page`/`page_size` that do not parse as integers
    /// are treated as absent, `tags` is a comma-separated list of tag ids.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ListQuery {
        pub page: Option<String>,
        pub page_size: Option<String>,
        pub tags: Option<String>,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Pagination {
        pub current_page: u64,
        pub page_size: u64,
        pub total_items: u64,
        pub total_pages: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ListResponse<T> {
        pub data: Vec<T>,
        pub pagination: Pagination,
    }
}

pub mod report {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct MonthlyCashFlow {
        pub year: i32,
        /// 1 to 12.
        pub month: u32,
        #[serde(rename = "in")]
        pub cash_in: f64,
        #[serde(rename = "out")]
        pub cash_out: f64,
    }

    /// Months without records are absent.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CashFlowReport {
        pub monthly_data: Vec<MonthlyCashFlow>,
    }
}
