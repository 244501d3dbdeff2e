//! Query engine for organization-scoped financial records.
//!
//! Records are directional cash entries (`IN`/`OUT`) labelled with tags. The
//! engine validates writes, lists records and tags page by page and computes
//! the rolling monthly cash-flow report. Persistence goes through the
//! [`RecordStore`] capability; [`SqlStore`] implements it with sea-orm.

pub use amount::Amount;
pub use error::EngineError;
pub use ops::{Engine, EngineBuilder};
pub use page::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, Page, PageRequest};
pub use records::{Direction, FinancialRecord, NewRecord, ValidRecord};
pub use report::{CashFlowReport, MonthlyCashFlow, REPORT_WINDOW_MONTHS, window_start};
pub use store::{RecordStore, SqlStore};
pub use tags::Tag;

mod amount;
mod error;
mod ops;
mod page;
mod record_tags;
mod records;
mod report;
mod store;
mod tags;

pub type ResultEngine<T> = Result<T, EngineError>;
