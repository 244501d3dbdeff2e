use std::{
    collections::BTreeSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Amount, CashFlowReport, Direction, Engine, EngineError, FinancialRecord, MonthlyCashFlow,
    NewRecord, Page, PageRequest, RecordStore, ResultEngine, Tag, ValidRecord, window_start,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_file_db() -> (Engine, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();

    (engine, path)
}

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

fn new_record(direction: &str, amount: f64, due_date: DateTime<Utc>, tag_ids: &[i32]) -> NewRecord {
    NewRecord {
        direction: direction.to_string(),
        amount,
        due_date,
        tag_ids: tag_ids.to_vec(),
    }
}

async fn total_records(engine: &Engine, organization_id: i64) -> u64 {
    engine
        .list_records(organization_id, &[], PageRequest::default())
        .await
        .unwrap()
        .total
}

#[tokio::test]
async fn create_record_stores_amount_in_cents() {
    let (engine, _db) = engine_with_db().await;
    let tag = engine.create_tag(1, "salary").await.unwrap();

    let record = engine
        .create_record(1, new_record("IN", 10.25, at(2026, 1, 5), &[tag.id]))
        .await
        .unwrap();

    assert_eq!(record.organization_id, 1);
    assert_eq!(record.direction, Direction::In);
    assert_eq!(record.amount, Amount::new(1025));
    assert_eq!(record.due_date, at(2026, 1, 5));
    assert_eq!(record.tags, vec![tag]);

    let page = engine
        .list_records(1, &[], PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.items, vec![record]);
}

#[tokio::test]
async fn invalid_records_are_rejected_and_nothing_is_stored() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_record(1, new_record("in", 10.0, at(2026, 1, 5), &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidDirection(_)));

    let err = engine
        .create_record(1, new_record("OUT", -0.01, at(2026, 1, 5), &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_records_bulk(1, vec![new_record("SIDEWAYS", 1.0, at(2026, 1, 5), &[])])
        .await
        .unwrap_err();
    assert!(err.is_invalid_input());

    assert_eq!(total_records(&engine, 1).await, 0);
}

#[tokio::test]
async fn zero_amount_is_accepted() {
    let (engine, _db) = engine_with_db().await;
    let record = engine
        .create_record(1, new_record("OUT", 0.0, at(2026, 1, 5), &[]))
        .await
        .unwrap();
    assert_eq!(record.amount, Amount::ZERO);
}

#[tokio::test]
async fn extra_decimals_are_rounded_to_cents() {
    let (engine, _db) = engine_with_db().await;

    let rounded = engine
        .create_record(1, new_record("IN", 12.345, at(2026, 1, 5), &[]))
        .await
        .unwrap();
    assert_eq!(rounded.amount, Amount::new(1235));

    let artifact = engine
        .create_records_bulk(
            1,
            vec![
                new_record("OUT", 0.1 + 0.2, at(2026, 1, 6), &[]),
                new_record("OUT", 0.30000000000000004, at(2026, 1, 7), &[]),
            ],
        )
        .await
        .unwrap();
    assert_eq!(artifact[0].amount, Amount::new(30));
    assert_eq!(artifact[1].amount, Amount::new(30));
    assert_eq!(total_records(&engine, 1).await, 3);
}

#[tokio::test]
async fn organization_id_must_be_positive() {
    let (engine, _db) = engine_with_db().await;
    let err = engine.create_tag(0, "rent").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .list_records(-1, &[], PageRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn bulk_create_is_atomic_on_validation_failure() {
    let (engine, _db) = engine_with_db().await;
    let batch = vec![
        new_record("IN", 1.0, at(2026, 1, 1), &[]),
        new_record("OUT", 2.0, at(2026, 1, 2), &[]),
        new_record("OUT", -3.0, at(2026, 1, 3), &[]),
        new_record("IN", 4.0, at(2026, 1, 4), &[]),
    ];

    let err = engine.create_records_bulk(1, batch).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidAmount(
            "record 2: amount must be greater than or equal to zero".to_string()
        )
    );
    assert_eq!(total_records(&engine, 1).await, 0);
}

#[tokio::test]
async fn bulk_create_rolls_back_on_unknown_tag() {
    let (engine, _db) = engine_with_db().await;
    let own = engine.create_tag(1, "own").await.unwrap();
    let foreign = engine.create_tag(2, "foreign").await.unwrap();

    let batch = vec![
        new_record("IN", 1.0, at(2026, 1, 1), &[own.id]),
        new_record("OUT", 2.0, at(2026, 1, 2), &[foreign.id]),
    ];
    let err = engine.create_records_bulk(1, batch).await.unwrap_err();
    assert!(matches!(err, EngineError::UnknownTag(ref msg) if msg.starts_with("record 1")));
    assert_eq!(total_records(&engine, 1).await, 0);

    let err = engine
        .create_record(1, new_record("IN", 1.0, at(2026, 1, 1), &[9999]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownTag(_)));
    assert_eq!(total_records(&engine, 1).await, 0);
}

#[tokio::test]
async fn bulk_create_rejects_empty_batch() {
    let (engine, _db) = engine_with_db().await;
    let err = engine.create_records_bulk(1, Vec::new()).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn bulk_create_returns_records_in_input_order() {
    let (engine, _db) = engine_with_db().await;
    let tag = engine.create_tag(1, "rent").await.unwrap();
    let created = engine
        .create_records_bulk(
            1,
            vec![
                new_record("OUT", 900.0, at(2026, 2, 1), &[tag.id, tag.id]),
                new_record("IN", 50.5, at(2026, 1, 1), &[]),
            ],
        )
        .await
        .unwrap();

    assert_eq!(created.len(), 2);
    assert!(created[0].id < created[1].id);
    assert_eq!(created[0].amount, Amount::new(90_000));
    assert_eq!(created[0].tags, vec![tag]);
    assert!(created[1].tags.is_empty());
}

#[tokio::test]
async fn list_records_paginates() {
    let (engine, _db) = engine_with_db().await;
    let batch = (0..25)
        .map(|day| new_record("IN", 1.0, at(2026, 1, 1) + Duration::days(day), &[]))
        .collect();
    engine.create_records_bulk(1, batch).await.unwrap();

    let first = engine
        .list_records(1, &[], PageRequest::new(Some(1), Some(10)))
        .await
        .unwrap();
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.total, 25);
    assert_eq!(first.total_pages(), 3);

    let last = engine
        .list_records(1, &[], PageRequest::new(Some(3), Some(10)))
        .await
        .unwrap();
    assert_eq!(last.items.len(), 5);

    let ids: Vec<i32> = first.items.iter().map(|record| record.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);

    let beyond = engine
        .list_records(1, &[], PageRequest::new(Some(4), Some(10)))
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 25);
}

#[tokio::test]
async fn list_records_defaults_and_clamps_pagination() {
    let (engine, _db) = engine_with_db().await;
    let batch = (0..22)
        .map(|day| new_record("OUT", 1.0, at(2026, 1, 1) + Duration::days(day), &[]))
        .collect();
    engine.create_records_bulk(1, batch).await.unwrap();

    for request in [
        PageRequest::new(None, None),
        PageRequest::new(Some(0), Some(0)),
        PageRequest::new(Some(-2), Some(-5)),
    ] {
        let page = engine.list_records(1, &[], request).await.unwrap();
        assert_eq!(page.request.page(), 1);
        assert_eq!(page.request.page_size(), 20);
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.total_pages(), 2);
    }
}

#[tokio::test]
async fn tag_filter_matches_any_tag_without_duplicates() {
    let (engine, _db) = engine_with_db().await;
    let a = engine.create_tag(1, "a").await.unwrap();
    let b = engine.create_tag(1, "b").await.unwrap();
    let c = engine.create_tag(1, "c").await.unwrap();

    let created = engine
        .create_records_bulk(
            1,
            vec![
                new_record("IN", 1.0, at(2026, 1, 1), &[a.id, b.id]),
                new_record("OUT", 2.0, at(2026, 1, 2), &[c.id]),
                new_record("OUT", 3.0, at(2026, 1, 3), &[]),
            ],
        )
        .await
        .unwrap();

    let only_a = engine
        .list_records(1, &[a.id], PageRequest::default())
        .await
        .unwrap();
    assert_eq!(only_a.total, 1);
    assert_eq!(only_a.items[0].id, created[0].id);
    // The full tag set is returned, not only the matching tag.
    assert_eq!(only_a.items[0].tags, vec![a.clone(), b.clone()]);

    let a_or_b = engine
        .list_records(1, &[a.id, b.id], PageRequest::default())
        .await
        .unwrap();
    assert_eq!(a_or_b.total, 1);
    assert_eq!(a_or_b.items.len(), 1);

    let a_or_c = engine
        .list_records(1, &[a.id, c.id], PageRequest::default())
        .await
        .unwrap();
    assert_eq!(
        a_or_c.items.iter().map(|record| record.id).collect::<Vec<_>>(),
        vec![created[0].id, created[1].id]
    );

    let unknown = engine
        .list_records(1, &[4242], PageRequest::default())
        .await
        .unwrap();
    assert_eq!(unknown.total, 0);
}

#[tokio::test]
async fn organizations_are_isolated() {
    let (engine, _db) = engine_with_db().await;
    engine.create_tag(1, "one").await.unwrap();
    engine.create_tag(2, "two").await.unwrap();
    engine
        .create_record(2, new_record("IN", 5.0, at(2026, 1, 1), &[]))
        .await
        .unwrap();

    let tags = engine.list_tags(1, PageRequest::default()).await.unwrap();
    assert_eq!(
        tags.items.iter().map(|tag| tag.name.as_str()).collect::<Vec<_>>(),
        vec!["one"]
    );
    assert_eq!(total_records(&engine, 1).await, 0);
    assert_eq!(total_records(&engine, 2).await, 1);

    let report = engine.cash_flow_report_at(1, at(2026, 2, 1)).await.unwrap();
    assert!(report.monthly_data.is_empty());
}

#[tokio::test]
async fn tag_names_are_trimmed_and_required() {
    let (engine, _db) = engine_with_db().await;
    let tag = engine.create_tag(1, "  groceries ").await.unwrap();
    assert_eq!(tag.name, "groceries");

    let err = engine.create_tag(1, "   ").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn list_tags_paginates() {
    let (engine, _db) = engine_with_db().await;
    for index in 0..5 {
        engine.create_tag(1, &format!("tag {index}")).await.unwrap();
    }

    let page = engine
        .list_tags(1, PageRequest::new(Some(2), Some(2)))
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.total_pages(), 3);
    assert_eq!(
        page.items.iter().map(|tag| tag.name.as_str()).collect::<Vec<_>>(),
        vec!["tag 2", "tag 3"]
    );
}

#[tokio::test]
async fn cash_flow_report_buckets_by_month() {
    let (engine, _db) = engine_with_db().await;
    engine
        .create_records_bulk(
            1,
            vec![
                new_record("IN", 2000.0, at(2026, 3, 5), &[]),
                new_record("OUT", 1000.0, at(2026, 3, 20), &[]),
                new_record("OUT", 50.0, at(2026, 5, 1), &[]),
                new_record("IN", 12.5, at(2025, 11, 30), &[]),
            ],
        )
        .await
        .unwrap();

    let report = engine.cash_flow_report_at(1, at(2026, 10, 18)).await.unwrap();
    assert_eq!(
        report,
        CashFlowReport {
            monthly_data: vec![
                MonthlyCashFlow {
                    year: 2025,
                    month: 11,
                    cash_in: Amount::new(1250),
                    cash_out: Amount::ZERO,
                },
                MonthlyCashFlow {
                    year: 2026,
                    month: 3,
                    cash_in: Amount::new(200_000),
                    cash_out: Amount::new(100_000),
                },
                MonthlyCashFlow {
                    year: 2026,
                    month: 5,
                    cash_in: Amount::ZERO,
                    cash_out: Amount::new(5_000),
                },
            ],
        }
    );
}

#[tokio::test]
async fn cash_flow_report_window_is_two_years() {
    let (engine, _db) = engine_with_db().await;
    let now = at(2026, 10, 18);
    let start = window_start(now);

    engine
        .create_records_bulk(
            1,
            vec![
                new_record("IN", 1.0, start - Duration::days(1), &[]),
                new_record("IN", 2.0, start + Duration::days(1), &[]),
                new_record("OUT", 4.0, start, &[]),
            ],
        )
        .await
        .unwrap();

    let report = engine.cash_flow_report_at(1, now).await.unwrap();
    assert_eq!(
        report.monthly_data,
        vec![MonthlyCashFlow {
            year: 2024,
            month: 10,
            cash_in: Amount::new(200),
            cash_out: Amount::new(400),
        }]
    );
}

#[tokio::test]
async fn cash_flow_report_anchored_on_leap_day_starts_in_march() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_records_bulk(
            1,
            vec![
                new_record("IN", 1.0, at(2026, 2, 28), &[]),
                new_record("IN", 2.0, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(), &[]),
            ],
        )
        .await
        .unwrap();

    let report = engine
        .cash_flow_report_at(1, Utc.with_ymd_and_hms(2028, 2, 29, 0, 0, 0).unwrap())
        .await
        .unwrap();
    assert_eq!(
        report.monthly_data,
        vec![MonthlyCashFlow {
            year: 2026,
            month: 3,
            cash_in: Amount::new(200),
            cash_out: Amount::ZERO,
        }]
    );
}

#[tokio::test]
async fn concurrent_bulk_inserts_do_not_interfere() {
    let (engine, path) = engine_with_file_db().await;
    let engine = Arc::new(engine);

    let mut tasks = tokio::task::JoinSet::new();
    for worker in 0..8 {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move {
            let batch = (0..5)
                .map(|index| {
                    new_record(
                        if index % 2 == 0 { "IN" } else { "OUT" },
                        f64::from(worker * 10 + index),
                        at(2026, 1, 1),
                        &[],
                    )
                })
                .collect();
            engine.create_records_bulk(1, batch).await
        });
    }
    while let Some(result) = tasks.join_next().await {
        assert_eq!(result.unwrap().unwrap().len(), 5);
    }

    assert_eq!(total_records(&engine, 1).await, 40);

    drop(engine);
    let _ = std::fs::remove_file(path);
}

/// Store double that only counts how often it is reached.
#[derive(Default)]
struct CountingStore {
    calls: AtomicUsize,
}

impl CountingStore {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl RecordStore for CountingStore {
    async fn insert_tag(&self, _organization_id: i64, _name: &str) -> ResultEngine<Tag> {
        self.hit();
        Err(EngineError::InvalidInput("unused".to_string()))
    }

    async fn list_tags(&self, _organization_id: i64, page: PageRequest) -> ResultEngine<Page<Tag>> {
        self.hit();
        Ok(Page {
            items: Vec::new(),
            total: 0,
            request: page,
        })
    }

    async fn insert_records(
        &self,
        _organization_id: i64,
        batch: Vec<ValidRecord>,
    ) -> ResultEngine<Vec<FinancialRecord>> {
        self.hit();
        assert!(batch.iter().all(|record| !record.amount.is_negative()));
        Ok(Vec::new())
    }

    async fn list_records(
        &self,
        _organization_id: i64,
        _tag_ids: &BTreeSet<i32>,
        page: PageRequest,
    ) -> ResultEngine<Page<FinancialRecord>> {
        self.hit();
        Ok(Page {
            items: Vec::new(),
            total: 0,
            request: page,
        })
    }

    async fn aggregate_monthly_cash_flow(
        &self,
        _organization_id: i64,
        since: DateTime<Utc>,
    ) -> ResultEngine<Vec<MonthlyCashFlow>> {
        self.hit();
        assert_eq!(since, window_start(at(2026, 10, 18)));
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn validation_failures_never_reach_the_store() {
    let engine = Engine::with_store(CountingStore::default());

    assert!(engine.create_tag(1, " ").await.is_err());
    assert!(engine.create_tag(0, "rent").await.is_err());
    assert!(
        engine
            .create_record(1, new_record("UP", 1.0, at(2026, 1, 1), &[]))
            .await
            .is_err()
    );
    assert!(
        engine
            .create_records_bulk(
                1,
                vec![
                    new_record("IN", 1.0, at(2026, 1, 1), &[]),
                    new_record("IN", -1.0, at(2026, 1, 1), &[]),
                ],
            )
            .await
            .is_err()
    );
    assert!(engine.create_records_bulk(1, Vec::new()).await.is_err());
    assert!(engine.cash_flow_report_at(0, at(2026, 10, 18)).await.is_err());
    assert_eq!(engine.store().calls.load(Ordering::SeqCst), 0);

    engine.cash_flow_report_at(7, at(2026, 10, 18)).await.unwrap();
    engine
        .list_records(7, &[1, 1, 2], PageRequest::default())
        .await
        .unwrap();
    assert_eq!(engine.store().calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn create_record_reports_missing_insert() {
    let engine = Engine::with_store(CountingStore::default());
    let err = engine
        .create_record(1, new_record("IN", 1.0, at(2026, 1, 1), &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Database(_)));
}
