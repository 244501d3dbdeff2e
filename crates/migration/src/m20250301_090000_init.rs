//! Initial schema migration.
//!
//! - `tags`: organization-scoped labels
//! - `financial_records`: directional cash entries, amounts in cents
//! - `financial_record_tags`: many-to-many link between the two

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
pub(crate) enum Tags {
    Table,
    Id,
    OrganizationId,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum FinancialRecords {
    Table,
    Id,
    OrganizationId,
    Direction,
    AmountMinor,
    DueDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum FinancialRecordTags {
    Table,
    FinancialRecordId,
    TagId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Tags
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tags::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tags::OrganizationId).big_integer().not_null())
                    .col(ColumnDef::new(Tags::Name).string().not_null())
                    .col(
                        ColumnDef::new(Tags::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tags::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Financial records
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(FinancialRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinancialRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FinancialRecords::OrganizationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialRecords::Direction)
                            .string_len(3)
                            .not_null()
                            .check(Expr::col(FinancialRecords::Direction).is_in(["IN", "OUT"])),
                    )
                    .col(
                        ColumnDef::new(FinancialRecords::AmountMinor)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(FinancialRecords::AmountMinor).gte(0)),
                    )
                    .col(
                        ColumnDef::new(FinancialRecords::DueDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialRecords::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Record <-> tag links
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(FinancialRecordTags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinancialRecordTags::FinancialRecordId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialRecordTags::TagId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(FinancialRecordTags::FinancialRecordId)
                            .col(FinancialRecordTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-financial_record_tags-financial_record_id")
                            .from(
                                FinancialRecordTags::Table,
                                FinancialRecordTags::FinancialRecordId,
                            )
                            .to(FinancialRecords::Table, FinancialRecords::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-financial_record_tags-tag_id")
                            .from(FinancialRecordTags::Table, FinancialRecordTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(FinancialRecordTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FinancialRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        Ok(())
    }
}
