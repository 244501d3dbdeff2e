//! Indexes backing the tag-filtered listing and the cash-flow report.

use sea_orm_migration::prelude::*;

use crate::m20250301_090000_init::{FinancialRecordTags, FinancialRecords, Tags};

#[derive(DeriveMigrationName)]
pub struct Migration;

const INDEXES: [&str; 6] = [
    "idx-financial_records-organization_id-due_date",
    "idx-financial_records-due_date",
    "idx-financial_records-direction",
    "idx-financial_record_tags-financial_record_id",
    "idx-financial_record_tags-tag_id",
    "idx-tags-organization_id",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Cash-flow report: WHERE organization_id = ? AND due_date >= ?
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(INDEXES[0])
                    .table(FinancialRecords::Table)
                    .col(FinancialRecords::OrganizationId)
                    .col(FinancialRecords::DueDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(INDEXES[1])
                    .table(FinancialRecords::Table)
                    .col(FinancialRecords::DueDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(INDEXES[2])
                    .table(FinancialRecords::Table)
                    .col(FinancialRecords::Direction)
                    .to_owned(),
            )
            .await?;

        // Tag filter semi-join and tag hydration.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(INDEXES[3])
                    .table(FinancialRecordTags::Table)
                    .col(FinancialRecordTags::FinancialRecordId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(INDEXES[4])
                    .table(FinancialRecordTags::Table)
                    .col(FinancialRecordTags::TagId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(INDEXES[5])
                    .table(Tags::Table)
                    .col(Tags::OrganizationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let tables = [
            FinancialRecords::Table.to_string(),
            FinancialRecords::Table.to_string(),
            FinancialRecords::Table.to_string(),
            FinancialRecordTags::Table.to_string(),
            FinancialRecordTags::Table.to_string(),
            Tags::Table.to_string(),
        ];
        for (name, table) in INDEXES.into_iter().zip(tables) {
            manager
                .drop_index(Index::drop().name(name).table(Alias::new(table)).to_owned())
                .await?;
        }
        Ok(())
    }
}
