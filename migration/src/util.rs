use sea_orm_migration::prelude::*;

pub(crate) fn default_table_statement() -> TableCreateStatement {
    TableCreateStatement::new()
        .if_not_exists()
        .col(ColumnDef::new(DefaultColumn::Id)
            .uuid()
            .primary_key()
            .default(Expr::cust("GEN_RANDOM_UUID()"))
            .take())
        .col(ColumnDef::new(DefaultColumn::CreatedAt)
            .timestamp_with_time_zone()
            .not_null()
            .take())
        .col(ColumnDef::new(DefaultColumn::UpdatedAt)
            .timestamp_with_time_zone()
            .not_null()
            .take())
        .take()
}

#[derive(DeriveIden)]
pub(crate) enum DefaultColumn {
    Id,
    CreatedAt,
    UpdatedAt,
}

/// Must run `setup_staff_table_fk` macro on the table afterwards
///
/// # Example
///
/// ```rs
/// manager
///     .create_table(default_staff_table_statement()
///         .table(MonthlyFee::Table)
///         .col(ColumnDef::new(MonthlyFee::Period)
///             .date()
///             .not_null())
///         .take()
///     ).await?;
/// setup_staff_table_fk!(manager, MonthlyFee::Table);
/// ```
pub(crate) fn default_staff_table_statement() -> TableCreateStatement {
    default_table_statement()
        .col(ColumnDef::new(DefaultStaffColumn::CreatedBy)
            .uuid())
        .col(ColumnDef::new(DefaultStaffColumn::UpdatedBy)
            .uuid())
        .take()
}

/// Money columns all share one precision
pub(crate) fn money(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .decimal_len(12, 2)
        .not_null()
        .take()
}

#[macro_export]
macro_rules! setup_staff_table_fk {
    ($m:expr,$t:expr) => {{
        use crate::util::*;
        use crate::m20250701_090000_init::Staff;

        $m.create_foreign_key(ForeignKeyCreateStatement::new()
                .from($t, DefaultStaffColumn::CreatedBy)
                .to(Staff::Table, DefaultColumn::Id)
                .on_delete(ForeignKeyAction::SetNull)
                .on_update(ForeignKeyAction::Cascade)
                .take()
        ).await?;

        $m.create_foreign_key(ForeignKeyCreateStatement::new()
                .from($t, DefaultStaffColumn::UpdatedBy)
                .to(Staff::Table, DefaultColumn::Id)
                .on_delete(ForeignKeyAction::SetNull)
                .on_update(ForeignKeyAction::Cascade)
                .take()
        ).await?;
    }};
}

#[derive(DeriveIden)]
pub(crate) enum DefaultStaffColumn {
    CreatedBy,
    UpdatedBy,
}
