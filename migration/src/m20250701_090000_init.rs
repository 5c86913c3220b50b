use sea_orm_migration::{prelude::{extension::postgres::TypeDropStatement, *}, sea_orm::{ActiveEnum, DbBackend, DeriveActiveEnum, EnumIter, Schema}};

use crate::{setup_staff_table_fk, util::{default_staff_table_statement, default_table_statement, money, DefaultColumn}};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(DbBackend::Postgres);

        manager.create_type(schema.create_enum_from_active_enum::<RoleType>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<PaymentMethod>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<FeeType>()).await?;

        manager
            .create_table(default_table_statement()
                .table(Staff::Table)
                .col(ColumnDef::new(Staff::Username)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(Staff::Password)
                    .binary()
                    .not_null()) // SHA-256 of `password:username`
                .col(ColumnDef::new(Staff::Role)
                    .custom(RoleType::name())
                    .not_null())
                .col(ColumnDef::new(Staff::FullName)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Staff::Designation)
                    .text()
                    .not_null())
                .col(money(Staff::BaseSalary))
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(Student::Table)
                .col(ColumnDef::new(Student::FullName)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Student::AdmissionNumber)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(Student::ClassName)
                    .text()
                    .not_null())
                .take()
            ).await?;

        manager
            .create_table(default_staff_table_statement()
                .table(Payslip::Table)
                .col(ColumnDef::new(Payslip::StaffId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Payslip::Period)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Payslip::StaffName)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Payslip::Designation)
                    .text()
                    .not_null())
                .col(money(Payslip::BaseSalary))
                .col(ColumnDef::new(Payslip::WorkingDays)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Payslip::AbsentDays)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Payslip::CasualLeave)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Payslip::HalfDays)
                    .integer()
                    .not_null())
                .col(money(Payslip::PerDaySalary))
                .col(ColumnDef::new(Payslip::PresentDays)
                    .decimal_len(4, 1)
                    .not_null())
                .col(money(Payslip::GrossSalary))
                .col(money(Payslip::Deductions))
                .col(money(Payslip::NetSalary))
                .take()
            ).await?;
        setup_staff_table_fk!(manager, Payslip::Table);

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(Payslip::Table, Payslip::StaffId)
            .to(Staff::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        // One payslip per staff member per month
        manager.create_index(Index::create()
            .name("idx_payslip_staff_period")
            .table(Payslip::Table)
            .col(Payslip::StaffId)
            .col(Payslip::Period)
            .unique()
            .take()
        ).await?;

        manager
            .create_table(default_staff_table_statement()
                .table(PayslipPayment::Table)
                .col(ColumnDef::new(PayslipPayment::PayslipId)
                    .uuid()
                    .not_null())
                .col(money(PayslipPayment::Amount))
                .col(ColumnDef::new(PayslipPayment::PaidOn)
                    .date()
                    .not_null())
                .col(ColumnDef::new(PayslipPayment::Method)
                    .custom(PaymentMethod::name())
                    .not_null())
                .col(ColumnDef::new(PayslipPayment::Note)
                    .text())
                .take()
            ).await?;
        setup_staff_table_fk!(manager, PayslipPayment::Table);

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(PayslipPayment::Table, PayslipPayment::PayslipId)
            .to(Payslip::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        manager
            .create_table(default_staff_table_statement()
                .table(Expense::Table)
                .col(ColumnDef::new(Expense::Category)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Expense::Description)
                    .text()
                    .not_null())
                .col(money(Expense::Amount))
                .col(ColumnDef::new(Expense::Method)
                    .custom(PaymentMethod::name())
                    .not_null())
                .col(ColumnDef::new(Expense::SpentOn)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Expense::PayslipPaymentId)
                    .uuid())
                .take()
            ).await?;
        setup_staff_table_fk!(manager, Expense::Table);

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(Expense::Table, Expense::PayslipPaymentId)
            .to(PayslipPayment::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::SetNull)
            .take()
        ).await?;

        manager
            .create_table(default_staff_table_statement()
                .table(MonthlyFee::Table)
                .col(ColumnDef::new(MonthlyFee::StudentId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(MonthlyFee::Period)
                    .date()
                    .not_null())
                .col(money(MonthlyFee::Discount)
                    .default(0)
                    .take())
                .take()
            ).await?;
        setup_staff_table_fk!(manager, MonthlyFee::Table);

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(MonthlyFee::Table, MonthlyFee::StudentId)
            .to(Student::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        // Fees are generated on demand, at most once per student per month
        manager.create_index(Index::create()
            .name("idx_monthly_fee_student_period")
            .table(MonthlyFee::Table)
            .col(MonthlyFee::StudentId)
            .col(MonthlyFee::Period)
            .unique()
            .take()
        ).await?;

        manager
            .create_table(default_table_statement()
                .table(MonthlyFeeItem::Table)
                .col(ColumnDef::new(MonthlyFeeItem::MonthlyFeeId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(MonthlyFeeItem::FeeType)
                    .custom(FeeType::name())
                    .not_null())
                .col(ColumnDef::new(MonthlyFeeItem::Amount)
                    .decimal_len(12, 2)) // legacy imports may lack it
                .col(ColumnDef::new(MonthlyFeeItem::Position)
                    .integer()
                    .not_null())
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(MonthlyFeeItem::Table, MonthlyFeeItem::MonthlyFeeId)
            .to(MonthlyFee::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        manager
            .create_table(default_staff_table_statement()
                .table(FeePayment::Table)
                .col(ColumnDef::new(FeePayment::MonthlyFeeId)
                    .uuid()
                    .not_null())
                .col(money(FeePayment::Amount))
                .col(ColumnDef::new(FeePayment::PaidOn)
                    .date()
                    .not_null())
                .col(ColumnDef::new(FeePayment::Method)
                    .custom(PaymentMethod::name())
                    .not_null())
                .col(ColumnDef::new(FeePayment::Note)
                    .text())
                .take()
            ).await?;
        setup_staff_table_fk!(manager, FeePayment::Table);

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(FeePayment::Table, FeePayment::MonthlyFeeId)
            .to(MonthlyFee::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            FeePayment::Table.into_iden(),
            MonthlyFeeItem::Table.into_iden(),
            MonthlyFee::Table.into_iden(),
            Expense::Table.into_iden(),
            PayslipPayment::Table.into_iden(),
            Payslip::Table.into_iden(),
            Student::Table.into_iden(),
            Staff::Table.into_iden(),
        ] {
            manager.drop_table(
                TableDropStatement::new()
                    .table(table)
                    .take()
            ).await?;
        }

        for name in [FeeType::name(), PaymentMethod::name(), RoleType::name()] {
            manager
                .drop_type(
                    TypeDropStatement::new()
                        .name(name)
                        .to_owned()
                ).await?;
        }

        Ok(())
    }
}

#[derive(Iden)]
pub(crate) enum Staff {
    Table,
    Username,
    Password,
    Role,
    FullName,
    Designation,
    BaseSalary,
}

#[derive(Iden)]
pub(crate) enum Student {
    Table,
    FullName,
    AdmissionNumber,
    ClassName,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "role_type")]
enum RoleType {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "staff")]
    Staff,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "upi")]
    Upi,
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "fee_type")]
enum FeeType {
    #[sea_orm(string_value = "tuition")]
    Tuition,
    #[sea_orm(string_value = "hostel")]
    Hostel,
    #[sea_orm(string_value = "transport")]
    Transport,
    #[sea_orm(string_value = "admission")]
    Admission,
}

#[derive(Iden)]
enum Payslip {
    Table,
    StaffId,
    Period,
    StaffName,
    Designation,
    BaseSalary,
    WorkingDays,
    AbsentDays,
    CasualLeave,
    HalfDays,
    PerDaySalary,
    PresentDays,
    GrossSalary,
    Deductions,
    NetSalary,
}

#[derive(Iden)]
enum PayslipPayment {
    Table,
    PayslipId,
    Amount,
    PaidOn,
    Method,
    Note,
}

#[derive(Iden)]
enum Expense {
    Table,
    Category,
    Description,
    Amount,
    Method,
    SpentOn,
    PayslipPaymentId,
}

#[derive(Iden)]
enum MonthlyFee {
    Table,
    StudentId,
    Period,
    Discount,
}

#[derive(Iden)]
enum MonthlyFeeItem {
    Table,
    MonthlyFeeId,
    FeeType,
    Amount,
    Position,
}

#[derive(Iden)]
enum FeePayment {
    Table,
    MonthlyFeeId,
    Amount,
    PaidOn,
    Method,
    Note,
}
