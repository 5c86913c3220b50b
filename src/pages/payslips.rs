use std::ops::Deref;

use actix_web::{dev, get, post, web, FromRequest, HttpRequest, HttpResponse, Responder};
use chrono::Local;
use futures_util::future::LocalBoxFuture;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{auth::Admin, consts::SALARY_EXPENSE_CATEGORY, entity::{expense, payslip, payslip_payment, prelude::*, sea_orm_active_enums::RoleType, staff}, error::ApiError, ledger::{self, AttendanceInput, PaymentSummary, YearMonth}};

use super::{find_by_path, RecordPayment};

use extractor::VisiblePayslip;
use model::*;

mod extractor;
mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(generate_payslip)
        .service(get_payslip)
        .service(get_payslip_payments)
        .service(record_payslip_payment);
}

async fn reconcile_payslip(db: &impl sea_orm::ConnectionTrait, payslip: &payslip::Model) -> Result<(Vec<payslip_payment::Model>, PaymentSummary), ApiError> {
    let payments = PayslipPayment::find()
        .filter(payslip_payment::Column::PayslipId.eq(payslip.id))
        .order_by_asc(payslip_payment::Column::PaidOn)
        .order_by_asc(payslip_payment::Column::CreatedAt)
        .all(db).await?;

    let summary = ledger::reconcile(payslip.net_salary, payments.iter().map(|p| p.amount))?;

    Ok((payments, summary))
}

#[post("")]
async fn generate_payslip(db: web::Data<DatabaseConnection>, admin: Admin, payload: web::Json<GeneratePayslip>) -> Result<impl Responder, ApiError> {
    let payload = payload.into_inner();

    let Some(staff) = Staff::find_by_id(payload.staff_id)
        .one(db.as_ref()).await?
    else {
        return Err(ApiError::NotFound("staff"));
    };

    let period = payload.month.first_day();

    let existing = Payslip::find()
        .filter(payslip::Column::StaffId.eq(staff.id))
        .filter(payslip::Column::Period.eq(period))
        .one(db.as_ref()).await?;

    let month = payload.month;
    let duplicate = || format!("a payslip for {} already exists for {month}", staff.full_name);

    if existing.is_some() {
        return Err(ApiError::Conflict(duplicate()));
    }

    let attendance = payload.attendance(staff.base_salary)?;
    let breakdown = attendance.calculate()?;

    // counters are bounded by validation, at most 31 each
    let days = |n: u32| n as i32;

    let model = Payslip::insert(payslip::ActiveModel {
        created_by: Set(Some(admin.id)),
        updated_by: Set(Some(admin.id)),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        staff_id: Set(staff.id),
        period: Set(period),
        staff_name: Set(staff.full_name.clone()),
        designation: Set(staff.designation.clone()),
        base_salary: Set(attendance.base_salary),
        working_days: Set(attendance.working_days.map(days).unwrap_or_default()),
        absent_days: Set(days(attendance.absent_days)),
        casual_leave: Set(days(attendance.casual_leave)),
        half_days: Set(days(attendance.half_days)),
        per_day_salary: Set(breakdown.per_day_salary),
        present_days: Set(breakdown.present_days),
        gross_salary: Set(breakdown.gross_salary),
        deductions: Set(attendance.deductions),
        net_salary: Set(breakdown.net_salary),
        ..Default::default()
    }).exec_with_returning(db.as_ref()).await
        .map_err(|err| ApiError::conflict_on_duplicate(err, duplicate))?;

    info!(payslip_id = %model.id, staff_id = %staff.id, %month, net_salary = %model.net_salary, "generated payslip");

    let summary = ledger::reconcile(model.net_salary, [])?;

    Ok(HttpResponse::Created().json(PayslipDetail {
        payslip: model,
        payments: Vec::new(),
        summary,
    }))
}

#[get("/{payslip_id}")]
async fn get_payslip(db: web::Data<DatabaseConnection>, payslip: VisiblePayslip) -> Result<impl Responder, ApiError> {
    let (payments, summary) = reconcile_payslip(db.as_ref(), &payslip).await?;

    Ok(web::Json(PayslipDetail {
        payslip: payslip.0,
        payments,
        summary,
    }))
}

#[get("/{payslip_id}/payments")]
async fn get_payslip_payments(db: web::Data<DatabaseConnection>, payslip: VisiblePayslip) -> Result<impl Responder, ApiError> {
    let (payments, summary) = reconcile_payslip(db.as_ref(), &payslip).await?;

    Ok(web::Json(PayslipPayments { payments, summary }))
}

#[post("/{payslip_id}/payments")]
async fn record_payslip_payment(db: web::Data<DatabaseConnection>, admin: Admin, payslip: payslip::Model, payload: web::Json<RecordPayment>) -> Result<impl Responder, ApiError> {
    payload.validate()?;

    let paid_on = payload.paid_on();

    // The expense row must never exist without its payment, nor the other way around
    let txn = db.begin().await?;

    let payment = PayslipPayment::insert(payslip_payment::ActiveModel {
        created_by: Set(Some(admin.id)),
        updated_by: Set(Some(admin.id)),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        payslip_id: Set(payslip.id),
        amount: Set(payload.amount),
        paid_on: Set(paid_on),
        method: Set(payload.method),
        note: Set(payload.note.clone()),
        ..Default::default()
    }).exec_with_returning(&txn).await?;

    let expense = Expense::insert(expense::ActiveModel {
        created_by: Set(Some(admin.id)),
        updated_by: Set(Some(admin.id)),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        category: Set(SALARY_EXPENSE_CATEGORY.to_string()),
        description: Set(format!("Salary for {} ({})", payslip.staff_name, YearMonth::containing(payslip.period).label())),
        amount: Set(payment.amount),
        method: Set(payment.method),
        spent_on: Set(paid_on),
        payslip_payment_id: Set(Some(payment.id)),
        ..Default::default()
    }).exec_with_returning(&txn).await?;

    txn.commit().await?;

    let (_, summary) = reconcile_payslip(db.as_ref(), &payslip).await?;

    if summary.remaining_amount < Decimal::ZERO {
        warn!(payslip_id = %payslip.id, remaining = %summary.remaining_amount, "payslip is over-paid");
    }

    info!(payslip_id = %payslip.id, payment_id = %payment.id, amount = %payment.amount, status = ?summary.payment_status, "recorded payslip payment");

    Ok(HttpResponse::Created().json(RecordedPayslipPayment {
        payment,
        expense,
        summary,
    }))
}

#[cfg(test)]
pub(super) fn payslip_fixture(staff_id: Uuid) -> payslip::Model {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    payslip::Model {
        id: Uuid::new_v4(),
        created_at: Local::now().into(),
        updated_at: Local::now().into(),
        created_by: None,
        updated_by: None,
        staff_id,
        period: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        staff_name: "Bob Mathew".to_string(),
        designation: "Mathematics Teacher".to_string(),
        base_salary: dec!(30000),
        working_days: 26,
        absent_days: 2,
        casual_leave: 1,
        half_days: 2,
        per_day_salary: dec!(1000),
        present_days: dec!(27),
        gross_salary: dec!(27000),
        deductions: dec!(500),
        net_salary: dec!(26500),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::{Method, StatusCode}, test, App};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    use crate::{auth::{bearer, staff_fixture, Authority}, entity::sea_orm_active_enums::PaymentMethod, error::unique_violation, ledger::PaymentStatus};

    use super::*;

    const SECRET: &[u8] = b"secret";

    fn payment_fixture(payslip: &payslip::Model, amount: rust_decimal::Decimal) -> payslip_payment::Model {
        payslip_payment::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            created_by: None,
            updated_by: None,
            payslip_id: payslip.id,
            amount,
            paid_on: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            method: PaymentMethod::BankTransfer,
            note: None,
        }
    }

    #[actix_web::test]
    async fn test_generate_payslip() {
        let admin = staff_fixture(RoleType::Admin);
        let teacher = staff_fixture(RoleType::Staff);
        let payslip = payslip_fixture(teacher.id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ teacher.clone() ],
            ])
            .append_query_results([
                Vec::<payslip::Model>::new(),
                vec![ payslip.clone() ],
            ])
            .append_query_results([
                vec![ teacher.clone() ],
            ])
            .append_query_results([
                vec![ payslip.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/payslips").configure(config))
        ).await;

        let body = json!({
            "staffId": teacher.id,
            "month": "2025-06",
            "workingDays": 26,
            "absentDays": 2,
            "casualLeave": 1,
            "halfDays": 2,
            "deductions": 500,
        });

        {
            let req = test::TestRequest::default()
                .uri("/payslips")
                .method(Method::POST)
                .insert_header(bearer(SECRET, &admin))
                .set_json(&body)
                .to_request();

            let response = test::call_service(&app, req).await;
            assert_eq!(response.status(), StatusCode::CREATED);

            let detail: PayslipDetail = test::read_body_json(response).await;
            assert_eq!(detail.payslip, payslip);
            assert!(detail.payments.is_empty());
            assert_eq!(detail.summary.payment_status, PaymentStatus::Unpaid);
            assert_eq!(detail.summary.remaining_amount, dec!(26500));
        }

        {
            let req = test::TestRequest::default()
                .uri("/payslips")
                .method(Method::POST)
                .insert_header(bearer(SECRET, &admin))
                .set_json(&body)
                .to_request();

            let response = test::call_service(&app, req).await;
            assert_eq!(response.status(), StatusCode::CONFLICT);
        }

        {
            let req = test::TestRequest::default()
                .uri("/payslips")
                .method(Method::POST)
                .insert_header(bearer(SECRET, &teacher))
                .set_json(&body)
                .to_request();

            let response = test::call_service(&app, req).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
    }

    #[actix_web::test]
    async fn test_generate_payslip_duplicate_insert() {
        let admin = staff_fixture(RoleType::Admin);
        let teacher = staff_fixture(RoleType::Staff);

        // another request inserted the same month between the check and the insert
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ teacher.clone() ],
            ])
            .append_query_results([
                Vec::<payslip::Model>::new(),
            ])
            .append_query_errors([
                unique_violation(),
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/payslips").configure(config))
        ).await;

        let req = test::TestRequest::default()
            .uri("/payslips")
            .method(Method::POST)
            .insert_header(bearer(SECRET, &admin))
            .set_json(json!({
                "staffId": teacher.id,
                "month": "2025-06",
                "workingDays": 26,
                "absentDays": 2,
                "halfDays": 2,
                "deductions": 500,
            }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_generate_payslip_requires_working_days() {
        let admin = staff_fixture(RoleType::Admin);
        let teacher = staff_fixture(RoleType::Staff);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ teacher.clone() ],
            ])
            .append_query_results([
                Vec::<payslip::Model>::new(),
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/payslips").configure(config))
        ).await;

        let req = test::TestRequest::default()
            .uri("/payslips")
            .method(Method::POST)
            .insert_header(bearer(SECRET, &admin))
            .set_json(json!({
                "staffId": teacher.id,
                "month": "2025-06",
                "absentDays": 2,
                "halfDays": 2,
                "deductions": 500,
            }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_get_payslip_payments() {
        let teacher = staff_fixture(RoleType::Staff);
        let payslip = payslip_fixture(teacher.id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ payslip.clone() ],
            ])
            .append_query_results([
                vec![ payment_fixture(&payslip, dec!(12000)), payment_fixture(&payslip, dec!(14500)) ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/payslips").configure(config))
        ).await;

        let req = test::TestRequest::default()
            .uri(&format!("/payslips/{}/payments", payslip.id))
            .insert_header(bearer(SECRET, &teacher))
            .to_request();

        let payments: PayslipPayments = test::call_and_read_body_json(&app, req).await;
        assert_eq!(payments.payments.len(), 2);
        assert_eq!(payments.summary, PaymentSummary {
            total_paid_amount: dec!(26500),
            remaining_amount: dec!(0),
            payment_status: PaymentStatus::Paid,
        });
    }

    #[actix_web::test]
    async fn test_record_payslip_payment() {
        let admin = staff_fixture(RoleType::Admin);
        let payslip = payslip_fixture(Uuid::new_v4());
        let payment = payment_fixture(&payslip, dec!(12000));

        let expense = expense::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            created_by: Some(admin.id),
            updated_by: Some(admin.id),
            category: SALARY_EXPENSE_CATEGORY.to_string(),
            description: "Salary for Bob Mathew (June 2025)".to_string(),
            amount: dec!(12000),
            method: PaymentMethod::BankTransfer,
            spent_on: payment.paid_on,
            payslip_payment_id: Some(payment.id),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ payslip.clone() ],
            ])
            .append_query_results([
                vec![ payment.clone() ],
            ])
            .append_query_results([
                vec![ expense.clone() ],
            ])
            .append_query_results([
                vec![ payment.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/payslips").configure(config))
        ).await;

        let req = test::TestRequest::default()
            .uri(&format!("/payslips/{}/payments", payslip.id))
            .method(Method::POST)
            .insert_header(bearer(SECRET, &admin))
            .set_json(json!({ "amount": 12000, "paidOn": "2025-07-01", "method": "BankTransfer" }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let recorded: RecordedPayslipPayment = test::read_body_json(response).await;
        assert_eq!(recorded.payment, payment);
        assert_eq!(recorded.expense.payslip_payment_id, Some(payment.id));
        assert_eq!(recorded.summary.payment_status, PaymentStatus::Partial);
        assert_eq!(recorded.summary.remaining_amount, dec!(14500));
    }

    #[actix_web::test]
    async fn test_record_payslip_payment_rejects_non_positive_amount() {
        let admin = staff_fixture(RoleType::Admin);
        let payslip = payslip_fixture(Uuid::new_v4());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ payslip.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/payslips").configure(config))
        ).await;

        let req = test::TestRequest::default()
            .uri(&format!("/payslips/{}/payments", payslip.id))
            .method(Method::POST)
            .insert_header(bearer(SECRET, &admin))
            .set_json(json!({ "amount": 0, "method": "UPI" }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
