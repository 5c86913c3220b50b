use std::collections::BTreeMap;

use actix_web::{dev, get, post, web, FromRequest, HttpRequest, HttpResponse, Responder};
use chrono::Local;
use futures_util::future::LocalBoxFuture;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{auth::Admin, entity::{fee_payment, monthly_fee, monthly_fee_item, prelude::*, staff, student}, error::ApiError, ledger::{self, FeeItem, FeeRecord, FeeTimelineEntry, LedgerError, MonthRange, YearMonth}};

use super::{find_by_path, RecordPayment};

use model::*;

mod extractor;
mod model;

pub(super) fn student_config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(generate_fee)
        .service(get_fee_timeline);
}

pub(super) fn fee_config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(record_fee_payment);
}

/// Items of each fee keyed by fee id, in the order they were entered
async fn load_items(db: &impl ConnectionTrait, fee_ids: &[Uuid]) -> Result<BTreeMap<Uuid, Vec<FeeItem>>, ApiError> {
    let items = MonthlyFeeItem::find()
        .filter(monthly_fee_item::Column::MonthlyFeeId.is_in(fee_ids.iter().copied()))
        .order_by_asc(monthly_fee_item::Column::Position)
        .all(db).await?;

    let mut by_fee: BTreeMap<Uuid, Vec<FeeItem>> = BTreeMap::new();
    for item in items {
        by_fee.entry(item.monthly_fee_id).or_default().push(FeeItem {
            fee_type: item.fee_type,
            amount: item.amount,
        });
    }

    Ok(by_fee)
}

async fn load_payments(db: &impl ConnectionTrait, fee_ids: &[Uuid]) -> Result<Vec<fee_payment::Model>, ApiError> {
    Ok(FeePayment::find()
        .filter(fee_payment::Column::MonthlyFeeId.is_in(fee_ids.iter().copied()))
        .order_by_asc(fee_payment::Column::PaidOn)
        .order_by_asc(fee_payment::Column::CreatedAt)
        .all(db).await?)
}

/// Ledger row for a single generated month
fn month_entry(fee: &monthly_fee::Model, items: Vec<FeeItem>, payments: Vec<Decimal>) -> Result<FeeRow, LedgerError> {
    let month = YearMonth::containing(fee.period);
    let range = MonthRange::new(month, month)?;

    let fees = BTreeMap::from([(month, FeeRecord { discount: fee.discount, items })]);
    let payments = BTreeMap::from([(month, payments)]);

    let entry = ledger::build_timeline(&range, &fees, &payments)?
        .pop()
        .ok_or_else(|| LedgerError::invalid("month", format!("{month} produced no ledger row")))?;

    Ok(FeeRow { fee_id: Some(fee.id), entry })
}

#[post("/{student_id}/fees")]
async fn generate_fee(db: web::Data<DatabaseConnection>, admin: Admin, student: student::Model, payload: web::Json<GenerateFee>) -> Result<impl Responder, ApiError> {
    payload.validate()?;

    let period = payload.month.first_day();

    let existing = MonthlyFee::find()
        .filter(monthly_fee::Column::StudentId.eq(student.id))
        .filter(monthly_fee::Column::Period.eq(period))
        .one(db.as_ref()).await?;

    let duplicate = || format!("fee for {} is already generated for {}", payload.month, student.full_name);

    if existing.is_some() {
        return Err(ApiError::Conflict(duplicate()));
    }

    let txn = db.begin().await?;

    let fee = MonthlyFee::insert(monthly_fee::ActiveModel {
        created_by: Set(Some(admin.id)),
        updated_by: Set(Some(admin.id)),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        student_id: Set(student.id),
        period: Set(period),
        discount: Set(payload.discount),
        ..Default::default()
    }).exec_with_returning(&txn).await
        .map_err(|err| ApiError::conflict_on_duplicate(err, duplicate))?;

    let mut items = Vec::with_capacity(payload.items.len());
    for (position, item) in payload.items.iter().enumerate() {
        let item = MonthlyFeeItem::insert(monthly_fee_item::ActiveModel {
            created_at: Set(Local::now().fixed_offset()),
            updated_at: Set(Local::now().fixed_offset()),
            monthly_fee_id: Set(fee.id),
            fee_type: Set(item.fee_type),
            amount: Set(Some(item.amount)),
            position: Set(position as i32),
            ..Default::default()
        }).exec_with_returning(&txn).await?;

        items.push(FeeItem { fee_type: item.fee_type, amount: item.amount });
    }

    txn.commit().await?;

    info!(fee_id = %fee.id, student_id = %student.id, month = %payload.month, "generated monthly fee");

    Ok(HttpResponse::Created().json(month_entry(&fee, items, Vec::new())?))
}

#[get("/{student_id}/fees/timeline")]
async fn get_fee_timeline(db: web::Data<DatabaseConnection>, _staff: staff::Model, student: student::Model, query: web::Query<TimelineQuery>) -> Result<impl Responder, ApiError> {
    let range = MonthRange::new(query.from, query.to)?;

    let fees = MonthlyFee::find()
        .filter(monthly_fee::Column::StudentId.eq(student.id))
        .filter(monthly_fee::Column::Period.between(range.from().first_day(), range.to().first_day()))
        .order_by_asc(monthly_fee::Column::Period)
        .all(db.as_ref()).await?;

    let fee_ids = fees.iter().map(|fee| fee.id).collect::<Vec<_>>();

    let (mut items, payments) = if fee_ids.is_empty() {
        (BTreeMap::new(), Vec::new())
    } else {
        (load_items(db.as_ref(), &fee_ids).await?, load_payments(db.as_ref(), &fee_ids).await?)
    };

    let mut fee_months = BTreeMap::new();
    let mut fee_ids_by_month = BTreeMap::new();
    let mut records = BTreeMap::new();

    for fee in &fees {
        let month = YearMonth::containing(fee.period);

        if fee_ids_by_month.insert(month, fee.id).is_some() {
            return Err(LedgerError::DataInconsistency { month, reason: "more than one fee generated".to_string() }.into());
        }

        fee_months.insert(fee.id, month);
        records.insert(month, FeeRecord {
            discount: fee.discount,
            items: items.remove(&fee.id).unwrap_or_default(),
        });
    }

    let mut paid: BTreeMap<YearMonth, Vec<Decimal>> = BTreeMap::new();
    for payment in &payments {
        if let Some(month) = fee_months.get(&payment.monthly_fee_id) {
            paid.entry(*month).or_default().push(payment.amount);
        }
    }

    let entries = ledger::build_timeline(&range, &records, &paid)?
        .into_iter()
        .map(|entry: FeeTimelineEntry| -> Result<FeeRow, LedgerError> {
            let month = YearMonth::new(entry.year, entry.month)?;

            Ok(FeeRow { fee_id: fee_ids_by_month.get(&month).copied(), entry })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(web::Json(StudentTimeline { student, entries }))
}

#[post("/{fee_id}/payments")]
async fn record_fee_payment(db: web::Data<DatabaseConnection>, admin: Admin, fee: monthly_fee::Model, payload: web::Json<RecordPayment>) -> Result<impl Responder, ApiError> {
    payload.validate()?;

    // Refuse payments against a fee whose items cannot be totalled
    let items = load_items(db.as_ref(), &[fee.id]).await?.remove(&fee.id).unwrap_or_default();
    if let Some(position) = items.iter().position(|item| item.amount.is_none()) {
        return Err(LedgerError::invalid("amount", format!("fee item #{} has no amount", position + 1)).into());
    }

    let payment = FeePayment::insert(fee_payment::ActiveModel {
        created_by: Set(Some(admin.id)),
        updated_by: Set(Some(admin.id)),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        monthly_fee_id: Set(fee.id),
        amount: Set(payload.amount),
        paid_on: Set(payload.paid_on()),
        method: Set(payload.method),
        note: Set(payload.note.clone()),
        ..Default::default()
    }).exec_with_returning(db.as_ref()).await?;

    let payments = load_payments(db.as_ref(), &[fee.id]).await?;
    let row = month_entry(&fee, items, payments.iter().map(|p| p.amount).collect())?;

    if row.entry.due_amount.is_some_and(|due| due < Decimal::ZERO) {
        warn!(fee_id = %fee.id, due = ?row.entry.due_amount, "monthly fee is over-paid");
    }

    info!(fee_id = %fee.id, payment_id = %payment.id, amount = %payment.amount, status = ?row.entry.status, "recorded fee payment");

    Ok(HttpResponse::Created().json(RecordedFeePayment { payment, fee: row }))
}
