use actix_web::{post, web, Responder};
use serde::{Deserialize, Serialize};

use crate::{entity::staff, error::ApiError, ledger::{self, AttendanceInput}};

use model::*;

pub(crate) mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(calculate_salary)
        .service(reconcile_payments)
        .service(build_fee_timeline);
}

#[post("/salary")]
async fn calculate_salary(_staff: staff::Model, payload: web::Json<SalaryRequest>) -> Result<impl Responder, ApiError> {
    let input = AttendanceInput::try_from(payload.into_inner())?;

    // workingDays only takes part in validation
    let breakdown = ledger::calculate(input.base_salary, input.absent_days, input.half_days, input.deductions)?;

    Ok(web::Json(breakdown))
}

#[post("/reconcile")]
async fn reconcile_payments(_staff: staff::Model, payload: web::Json<ReconcileRequest>) -> Result<impl Responder, ApiError> {
    let (payable, amounts) = payload.into_inner().into_parts()?;

    Ok(web::Json(ledger::reconcile(payable, amounts)?))
}

#[post("/timeline")]
async fn build_fee_timeline(_staff: staff::Model, payload: web::Json<TimelineRequest>) -> Result<impl Responder, ApiError> {
    let (range, fees, payments) = payload.into_inner().into_parts()?;

    let timeline = ledger::build_timeline(&range, &fees, &payments)?;

    Ok(web::Json(timeline))
}
