use std::str::FromStr;

use actix_web::{web, HttpRequest};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, PrimaryKeyTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{consts::MAX_AMOUNT, entity::sea_orm_active_enums::PaymentMethod, ledger::LedgerError};

mod auth;
mod fees;
mod ledger;
mod payslips;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(web::scope("/auth")
            .configure(auth::config))
        .service(web::scope("/ledger")
            .configure(ledger::config))
        .service(web::scope("/payslips")
            .configure(payslips::config))
        .service(web::scope("/students")
            .configure(fees::student_config))
        .service(web::scope("/fees")
            .configure(fees::fee_config));
}

/// A payment as entered at the counter, for either a payslip or a monthly fee
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecordPayment {
    pub(crate) amount: Decimal,
    /// Defaults to today
    pub(crate) paid_on: Option<NaiveDate>,
    pub(crate) method: PaymentMethod,
    pub(crate) note: Option<String>,
}

impl RecordPayment {
    pub(crate) fn validate(&self) -> Result<(), LedgerError> {
        if self.amount <= Decimal::ZERO {
            return Err(LedgerError::invalid("amount", "must be greater than zero"));
        }

        if self.amount > MAX_AMOUNT {
            return Err(LedgerError::invalid("amount", format!("must be at most {MAX_AMOUNT}")));
        }

        Ok(())
    }

    pub(crate) fn paid_on(&self) -> NaiveDate {
        self.paid_on.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Loads the row whose id sits in the `param` path segment
async fn find_by_path<E>(req: &HttpRequest, param: &str, name: &'static str) -> Result<E::Model, actix_web::Error>
where
    E: EntityTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    let Some(id) = req.match_info().get(param) else {
        tracing::error!(param, "extractor used outside of its path");
        return Err(actix_web::error::ErrorInternalServerError("internal server error"))
    };

    let Ok(id) = Uuid::from_str(id) else {
        return Err(actix_web::error::ErrorBadRequest(format!("invalid `{param}`")))
    };

    let Some(db) = req.app_data::<web::Data<DatabaseConnection>>() else {
        tracing::error!("`DatabaseConnection` is not attached to the app");
        return Err(actix_web::error::ErrorInternalServerError("internal server error"))
    };

    let Some(model) = E::find_by_id(id)
        .one(db.as_ref()).await.map_err(crate::error::ApiError::from)?
    else {
        return Err(actix_web::error::ErrorNotFound(format!("{name} not found")))
    };

    Ok(model)
}
