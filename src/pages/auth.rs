use actix_web::{get, post, web, Responder};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::{auth::{hash_password, Authority}, entity::{prelude::*, staff}, error::ApiError};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(login)
        .service(whoami);
}

#[derive(Debug, Serialize, Deserialize)]
struct Login {
    username: String,
    password: String,
}

#[post("/login")]
async fn login(db: web::Data<DatabaseConnection>, authority: web::Data<Authority>, credentials: web::Json<Login>) -> actix_web::Result<impl Responder> {
    let hashed_password = hash_password(&credentials.username, &credentials.password);

    let Some(staff) = Staff::find()
        .filter(staff::Column::Username.eq(&credentials.username))
        .filter(staff::Column::Password.eq(hashed_password))
        .one(db.get_ref()).await.map_err(ApiError::from)?
    else {
        tracing::info!(username = %credentials.username, "rejected login");
        return Err(actix_web::error::ErrorForbidden("invalid credentials"));
    };

    Ok(authority.issue_for(&staff)?)
}

#[get("")]
async fn whoami(staff: staff::Model) -> impl Responder {
    web::Json(staff)
}
