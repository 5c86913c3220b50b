use std::ops::Deref;

use actix_web::{body, dev, http::{header::{self, ContentType}, StatusCode}, web, FromRequest, HttpRequest, HttpResponse};
use chrono::{Duration, Local};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use thiserror::Error;

use crate::entity::{sea_orm_active_enums::RoleType, staff};

/// Signs staff sessions into JWTs and reads them back.
///
/// Clients send the token as `Authorization: JWT <token>`. The token carries the staff row
/// itself (without the password digest), so handlers never hit the database to learn who
/// is calling.
pub struct Authority {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// How long an issued token stays valid
const SESSION_LENGTH: Duration = Duration::days(7);

const SCHEME: &str = "JWT ";

impl Authority {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn issue_for(&self, staff: &staff::Model) -> Result<String, AuthError> {
        let claims = Claims {
            exp: (Local::now() + SESSION_LENGTH).timestamp(),
            data: staff,
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    pub fn authorize(&self, token: impl AsRef<str>) -> Result<staff::Model, AuthError> {
        decode::<Claims<staff::Model>>(token.as_ref(), &self.decoding, &Validation::default())
            .map(|payload| payload.claims.data)
            .map_err(AuthError::InvalidToken)
    }
}

/// Digest stored in `staff.password`, salted with the username
pub fn hash_password(username: &str, password: &str) -> Vec<u8> {
    Sha256::digest(format!("{password}:{username}")).to_vec()
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims<T> {
    exp: i64,
    data: T,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid or expired token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
    #[error("unable to issue token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl actix_web::error::ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse<body::BoxBody> {
        if let AuthError::Signing(err) = self {
            tracing::error!(error = %err, "token signing failed");
        }

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidToken(_) => StatusCode::FORBIDDEN,
            AuthError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn session_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str().ok()?
        .strip_prefix(SCHEME)
}

/// Any signed-in staff member
impl FromRequest for staff::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let Some(token) = session_token(&req) else {
                return Err(actix_web::error::ErrorUnauthorized("unauthorized"))
            };

            let Some(authority) = req.app_data::<web::Data<Authority>>() else {
                tracing::error!("`Authority` is not attached to the app");
                return Err(actix_web::error::ErrorInternalServerError("internal server error"))
            };

            Ok(authority.authorize(token)?)
        })
    }
}

/// A signed-in staff member with the admin role, required for anything that moves money
pub struct Admin(pub staff::Model);

impl Deref for Admin {
    type Target = staff::Model;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for Admin {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let staff = staff::Model::from_request(&req, &mut dev::Payload::None).await?;

            match staff.role {
                RoleType::Admin => Ok(Self(staff)),
                RoleType::Staff => Err(actix_web::error::ErrorForbidden("forbidden")),
            }
        })
    }
}

#[cfg(test)]
pub(crate) fn staff_fixture(role: RoleType) -> staff::Model {
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    staff::Model {
        id: Uuid::new_v4(),
        created_at: Local::now().into(),
        updated_at: Local::now().into(),
        username: "bob".to_string(),
        password: Vec::new(),
        role,
        full_name: "Bob Mathew".to_string(),
        designation: "Mathematics Teacher".to_string(),
        base_salary: dec!(30000),
    }
}

#[cfg(test)]
pub(crate) fn bearer(secret: &[u8], staff: &staff::Model) -> (&'static str, String) {
    let token = Authority::new(secret).issue_for(staff).unwrap();

    ("Authorization", format!("JWT {token}"))
}

#[cfg(test)]
mod tests {
    use actix_web::{body::MessageBody, get, test, web, App, Responder};

    use super::*;

    #[actix_web::test]
    async fn test_authority() {
        let authority = Authority::new(b"secret");

        let staff = staff_fixture(RoleType::Staff);

        let token = authority.issue_for(&staff).unwrap();

        let authorized_staff = authority.authorize(token).expect("Unable to authorize staff from token");
        assert_eq!(staff, authorized_staff);
    }

    #[::core::prelude::v1::test]
    fn test_hash_password() {
        assert_eq!(hash_password("bob", "hunter2"), Sha256::digest("hunter2:bob").to_vec());
        assert_ne!(hash_password("bob", "hunter2"), hash_password("alice", "hunter2"));
    }

    #[actix_web::test]
    async fn test_extractor() {
        let secret = b"secret";

        #[get("/")]
        async fn test_handler(staff: staff::Model) -> impl Responder {
            staff.id.to_string()
        }

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .service(test_handler)
        ).await;

        {
            let forbidden_req = test::TestRequest::default()
                .uri("/")
                .insert_header(("Authorization", "JWT wrong"))
                .to_request();

            let response = test::call_service(&app, forbidden_req).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }

        {
            let unauthorized_req = test::TestRequest::default()
                .uri("/")
                .to_request();

            let response = test::call_service(&app, unauthorized_req).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        {
            let (_, value) = bearer(secret, &staff_fixture(RoleType::Staff));
            let other_scheme_req = test::TestRequest::default()
                .uri("/")
                .insert_header(("Authorization", value.replacen("JWT", "Bearer", 1)))
                .to_request();

            let response = test::call_service(&app, other_scheme_req).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        {
            let staff = staff_fixture(RoleType::Staff);

            let authorized_req = test::TestRequest::default()
                .insert_header(bearer(secret, &staff))
                .to_request();

            let response = test::call_service(&app, authorized_req).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.into_body().try_into_bytes().unwrap(), staff.id.to_string().as_bytes());
        }
    }

    #[actix_web::test]
    async fn test_admin_extractor() {
        let secret = b"secret";

        #[get("/")]
        async fn test_handler(staff: Admin) -> impl Responder {
            assert_eq!(staff.role, RoleType::Admin);

            ""
        }

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .service(test_handler)
        ).await;

        {
            let admin = staff_fixture(RoleType::Admin);

            let success_req = test::TestRequest::default()
                .insert_header(bearer(secret, &admin))
                .to_request();

            let response = test::call_service(&app, success_req).await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        {
            let teacher = staff_fixture(RoleType::Staff);

            let forbidden_req = test::TestRequest::default()
                .insert_header(bearer(secret, &teacher))
                .to_request();

            let response = test::call_service(&app, forbidden_req).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
    }
}
