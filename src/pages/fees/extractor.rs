use super::*;

impl FromRequest for student::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            find_by_path::<Student>(&req, "student_id", "student").await
        })
    }
}

impl FromRequest for monthly_fee::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            find_by_path::<MonthlyFee>(&req, "fee_id", "monthly fee").await
        })
    }
}
