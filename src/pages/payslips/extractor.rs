use super::*;

impl FromRequest for payslip::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            find_by_path::<Payslip>(&req, "payslip_id", "payslip").await
        })
    }
}

/// A payslip the caller may look at: their own, or any when they are an admin
pub(super) struct VisiblePayslip(pub(super) payslip::Model);

impl Deref for VisiblePayslip {
    type Target = payslip::Model;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for VisiblePayslip {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let viewer = staff::Model::from_request(&req, &mut dev::Payload::None).await?;
            let payslip = payslip::Model::from_request(&req, &mut dev::Payload::None).await?;

            if viewer.role != RoleType::Admin && viewer.id != payslip.staff_id {
                return Err(actix_web::error::ErrorForbidden("forbidden"));
            }

            Ok(Self(payslip))
        })
    }
}
