//! Dashboard page.

use actix_web::web::{get, resource, Data};
use actix_web::{HttpResponse, Resource};

use crate::error::Result;
use crate::service::Services;

/// `GET /`: summary counts and chart series.
pub fn configure_routes() -> Resource {
    resource("/").route(get().to(index))
}

async fn index(services: Data<Services>) -> Result<HttpResponse> {
    let view = services.dashboard.view().await?;
    Ok(HttpResponse::Ok().json(view))
}
