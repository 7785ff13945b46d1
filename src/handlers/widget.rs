// src/handlers/widget.rs
use actix_web::{ web, HttpRequest, HttpResponse };
use serde::Serialize;

use crate::handlers::status::{ status_view, StatusView };
use crate::models::widget::{ StaticView, WidgetParams };
use crate::service::StatusService;
use crate::utils::{ check_rate_limit, ClientRateLimiter, RequestError };

#[derive(Debug, Serialize)]
#[serde(tag = "render", rename_all = "lowercase")]
pub enum WidgetView {
    Static(StaticView),
    Live {
        name: String,
        header: bool,
        server: StatusView,
    },
}

pub async fn get_widget(
    req: HttpRequest,
    params: web::Query<WidgetParams>,
    service: web::Data<StatusService>,
    rate_limiter: web::Data<ClientRateLimiter>
) -> Result<HttpResponse, RequestError> {
    let params = params.into_inner();

    // Static widgets never reach the network, so they skip the limiter.
    if params.static_mode {
        return Ok(HttpResponse::Ok().json(WidgetView::Static(params.static_view()?)));
    }

    check_rate_limit(&req, &rate_limiter)?;
    if params.port == 0 {
        return Err(RequestError::InvalidPort(params.port.to_string()));
    }
    let server = status_view(&service, params.server.clone(), params.port).await;
    Ok(HttpResponse::Ok().json(WidgetView::Live {
        name: params.name,
        header: params.header,
        server,
    }))
}
