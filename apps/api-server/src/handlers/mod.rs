//! HTTP handlers and route configuration.

mod health;
mod usage;

use actix_web::web;
use quota_core::domain::UsageStatus;
use quota_shared::dto::UsageView;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/usage")
                    .route("/today", web::get().to(usage::today))
                    .route("/{kind}", web::get().to(usage::by_kind))
                    .route("/{kind}/attempts", web::post().to(usage::record))
                    .route("/{kind}/consume", web::post().to(usage::consume)),
            ),
    );
}

/// Wire shape of a usage status (`-1` for unlimited).
pub fn usage_view(status: &UsageStatus) -> UsageView {
    UsageView {
        used: status.used,
        limit: status.limit.to_wire(),
        remaining: status.remaining.to_wire(),
        blocked: status.blocked,
    }
}
