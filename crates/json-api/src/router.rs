//! App Router

use salvo::{
    Router,
    cors::{AllowOrigin, Cors, CorsHandler},
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue},
    },
};
use tracing::warn;

use crate::{
    admin, codes, healthcheck, ledger, observability::metrics_handler, redemptions, referrals,
};

/// Public storefront routes plus the bearer-protected admin surface.
pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(metrics_handler))
        .push(Router::with_path("send-code").post(redemptions::send::handler))
        .push(Router::with_path("referrals/{email}").get(referrals::get::handler))
        .push(
            Router::with_path("admin")
                .push(Router::with_path("login").post(admin::handlers::login::handler))
                .push(
                    Router::new()
                        .hoop(admin::middleware::handler)
                        .push(Router::with_path("logout").post(admin::handlers::logout::handler))
                        .push(Router::with_path("logs").get(ledger::index::handler))
                        .push(
                            Router::with_path("codes")
                                .get(codes::index::handler)
                                .post(codes::upload::handler)
                                .delete(codes::delete::handler),
                        )
                        .push(Router::with_path("upload-codes").post(codes::upload::handler)),
                ),
        )
}

/// CORS for the configured storefront origins; `None` when no origin is configured.
pub(crate) fn cors_handler(origins: &[String]) -> Option<CorsHandler> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(source) => {
                warn!(origin, "ignoring invalid CORS origin: {source}");

                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        Cors::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(vec![
                Method::GET,
                Method::POST,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(vec![AUTHORIZATION, CONTENT_TYPE])
            .allow_credentials(true)
            .into_handler(),
    )
}
