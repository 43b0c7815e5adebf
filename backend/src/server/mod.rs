//! Assembles the HTTP server: session cookies, tracing, routes, docs.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::ServerConfig;

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::time::Duration;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::inbound::http::accounts::{login, login_form, logout, register, registration_form};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::listings::{
    create, delete_listing, edit_form, index, new_form, root, show, update,
};
use backend::inbound::http::session_config::SessionSettings;
use backend::inbound::http::state::HttpState;
use backend::middleware::Trace;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Sessions survive a week of browser restarts before re-login.
const SESSION_TTL: Duration = Duration::days(7);

/// Page and health routes.
///
/// `/furniture/new` must register before `/furniture/{id}`.
fn page_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(registration_form)
        .service(register)
        .service(login_form)
        .service(login)
        .service(logout)
        .service(root)
        .service(index)
        .service(new_form)
        .service(create)
        .service(show)
        .service(edit_form)
        .service(update)
        .service(delete_listing)
        .service(ready)
        .service(live);
}

fn build_app(
    health: web::Data<HealthState>,
    http: web::Data<HttpState>,
    session: SessionSettings,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let SessionSettings {
        key,
        cookie_secure,
        same_site,
    } = session;

    let cookies = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(String::from("session"))
        .cookie_path(String::from("/"))
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(PersistentSession::default().session_ttl(SESSION_TTL))
        .build();

    let app = App::new()
        .app_data(health)
        .app_data(http)
        .wrap(cookies)
        .wrap(Trace)
        .configure(page_routes);

    #[cfg(debug_assertions)]
    let app = {
        let docs = SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi());
        app.service(docs)
    };

    app
}

/// Construct an Actix HTTP server from the given configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        session,
        bind_addr,
        db_pool,
        upload_dir,
        #[cfg(feature = "metrics")]
        prometheus,
    } = config;

    let http_state = build_http_state(db_pool.as_ref(), &upload_dir);
    #[cfg(feature = "metrics")]
    let metrics = MetricsLayer::new(prometheus);

    let worker_health = health.clone();
    let server = HttpServer::new(move || {
        let app = build_app(
            worker_health.clone(),
            http_state.clone(),
            session.clone(),
        );

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health.mark_ready();
    Ok(server)
}
