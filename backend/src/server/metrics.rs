//! Wraps the optional Prometheus exporter behind one erased middleware type.
//!
//! The server factory closure must return one app type whether or not an
//! exporter was configured, so this transform erases the difference by
//! boxing the wrapped service either way.

use actix_service::boxed::{self, BoxService};
use actix_service::{Service, ServiceExt as _, Transform};
use actix_web::body::BoxBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::PrometheusMetrics;
use futures_util::future::LocalBoxFuture;
use std::sync::Arc;

/// One erased service type for both wired and disabled exporters.
type ErasedService = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;

#[derive(Clone, Default)]
pub(crate) struct MetricsLayer {
    exporter: Option<Arc<PrometheusMetrics>>,
}

impl MetricsLayer {
    #[must_use]
    pub(crate) fn new(exporter: Option<PrometheusMetrics>) -> Self {
        Self {
            exporter: exporter.map(Arc::new),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = ErasedService;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let Some(exporter) = self.exporter.clone() else {
            return Box::pin(async move {
                Ok(boxed::service(
                    service.map(ServiceResponse::map_into_boxed_body),
                ))
            });
        };
        // Compat maps the exporter middleware's body type onto BoxBody.
        let wired = Compat::new((*exporter).clone()).new_transform(service);
        Box::pin(async move { Ok(boxed::service(wired.await?)) })
    }
}
