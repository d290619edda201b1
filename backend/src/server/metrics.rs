//! Prometheus request metrics, switchable at startup.
//!
//! Wrapping with [`MetricsLayer::Disabled`] keeps the app type identical
//! whether or not metrics were configured.

use std::sync::Arc;

use actix_service::{
    Service, ServiceExt as _, Transform,
    boxed::{self, BoxService},
};
use actix_web::body::BoxBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use futures_util::future::LocalBoxFuture;

/// Namespace prefixed to every exported series.
const METRICS_NAMESPACE: &str = "switchgear_pm";

#[derive(Clone)]
pub(crate) enum MetricsLayer {
    Enabled(Arc<PrometheusMetrics>),
    Disabled,
}

impl From<Option<PrometheusMetrics>> for MetricsLayer {
    fn from(metrics: Option<PrometheusMetrics>) -> Self {
        metrics.map_or(Self::Disabled, |metrics| Self::Enabled(Arc::new(metrics)))
    }
}

/// Request metrics exposed on `/metrics`.
///
/// Returns `None` and logs when the registry cannot be built, so a metrics
/// fault never prevents the service from starting.
pub(crate) fn build_prometheus() -> Option<PrometheusMetrics> {
    match PrometheusMetricsBuilder::new(METRICS_NAMESPACE)
        .endpoint("/metrics")
        .build()
    {
        Ok(metrics) => Some(metrics),
        Err(error) => {
            tracing::warn!(%error, "prometheus metrics disabled");
            None
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        match self.clone() {
            Self::Enabled(metrics) => {
                let transform = Compat::new((*metrics).clone()).new_transform(service);
                Box::pin(async move { Ok(boxed::service(transform.await?)) })
            }
            Self::Disabled => Box::pin(async move {
                let svc = service.map(|res: ServiceResponse<B>| res.map_into_boxed_body());
                Ok(boxed::service(svc))
            }),
        }
    }
}
