use axum::http::HeaderMap;
use std::sync::Arc;

use crate::modules::energy_graph::core::errors::GatewayError;
use crate::shared::infrastructure::graph_store::{DriverFactory, GraphDriver};
use crate::shell::auth::credentials_from_headers;
use crate::shell::config::ErrorFormat;
use crate::shell::context::RequestContext;
use crate::shell::graphql::AppSchema;

#[derive(Clone)]
pub enum Drivers {
    /// Fixed credentials: one driver for the life of the process.
    Shared(Arc<dyn GraphDriver>),
    /// Bearer mode: a driver per request, connected with the caller's credentials.
    PerRequest(Arc<dyn DriverFactory>),
}

#[derive(Clone)]
pub struct AppState {
    pub schema: AppSchema,
    pub drivers: Drivers,
    pub error_format: ErrorFormat,
}

impl AppState {
    pub async fn open_context(&self, headers: &HeaderMap) -> Result<RequestContext, GatewayError> {
        match &self.drivers {
            Drivers::Shared(driver) => {
                let session = driver.open_session().await?;
                Ok(RequestContext::new(session, None))
            }
            Drivers::PerRequest(factory) => {
                let credentials = credentials_from_headers(headers);
                let driver = factory.connect(&credentials).await?;
                match driver.open_session().await {
                    Ok(session) => Ok(RequestContext::new(session, Some(driver))),
                    Err(e) => {
                        if let Err(close_error) = driver.close().await {
                            tracing::debug!(error = %close_error, "closing driver failed");
                        }
                        Err(e.into())
                    }
                }
            }
        }
    }
}
