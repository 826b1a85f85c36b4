use std::sync::Arc;

use anyhow::Context;
use runtime::{module_config_or_default, ConfigProvider};
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::SubmissionsConfig;
use crate::domain::ports::RecordSink;
use crate::domain::service::SubmissionService;
use crate::infra::{firestore::FirestoreSink, memory::InMemorySink};

/// Submission intake: wires the configured sink into the service and
/// registers the REST surface.
pub struct Submissions {
    config: SubmissionsConfig,
    service: Arc<SubmissionService>,
}

impl Submissions {
    pub const NAME: &'static str = "submissions";

    /// Load `modules.submissions` and build the sink. With `mock` the
    /// in-memory sink is used and no credentials are read.
    pub fn init(provider: &dyn ConfigProvider, mock: bool) -> anyhow::Result<Self> {
        info!("Initializing submissions module");

        let cfg: SubmissionsConfig = module_config_or_default(provider, Self::NAME)?;
        debug!(
            collection = %cfg.collection,
            login_response = ?cfg.login.response,
            "Loaded submissions config"
        );

        let sink: Arc<dyn RecordSink> = if mock {
            info!("Using in-memory record sink (mock mode)");
            Arc::new(InMemorySink::new())
        } else {
            Arc::new(
                FirestoreSink::from_config(&cfg.firestore)
                    .context("failed to initialise the Firestore client")?,
            )
        };

        Ok(Self::with_sink(cfg, sink))
    }

    pub fn with_sink(config: SubmissionsConfig, sink: Arc<dyn RecordSink>) -> Self {
        let service = Arc::new(SubmissionService::new(sink, config.service_config()));
        Self { config, service }
    }

    pub fn config(&self) -> &SubmissionsConfig {
        &self.config
    }

    pub fn service(&self) -> Arc<SubmissionService> {
        self.service.clone()
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering submissions REST routes");
        routes::register_routes(router, self.service(), self.config.login.response)
    }
}
