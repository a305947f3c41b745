use crate::auth::UserService;
use crate::models::config::ApiPolicy;
use crate::services::cluster_helm_config::ClusterHelmConfigService;
use std::sync::Arc;

/// Shared server state handed to every handler.
///
/// All fields are immutable after construction, so clones are cheap and safe to
/// use from concurrent requests.
#[derive(Clone)]
pub struct AppState {
    pub helm_config_service: Arc<dyn ClusterHelmConfigService>,
    pub user_service: Arc<dyn UserService>,
    pub policy: ApiPolicy,
}

impl AppState {
    pub fn new(
        helm_config_service: Arc<dyn ClusterHelmConfigService>,
        user_service: Arc<dyn UserService>,
        policy: ApiPolicy,
    ) -> Self {
        Self {
            helm_config_service,
            user_service,
            policy,
        }
    }
}
