pub mod cluster_helm_config;
pub mod response;
pub mod state;
pub mod status;
