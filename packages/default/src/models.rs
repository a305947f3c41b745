pub mod cluster_helm_config;
pub mod config;
pub mod users;
