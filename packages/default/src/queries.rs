pub mod cluster_helm_config;
pub mod users;
