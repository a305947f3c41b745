pub mod cluster_helm_config;
