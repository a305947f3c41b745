use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use thiserror::Error;

const MAX_ENVIRONMENT_LEN: usize = 250;

/// A stored Helm configuration for one deployment environment.
///
/// `environment` is unique across all records; saving a record for an
/// environment that already exists updates it in place.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterHelmConfig {
    pub id: i32,
    pub environment: String,
    pub cluster_id: Option<i32>,
    pub config: Option<String>,
    pub tiller_url: Option<String>,
    pub tiller_cert: Option<String>,
    pub tiller_key: Option<String>,
    pub active: bool,
    pub created_by: i32,
    pub updated_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClusterHelmConfig {
    /// Build a fresh record from a validated request.
    pub fn from_request(id: i32, request: ClusterHelmConfigRequest, user_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id,
            environment: request.environment,
            cluster_id: request.cluster_id,
            config: request.config,
            tiller_url: request.tiller_url,
            tiller_cert: request.tiller_cert,
            tiller_key: request.tiller_key,
            active: request.active,
            created_by: user_id,
            updated_by: user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the mutable fields, keeping identity and creation audit data.
    pub fn apply(&mut self, request: ClusterHelmConfigRequest, user_id: i32) {
        self.cluster_id = request.cluster_id;
        self.config = request.config;
        self.tiller_url = request.tiller_url;
        self.tiller_cert = request.tiller_cert;
        self.tiller_key = request.tiller_key;
        self.active = request.active;
        self.updated_by = user_id;
        self.updated_at = Utc::now();
    }
}

/// Body accepted by the save endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterHelmConfigRequest {
    pub environment: String,
    #[serde(default)]
    pub cluster_id: Option<i32>,
    #[serde(default)]
    pub config: Option<String>,
    #[serde(default)]
    pub tiller_url: Option<String>,
    #[serde(default)]
    pub tiller_cert: Option<String>,
    #[serde(default)]
    pub tiller_key: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl ClusterHelmConfigRequest {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            cluster_id: None,
            config: None,
            tiller_url: None,
            tiller_cert: None,
            tiller_key: None,
            active: true,
        }
    }

    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = Some(config.into());
        self
    }

    pub fn with_cluster_id(mut self, cluster_id: i32) -> Self {
        self.cluster_id = Some(cluster_id);
        self
    }

    /// Trims the environment name and checks it against the naming rules.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        let trimmed = self.environment.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyEnvironment);
        }
        if trimmed.len() > MAX_ENVIRONMENT_LEN {
            return Err(ValidationError::EnvironmentTooLong(trimmed.len()));
        }
        if let Some(c) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(ValidationError::InvalidEnvironmentChar(c));
        }
        if let Some(cluster_id) = self.cluster_id {
            if cluster_id <= 0 {
                return Err(ValidationError::InvalidClusterId(cluster_id));
            }
        }
        self.environment = trimmed.to_string();
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("environment must not be empty")]
    EmptyEnvironment,
    #[error("environment must be at most 250 characters, got {0}")]
    EnvironmentTooLong(usize),
    #[error("environment contains invalid character {0:?}")]
    InvalidEnvironmentChar(char),
    #[error("clusterId must be positive, got {0}")]
    InvalidClusterId(i32),
}

impl fmt::Display for ClusterHelmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClusterHelmConfig {{ id: {}, environment: {}, cluster_id: {:?}, active: {} }}",
            self.id, self.environment, self.cluster_id, self.active
        )
    }
}
