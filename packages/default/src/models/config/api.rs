use serde::Deserialize;

/// Access and error-mapping policy for the helm config endpoints.
///
/// Both flags default to `false`, which keeps the lookup endpoint public and
/// reports every lookup failure as an internal error.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ApiPolicy {
    /// Require an authenticated user for `GET /cluster/helm/config/{environment}`
    pub read_requires_auth: bool,
    /// Answer 404 instead of 500 when no record exists for the environment
    pub not_found_as_404: bool,
}
