use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub version: String,
    pub environment: String,
    pub services: ServiceHealthDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceHealthDetails {
    pub embed: EmbedHealth,
    pub metadata: MetadataHealth,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmbedHealth {
    pub status: HealthStatus,
    pub providers: usize,
    pub upstream_timeout_secs: u64,
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetadataHealth {
    pub status: HealthStatus,
    pub configured: bool,
}
