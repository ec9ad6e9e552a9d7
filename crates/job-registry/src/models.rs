use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_DEADLINE_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Open,
    Claimed,
    Submitted,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Claimed => "claimed",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Every state past `open` except `cancelled` has a worker attached.
    pub const fn has_worker(&self) -> bool {
        !matches!(self, Self::Open | Self::Cancelled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "claimed" => Ok(Self::Claimed),
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown job status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price_in_qubic: u64,
    pub status: JobStatus,
    pub client_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_address: Option<String>,
    pub deadline: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
}

/// Caller-supplied fields for a new job. Everything is optional here so that
/// missing fields surface as validation errors rather than parse failures.
#[derive(Debug, Clone, Default)]
pub struct NewJob {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_in_qubic: Option<u64>,
    pub client_address: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub contract_address: Option<String>,
}

pub(crate) fn default_deadline(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(DEFAULT_DEADLINE_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            JobStatus::Open,
            JobStatus::Claimed,
            JobStatus::Submitted,
            JobStatus::Approved,
            JobStatus::Rejected,
            JobStatus::Completed,
            JobStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
        assert!("archived".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_job_serializes_camel_case() {
        let now = Utc::now();
        let job = Job {
            id: "job-1".to_string(),
            title: "Logo".to_string(),
            description: "Design a logo".to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            price_in_qubic: 1000,
            status: JobStatus::Open,
            client_address: "A".repeat(60),
            worker_address: None,
            deadline: default_deadline(now),
            created_at: now,
            updated_at: now,
            contract_address: None,
        };

        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["priceInQubic"], 1000);
        assert_eq!(value["status"], "open");
        assert!(value.get("workerAddress").is_none());
        assert!(value.get("clientAddress").is_some());
    }
}
