use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

pub mod models;

pub use models::{DEFAULT_CATEGORY, Job, JobStatus, NewJob};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{0}")]
    Validation(String),
    #[error("Job not found: {0}")]
    NotFound(String),
    #[error("Job cannot be {action}. Current status: {current}")]
    InvalidState {
        action: &'static str,
        current: JobStatus,
    },
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// In-memory mirror of the marketplace's jobs.
///
/// Every transition takes the write guard for its whole check-and-set, so two
/// racing callers on the same job see exactly one winner.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, Job>>,
}

impl JobRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn create(&self, new_job: NewJob) -> Result<Job> {
        let title = required(new_job.title, "title")?;
        let description = required(new_job.description, "description")?;
        let client_address = required(new_job.client_address, "clientAddress")?;
        let price_in_qubic = match new_job.price_in_qubic {
            Some(0) | None => {
                return Err(RegistryError::Validation(
                    "Missing required fields: priceInQubic must be a positive amount".to_string(),
                ));
            }
            Some(price) => price,
        };

        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            category: new_job
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            price_in_qubic,
            status: JobStatus::Open,
            client_address,
            worker_address: None,
            deadline: new_job
                .deadline
                .unwrap_or_else(|| models::default_deadline(now)),
            created_at: now,
            updated_at: now,
            contract_address: new_job.contract_address,
        };

        self.jobs.write().await.insert(job.id.clone(), job.clone());
        tracing::info!("Created job {} ({} QUBIC)", job.id, job.price_in_qubic);
        Ok(job)
    }

    pub async fn get(&self, id: &str) -> Result<Job> {
        self.jobs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Materialized snapshot; order is unspecified.
    pub async fn list(&self, status: Option<JobStatus>) -> Vec<Job> {
        self.jobs
            .read()
            .await
            .values()
            .filter(|job| status.is_none_or(|s| job.status == s))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    pub async fn claim(&self, id: &str, worker_address: &str) -> Result<Job> {
        if worker_address.trim().is_empty() {
            return Err(RegistryError::Validation(
                "Worker address is required".to_string(),
            ));
        }
        let worker = worker_address.to_string();
        self.transition(id, "claimed", &[JobStatus::Open], JobStatus::Claimed, |job| {
            job.worker_address = Some(worker);
        })
        .await
    }

    pub async fn submit(&self, id: &str) -> Result<Job> {
        self.transition(
            id,
            "submitted",
            &[JobStatus::Claimed],
            JobStatus::Submitted,
            |_| {},
        )
        .await
    }

    pub async fn approve(&self, id: &str) -> Result<Job> {
        self.transition(
            id,
            "approved",
            &[JobStatus::Submitted],
            JobStatus::Approved,
            |_| {},
        )
        .await
    }

    pub async fn reject(&self, id: &str) -> Result<Job> {
        self.transition(
            id,
            "rejected",
            &[JobStatus::Submitted],
            JobStatus::Rejected,
            |_| {},
        )
        .await
    }

    pub async fn complete(&self, id: &str) -> Result<Job> {
        self.transition(
            id,
            "completed",
            &[JobStatus::Approved, JobStatus::Rejected],
            JobStatus::Completed,
            |_| {},
        )
        .await
    }

    pub async fn cancel(&self, id: &str) -> Result<Job> {
        self.transition(
            id,
            "cancelled",
            &[JobStatus::Open],
            JobStatus::Cancelled,
            |_| {},
        )
        .await
    }

    async fn transition<F>(
        &self,
        id: &str,
        action: &'static str,
        allowed_from: &[JobStatus],
        to: JobStatus,
        apply: F,
    ) -> Result<Job>
    where
        F: FnOnce(&mut Job),
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        if !allowed_from.contains(&job.status) {
            tracing::warn!(
                "Rejected transition of job {} to {}: current status {}",
                id,
                to,
                job.status
            );
            return Err(RegistryError::InvalidState {
                action,
                current: job.status,
            });
        }

        apply(job);
        job.status = to;
        job.updated_at = Utc::now();
        tracing::info!("Job {} is now {}", id, to);
        Ok(job.clone())
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RegistryError::Validation(format!(
            "Missing required fields: {}",
            field
        ))),
    }
}
