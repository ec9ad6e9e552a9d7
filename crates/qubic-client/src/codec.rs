//! Byte layouts for the Qlance contract's procedures and functions.
//!
//! Every contract input is a single little-endian u64. Outputs are fixed-size
//! records of little-endian u64 fields followed by a status byte, padded to
//! 8-byte alignment.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("{0}")]
    Encoding(String),
    #[error("{0}")]
    Decoding(String),
}

/// State-mutating contract entry points, numbered as registered by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    PostJob,
    ClaimJob,
    SubmitWork,
    ApproveWork,
    RejectWork,
}

impl Procedure {
    pub const fn input_type(self) -> u16 {
        match self {
            Self::PostJob => 1,
            Self::ClaimJob => 2,
            Self::SubmitWork => 3,
            Self::ApproveWork => 4,
            Self::RejectWork => 5,
        }
    }

    pub const fn input_size(self) -> usize {
        8
    }

    pub const fn output_size(self) -> usize {
        match self {
            Self::PostJob => 16,
            _ => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::PostJob => "PostJob",
            Self::ClaimJob => "ClaimJob",
            Self::SubmitWork => "SubmitWork",
            Self::ApproveWork => "ApproveWork",
            Self::RejectWork => "RejectWork",
        }
    }
}

/// Read-only contract entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    GetJobsCount,
    GetJob,
}

impl Function {
    pub const fn input_type(self) -> u16 {
        match self {
            Self::GetJobsCount => 1,
            Self::GetJob => 2,
        }
    }

    pub const fn input_size(self) -> usize {
        match self {
            Self::GetJobsCount => 0,
            Self::GetJob => 8,
        }
    }

    pub const fn output_size(self) -> usize {
        match self {
            Self::GetJobsCount => 8,
            Self::GetJob => 24,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::GetJobsCount => "GetJobsCount",
            Self::GetJob => "GetJob",
        }
    }
}

/// One procedure invocation: the procedure plus its only argument
/// (a price for `PostJob`, a job id for everything else).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcedureCall {
    pub procedure: Procedure,
    pub argument: u64,
}

impl ProcedureCall {
    pub const fn post_job(price: u64) -> Self {
        Self {
            procedure: Procedure::PostJob,
            argument: price,
        }
    }

    pub const fn claim_job(job_id: u64) -> Self {
        Self {
            procedure: Procedure::ClaimJob,
            argument: job_id,
        }
    }

    pub const fn submit_work(job_id: u64) -> Self {
        Self {
            procedure: Procedure::SubmitWork,
            argument: job_id,
        }
    }

    pub const fn approve_work(job_id: u64) -> Self {
        Self {
            procedure: Procedure::ApproveWork,
            argument: job_id,
        }
    }

    pub const fn reject_work(job_id: u64) -> Self {
        Self {
            procedure: Procedure::RejectWork,
            argument: job_id,
        }
    }

    pub fn payload(&self) -> Result<Vec<u8>, CodecError> {
        let payload = encode_u64(self.argument).to_vec();
        ensure_size(self.procedure.name(), &payload, self.procedure.input_size())?;
        Ok(payload)
    }
}

pub fn encode_u64(value: u64) -> [u8; 8] {
    value.to_le_bytes()
}

pub fn encode_get_job(job_id: u64) -> Vec<u8> {
    encode_u64(job_id).to_vec()
}

pub fn encode_get_jobs_count() -> Vec<u8> {
    Vec::new()
}

/// Parses a caller-supplied decimal amount or id into the contract's u64 range.
pub fn parse_u64_amount(raw: &str) -> Result<u64, CodecError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::Encoding(format!(
            "'{}' is not an unsigned integer",
            raw
        )));
    }

    trimmed.parse::<u64>().map_err(|_| {
        CodecError::Encoding(format!("'{}' exceeds the 64-bit unsigned range", raw))
    })
}

fn ensure_size(name: &str, bytes: &[u8], expected: usize) -> Result<(), CodecError> {
    if bytes.len() != expected {
        return Err(CodecError::Encoding(format!(
            "{} payload must be {} bytes, got {}",
            name,
            expected,
            bytes.len()
        )));
    }
    Ok(())
}

fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(word)
}

fn require_len(name: &str, bytes: &[u8], expected: usize) -> Result<(), CodecError> {
    if bytes.len() < expected {
        return Err(CodecError::Decoding(format!(
            "{} output must be {} bytes, got {}",
            name,
            expected,
            bytes.len()
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostJobOutput {
    pub job_id: u64,
    pub status: u8,
}

pub fn decode_post_job_output(bytes: &[u8]) -> Result<PostJobOutput, CodecError> {
    require_len(
        Procedure::PostJob.name(),
        bytes,
        Procedure::PostJob.output_size(),
    )?;
    Ok(PostJobOutput {
        job_id: read_u64(bytes, 0),
        status: bytes[8],
    })
}

/// Status byte returned by Claim/Submit/Approve/Reject. Zero is success.
pub fn decode_status_output(procedure: Procedure, bytes: &[u8]) -> Result<u8, CodecError> {
    require_len(procedure.name(), bytes, procedure.output_size())?;
    Ok(bytes[0])
}

pub fn decode_jobs_count(bytes: &[u8]) -> Result<u64, CodecError> {
    require_len(
        Function::GetJobsCount.name(),
        bytes,
        Function::GetJobsCount.output_size(),
    )?;
    Ok(read_u64(bytes, 0))
}

/// Job status as stored by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnChainJobStatus {
    Open,
    Claimed,
    Submitted,
    Approved,
    Rejected,
    Unknown(u8),
}

impl From<u8> for OnChainJobStatus {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Open,
            1 => Self::Claimed,
            2 => Self::Submitted,
            3 => Self::Approved,
            4 => Self::Rejected,
            other => Self::Unknown(other),
        }
    }
}

impl OnChainJobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Claimed => "claimed",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Unknown(_) => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnChainJob {
    pub job_id: u64,
    pub price: u64,
    pub status: OnChainJobStatus,
}

/// The contract answers unknown ids with a zeroed record rather than an error.
pub fn decode_get_job(bytes: &[u8]) -> Result<OnChainJob, CodecError> {
    require_len(Function::GetJob.name(), bytes, Function::GetJob.output_size())?;
    Ok(OnChainJob {
        job_id: read_u64(bytes, 0),
        price: read_u64(bytes, 8),
        status: OnChainJobStatus::from(bytes[16]),
    })
}
