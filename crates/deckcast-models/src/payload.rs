//! Typed job payloads.
//!
//! The datastore persists a free-form JSON payload per job; this module
//! decodes it into one concrete shape per stage so handlers never poke at
//! loose JSON.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::job::JobType;
use crate::slide::SlideId;

/// Payload decoding errors.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("unknown job type: {0}")]
    UnknownJobType(String),

    #[error("malformed {job_type} payload: {source}")]
    Malformed {
        job_type: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Parameters for an `extract_structure` job.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExtractStructurePayload {
    /// Delete all existing slides before inserting the newly parsed set
    #[serde(default)]
    pub reparse: bool,
}

/// Parameters for a `synthesize_narration` job.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SynthesizeNarrationPayload {
    /// Restrict processing to these slides; empty means all slides
    #[serde(default)]
    pub slide_ids: Vec<SlideId>,

    /// Re-synthesize slides that already have audio
    #[serde(default)]
    pub regenerate: bool,
}

/// Parameters for an `assemble_video` job.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AssembleVideoPayload {}

/// A job payload decoded for its stage.
#[derive(Debug, Clone)]
pub enum JobPayload {
    ExtractStructure(ExtractStructurePayload),
    SynthesizeNarration(SynthesizeNarrationPayload),
    AssembleVideo(AssembleVideoPayload),
}

impl JobPayload {
    /// Decode `value` for `job_type`.
    ///
    /// JSON `null` decodes to the stage's defaults (jobs are routinely
    /// enqueued without parameters); any other shape mismatch is an error.
    pub fn decode(job_type: &JobType, value: &serde_json::Value) -> Result<Self, PayloadError> {
        fn parse<T: Default + serde::de::DeserializeOwned>(
            job_type: &'static str,
            value: &serde_json::Value,
        ) -> Result<T, PayloadError> {
            if value.is_null() {
                return Ok(T::default());
            }
            serde_json::from_value(value.clone())
                .map_err(|source| PayloadError::Malformed { job_type, source })
        }

        match job_type {
            JobType::ExtractStructure => {
                parse("extract_structure", value).map(JobPayload::ExtractStructure)
            }
            JobType::SynthesizeNarration => {
                parse("synthesize_narration", value).map(JobPayload::SynthesizeNarration)
            }
            JobType::AssembleVideo => parse("assemble_video", value).map(JobPayload::AssembleVideo),
            JobType::Unknown(s) => Err(PayloadError::UnknownJobType(s.clone())),
        }
    }
}
