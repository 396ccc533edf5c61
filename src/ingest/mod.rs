//! Staged ingestion of uploaded files into new case records.
//!
//! An upload is validated, then walks through a fixed list of named stages,
//! one per tick. On the last tick a [`CaseFactory`] builds the case and it is
//! prepended to the store. At most one job is active; submitting again
//! replaces it.

mod factory;
mod pipeline;
mod validation;

pub use factory::{CaseFactory, DemoCaseFactory, iso_timestamp, upload_url};
pub use pipeline::{IngestionPipeline, JobId, PipelineEvent, default_stages};
pub use validation::{IMAGE_EXTENSIONS, MEDICAL_EXTENSIONS, UploadFile, validate_upload};
