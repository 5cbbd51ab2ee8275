//! Pipeline orchestration for scanned consultation-form intake.
//!
//! Sequences rasterized pages through preprocessing, extraction, parsing,
//! and validation, producing one `(record, validation)` pair per logical
//! form. Pages run in parallel; failures are contained at the page boundary
//! and surface as warnings on the owning form, never as a batch abort.

pub mod cancel;
pub mod config;
pub mod debug_store;
pub mod error;
mod grouping;
pub mod pdf;
pub mod pipeline;
pub mod submission;

pub use cancel::CancelFlag;
pub use config::IntakeConfig;
pub use debug_store::DebugStore;
pub use error::PipelineError;
pub use pdf::inspect_pdf;
pub use pipeline::{IntakePipeline, RawPage};
pub use submission::{build_submission, SubmissionDefaults};
