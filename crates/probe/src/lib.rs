//! HTTP smoke checks against a running repository and its IIP image
//! server, plus file download for the batch-conversion pipeline.

pub mod error;

mod checks;
mod client;
mod report;

pub use checks::{
    CONVERTIBLE_EXTENSIONS, convertible_files, first_image_service, is_image_content_type,
    run_iip_direct, run_smoke, validate_info, validate_manifest,
};
pub use client::{ApiClient, ClientOptions};
pub use report::{CheckOutcome, Report};
