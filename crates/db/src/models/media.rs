//! Media-file rows and the processor-status JSON embedded in them.

use crate::error::{ErrorKind, Result};
use derive_more::Display;
use serde_json::{Value, json};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// A media-file entry: the record it belongs to, its storage key, and
/// the JSON blob carrying the tile-processor state.
#[derive(Debug, Clone, FromRow)]
pub struct MediaFileRow {
    pub id: Uuid,
    pub record_id: Uuid,
    pub key: String,
    pub json: Value,
}

/// Lifecycle of the tile processor as recorded in media-file JSON.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum TileStatus {
    #[display("init")]
    Init,
    #[display("processing")]
    Processing,
    #[display("finished")]
    Finished,
    #[display("failed")]
    Failed,
}

impl FromStr for TileStatus {
    type Err = crate::error::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "init" => Ok(Self::Init),
            "processing" => Ok(Self::Processing),
            "finished" => Ok(Self::Finished),
            "failed" => Ok(Self::Failed),
            _ => exn::bail!(ErrorKind::InvalidData("processor.status")),
        }
    }
}

/// Read the processor status out of a media-file JSON blob.
///
/// Entries without a processor block (or with an unknown status string)
/// yield `None` rather than an error: plenty of media files are not
/// tile outputs at all.
pub fn status_of(json: &Value) -> Option<TileStatus> {
    json.get("processor")
        .and_then(|processor| processor.get("status"))
        .and_then(Value::as_str)
        .and_then(|status| status.parse().ok())
}

/// Flip a stuck `init` status to `finished` in place.
///
/// Returns `true` if the JSON was changed. Statuses other than `init`
/// are left alone, including `failed`.
pub fn promote_init(json: &mut Value) -> bool {
    match status_of(json) {
        Some(TileStatus::Init) => {
            if let Some(status) = json
                .get_mut("processor")
                .and_then(|processor| processor.get_mut("status"))
            {
                *status = Value::String(TileStatus::Finished.to_string());
                return true;
            }
            false
        }
        _ => false,
    }
}

/// Build the media-file JSON for a freshly registered tile output.
///
/// `page` and `total_pages` are present only for per-page outputs of a
/// multipage PDF; a plain image conversion passes `None` for both.
pub fn media_file_json(
    key: &str,
    object_version_id: Uuid,
    page: Option<u32>,
    total_pages: Option<u32>,
) -> Value {
    let mut processor = json!({ "status": TileStatus::Finished.to_string() });
    if let Some(page) = page {
        processor["pdf_page"] = json!(page);
    }
    if let Some(total) = total_pages {
        processor["pdf_total_pages"] = json!(total);
    }
    json!({
        "key": key,
        "object_version_id": object_version_id.to_string(),
        "processor": processor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::init(json!({"processor": {"status": "init"}}), Some(TileStatus::Init))]
    #[case::finished(json!({"processor": {"status": "finished"}}), Some(TileStatus::Finished))]
    #[case::unknown_string(json!({"processor": {"status": "uploading"}}), None)]
    #[case::no_processor(json!({"key": "a.pdf"}), None)]
    #[case::status_not_a_string(json!({"processor": {"status": 3}}), None)]
    fn test_status_of(#[case] json: Value, #[case] expected: Option<TileStatus>) {
        assert_eq!(status_of(&json), expected);
    }

    #[test]
    fn test_promote_init_changes_only_init() {
        let mut stuck = json!({"processor": {"status": "init"}});
        assert!(promote_init(&mut stuck));
        assert_eq!(status_of(&stuck), Some(TileStatus::Finished));

        let mut failed = json!({"processor": {"status": "failed"}});
        assert!(!promote_init(&mut failed));
        assert_eq!(status_of(&failed), Some(TileStatus::Failed));

        let mut plain = json!({"key": "document.pdf"});
        assert!(!promote_init(&mut plain));
    }

    #[test]
    fn test_media_file_json_single_image() {
        let version_id = Uuid::new_v4();
        let json = media_file_json("scan.tif.ptif", version_id, None, None);
        assert_eq!(json["key"], "scan.tif.ptif");
        assert_eq!(json["object_version_id"], version_id.to_string());
        assert_eq!(json["processor"]["status"], "finished");
        assert!(json["processor"].get("pdf_page").is_none());
    }

    #[test]
    fn test_media_file_json_pdf_page() {
        let json = media_file_json("document.pdf.page-3.ptif", Uuid::new_v4(), Some(3), Some(10));
        assert_eq!(json["processor"]["pdf_page"], 3);
        assert_eq!(json["processor"]["pdf_total_pages"], 10);
    }
}
