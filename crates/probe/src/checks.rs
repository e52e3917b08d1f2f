//! The smoke checks themselves.
//!
//! Each check hits one endpoint of a running deployment and validates the
//! minimum a healthy instance would return. The response validators are
//! plain functions over JSON so they can be tested without a server.

use crate::client::ApiClient;
use crate::error::{ErrorKind, Result};
use crate::report::Report;
use serde_json::Value;
use tilectl_iiif::urls;

/// File extensions the tile pipeline can convert.
pub const CONVERTIBLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "pdf"];

// Small enough to be cheap against a cold tile cache, big enough to
// prove the server actually decoded the image.
const THUMBNAIL_WIDTH: u32 = 200;
const REGION_SIZE: u32 = 100;

/// Extract the keys of convertible files from a record's API JSON.
///
/// Handles both shapes the API serves: a plain list under `files` and
/// the enabled-files object with an `entries` list.
pub fn convertible_files(record: &Value) -> Vec<String> {
    let entries = match record.get("files") {
        Some(Value::Array(list)) => list.as_slice(),
        Some(Value::Object(map)) => match map.get("entries") {
            Some(Value::Array(list)) => list.as_slice(),
            _ => &[],
        },
        _ => &[],
    };
    entries
        .iter()
        .filter_map(|entry| entry.get("key").and_then(Value::as_str))
        .filter(|key| {
            let lowered = key.to_lowercase();
            CONVERTIBLE_EXTENSIONS.iter().any(|ext| lowered.ends_with(&format!(".{ext}")))
        })
        .map(str::to_string)
        .collect()
}

/// Validate a Presentation v2 manifest, returning its canvas count.
pub fn validate_manifest(manifest: &Value) -> Result<usize> {
    let context = manifest
        .get("@context")
        .and_then(Value::as_str)
        .ok_or_else(|| exn::Exn::from(ErrorKind::InvalidBody("manifest missing @context")))?;
    if !context.contains("presentation/2") {
        exn::bail!(ErrorKind::InvalidBody("manifest is not Presentation v2"));
    }
    let canvases = manifest
        .get("sequences")
        .and_then(|sequences| sequences.get(0))
        .and_then(|sequence| sequence.get("canvases"))
        .and_then(Value::as_array)
        .ok_or_else(|| exn::Exn::from(ErrorKind::InvalidBody("manifest has no canvas list")))?;
    if canvases.is_empty() {
        exn::bail!(ErrorKind::InvalidBody("manifest has zero canvases"));
    }
    Ok(canvases.len())
}

/// Pull the first canvas's image-service base URL out of a manifest.
pub fn first_image_service(manifest: &Value) -> Option<String> {
    manifest
        .get("sequences")?
        .get(0)?
        .get("canvases")?
        .get(0)?
        .get("images")?
        .get(0)?
        .get("resource")?
        .get("service")?
        .get("@id")?
        .as_str()
        .map(str::to_string)
}

/// Validate an Image API `info.json`, returning `(width, height)`.
pub fn validate_info(info: &Value) -> Result<(u64, u64)> {
    let width = info
        .get("width")
        .and_then(Value::as_u64)
        .ok_or_else(|| exn::Exn::from(ErrorKind::InvalidBody("info.json missing width")))?;
    let height = info
        .get("height")
        .and_then(Value::as_u64)
        .ok_or_else(|| exn::Exn::from(ErrorKind::InvalidBody("info.json missing height")))?;
    if width == 0 || height == 0 {
        exn::bail!(ErrorKind::InvalidBody("info.json has zero dimensions"));
    }
    Ok((width, height))
}

/// `true` for a `Content-Type` an image endpoint should serve.
pub fn is_image_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|value| value.starts_with("image/"))
}

fn record_outcome(report: &mut Report, name: &str, result: Result<String>) {
    match result {
        Ok(detail) => report.pass(name, detail),
        Err(error) => report.fail(name, error.to_string()),
    }
}

/// Run the full smoke sequence for one record against a deployment.
///
/// Checks are ordered from the outside in: the UI home page, the record
/// API, the manifest, and finally the image endpoints the manifest points
/// at. Later checks still run when earlier ones fail so the report shows
/// the whole picture.
pub async fn run_smoke(client: &ApiClient, record_id: &str) -> Report {
    let mut report = Report::default();

    record_outcome(
        &mut report,
        "home",
        match client.get_ok(client.base_url()).await {
            Ok(()) => Ok("HTTP 200".to_string()),
            Err(error) => Err(error),
        },
    );

    let record = client.get_json(&client.record_url(record_id)).await;
    match &record {
        Ok(_) => report.pass("record", format!("record {record_id} is readable")),
        Err(error) => report.fail("record", error.to_string()),
    }
    if let Ok(record) = &record {
        let files = convertible_files(record);
        if files.is_empty() {
            report.fail("files", "no convertible files attached");
        } else {
            report.pass("files", format!("{} convertible file(s): {}", files.len(), files.join(", ")));
        }
    }

    let manifest = client.get_json(&client.manifest_url(record_id)).await;
    let service = match &manifest {
        Ok(manifest) => {
            record_outcome(
                &mut report,
                "manifest",
                validate_manifest(manifest).map(|count| format!("{count} canvas(es)")),
            );
            first_image_service(manifest)
        }
        Err(error) => {
            report.fail("manifest", error.to_string());
            None
        }
    };

    if let Some(service) = service {
        image_checks(client, &mut report, &service).await;
    } else {
        report.fail("info.json", "no image service found in manifest");
    }

    report
}

async fn image_checks(client: &ApiClient, report: &mut Report, service: &str) {
    record_outcome(
        report,
        "info.json",
        match client.get_json(&urls::info_url(service)).await {
            Ok(info) => validate_info(&info).map(|(width, height)| format!("{width}x{height}")),
            Err(error) => Err(error),
        },
    );
    record_outcome(report, "thumbnail", image_outcome(client, &urls::thumbnail_url(service, THUMBNAIL_WIDTH)).await);
    record_outcome(report, "region", image_outcome(client, &urls::region_url(service, 0, 0, REGION_SIZE, REGION_SIZE)).await);
}

async fn image_outcome(client: &ApiClient, url: &str) -> Result<String> {
    let (bytes, content_type) = client.get_bytes(url).await?;
    if bytes.is_empty() {
        exn::bail!(ErrorKind::InvalidBody("empty image body"));
    }
    if !is_image_content_type(content_type.as_deref()) {
        exn::bail!(ErrorKind::InvalidBody("not an image content type"));
    }
    Ok(format!("{} bytes", bytes.len()))
}

/// Check the IIP server directly, bypassing the repository's IIIF proxy.
///
/// `file` is the tile file's path relative to the tile root, e.g.
/// `21/6_/_/document.pdf.ptif`.
pub async fn run_iip_direct(
    client: &ApiClient,
    iip: &tilectl_iiif::urls::IipEndpoint,
    file: &str,
) -> Report {
    let mut report = Report::default();
    record_outcome(
        &mut report,
        "iip info.json",
        match client.get_json(&iip.info(file)).await {
            Ok(info) => validate_info(&info).map(|(width, height)| format!("{width}x{height}")),
            Err(error) => Err(error),
        },
    );
    record_outcome(&mut report, "iip thumbnail", image_outcome(client, &iip.thumbnail(file, THUMBNAIL_WIDTH)).await);
    record_outcome(&mut report, "iip region", image_outcome(client, &iip.region(file, 0, 0, REGION_SIZE, REGION_SIZE)).await);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn sample_manifest() -> Value {
        json!({
            "@context": "http://iiif.io/api/presentation/2/context.json",
            "@type": "sc:Manifest",
            "sequences": [{
                "canvases": [{
                    "images": [{
                        "resource": {
                            "service": {
                                "@id": "https://127.0.0.1:5000/api/iiif/21/6_/_/scan.tif.ptif"
                            }
                        }
                    }]
                }]
            }]
        })
    }

    #[test]
    fn test_validate_manifest_counts_canvases() {
        assert_eq!(validate_manifest(&sample_manifest()).unwrap(), 1);
    }

    #[rstest]
    #[case::wrong_context(json!({"@context": "http://iiif.io/api/presentation/3/context.json", "sequences": []}))]
    #[case::no_sequences(json!({"@context": "http://iiif.io/api/presentation/2/context.json"}))]
    #[case::empty_canvases(json!({"@context": "http://iiif.io/api/presentation/2/context.json", "sequences": [{"canvases": []}]}))]
    fn test_validate_manifest_rejects(#[case] manifest: Value) {
        let err = validate_manifest(&manifest).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidBody(_)));
    }

    #[test]
    fn test_first_image_service() {
        let service = first_image_service(&sample_manifest()).unwrap();
        assert_eq!(service, "https://127.0.0.1:5000/api/iiif/21/6_/_/scan.tif.ptif");
        assert!(first_image_service(&json!({"sequences": []})).is_none());
    }

    #[rstest]
    #[case::plain_list(json!({"files": [{"key": "a.TIF"}, {"key": "notes.txt"}, {"key": "b.pdf"}]}), vec!["a.TIF", "b.pdf"])]
    #[case::entries_object(json!({"files": {"enabled": true, "entries": [{"key": "scan.jpeg"}]}}), vec!["scan.jpeg"])]
    #[case::missing(json!({}), Vec::<&str>::new())]
    fn test_convertible_files(#[case] record: Value, #[case] expected: Vec<&str>) {
        assert_eq!(convertible_files(&record), expected);
    }

    #[test]
    fn test_validate_info() {
        let info = json!({"@context": "http://iiif.io/api/image/2/context.json", "width": 2481, "height": 3508});
        assert_eq!(validate_info(&info).unwrap(), (2481, 3508));
        assert!(validate_info(&json!({"width": 100})).is_err());
        assert!(validate_info(&json!({"width": 0, "height": 10})).is_err());
    }

    #[rstest]
    #[case::jpeg(Some("image/jpeg"), true)]
    #[case::html(Some("text/html"), false)]
    #[case::missing(None, false)]
    fn test_is_image_content_type(#[case] content_type: Option<&str>, #[case] expected: bool) {
        assert_eq!(is_image_content_type(content_type), expected);
    }
}
