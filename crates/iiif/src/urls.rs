//! Image API v2 URL construction.
//!
//! Two flavors exist in the deployment: path-style URLs served by the
//! application (`<service>/full/200,/0/default.jpg`) and the IIP server's
//! FCGI query form (`…/iipsrv.fcgi?IIIF=/<file>/info.json`).

/// `info.json` for a path-style Image API service.
pub fn info_url(service: &str) -> String {
    format!("{service}/info.json")
}

/// Full-size JPEG rendition.
pub fn full_image_url(service: &str) -> String {
    format!("{service}/full/full/0/default.jpg")
}

/// Width-constrained thumbnail (`full/<w>,/0/default.jpg`).
pub fn thumbnail_url(service: &str, width: u32) -> String {
    format!("{service}/full/{width},/0/default.jpg")
}

/// A pixel region at full scale.
pub fn region_url(service: &str, x: u32, y: u32, width: u32, height: u32) -> String {
    format!("{service}/{x},{y},{width},{height}/full/0/default.jpg")
}

/// The IIP server FCGI endpoint, addressed in query form.
#[derive(Debug, Clone)]
pub struct IipEndpoint {
    url: String,
}
impl IipEndpoint {
    pub fn new(url: impl AsRef<str>) -> Self {
        Self { url: url.as_ref().trim_end_matches(['?', '/']).to_string() }
    }

    /// Raw query-form URL: `<fcgi>?IIIF=/<file>/<suffix>`.
    pub fn iiif(&self, file: &str, suffix: &str) -> String {
        format!("{}?IIIF=/{file}/{suffix}", self.url)
    }

    pub fn info(&self, file: &str) -> String {
        self.iiif(file, "info.json")
    }

    pub fn thumbnail(&self, file: &str, width: u32) -> String {
        self.iiif(file, &format!("full/{width},/0/default.jpg"))
    }

    pub fn region(&self, file: &str, x: u32, y: u32, width: u32, height: u32) -> String {
        self.iiif(file, &format!("{x},{y},{width},{height}/full/0/default.jpg"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: &str = "https://127.0.0.1:5000/api/iiif/21/6_/scan.ptif";

    #[test]
    fn test_path_style_urls() {
        assert_eq!(info_url(SERVICE), format!("{SERVICE}/info.json"));
        assert_eq!(full_image_url(SERVICE), format!("{SERVICE}/full/full/0/default.jpg"));
        assert_eq!(thumbnail_url(SERVICE, 200), format!("{SERVICE}/full/200,/0/default.jpg"));
        assert_eq!(region_url(SERVICE, 0, 0, 100, 100), format!("{SERVICE}/0,0,100,100/full/0/default.jpg"));
    }

    #[test]
    fn test_iip_query_form() {
        let iip = IipEndpoint::new("http://localhost:8080/fcgi-bin/iipsrv.fcgi");
        assert_eq!(
            iip.info("test_image.ptif"),
            "http://localhost:8080/fcgi-bin/iipsrv.fcgi?IIIF=/test_image.ptif/info.json"
        );
        assert_eq!(
            iip.thumbnail("test_image.ptif", 200),
            "http://localhost:8080/fcgi-bin/iipsrv.fcgi?IIIF=/test_image.ptif/full/200,/0/default.jpg"
        );
        assert_eq!(
            iip.region("test_image.ptif", 0, 0, 100, 100),
            "http://localhost:8080/fcgi-bin/iipsrv.fcgi?IIIF=/test_image.ptif/0,0,100,100/full/0/default.jpg"
        );
    }

    #[test]
    fn test_iip_trailing_junk_trimmed() {
        let iip = IipEndpoint::new("http://localhost:8080/fcgi-bin/iipsrv.fcgi?");
        assert!(iip.info("a.ptif").starts_with("http://localhost:8080/fcgi-bin/iipsrv.fcgi?IIIF=/"));
    }
}
