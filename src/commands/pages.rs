//! `tilectl pages` — convert a multipage PDF into a cover pyramid plus
//! one pyramid per page, with a JSON page listing alongside.
//!
//! Naming follows what the rest of the pipeline expects: the cover is
//! `<pdf>.ptif` and page N is `<pdf>.page-N.ptif` (one-indexed).

use crate::commands::convert::is_pdf;
use crate::error::{ErrorKind, Result};
use clap::Args;
use exn::{OptionExt, ResultExt};
use serde_json::json;
use std::path::{Path, PathBuf};
use tilectl_config::Config;
use tilectl_vips::{Converter, Pdfinfo, PtifOutput, pages_to_convert};

#[derive(Debug, Args)]
pub struct PagesArgs {
    /// Source PDF.
    pub input: PathBuf,
    /// Directory for the generated files (default: the PDF's directory).
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,
}

/// Filename for page `page` of `pdf_name`, or the cover for `None`.
pub fn page_filename(pdf_name: &str, page: Option<u32>) -> String {
    match page {
        Some(page) => format!("{pdf_name}.page-{page}.ptif"),
        None => format!("{pdf_name}.ptif"),
    }
}

pub async fn run(config: &Config, args: PagesArgs) -> Result<()> {
    if !is_pdf(&args.input) {
        exn::bail!(ErrorKind::Usage("pages requires a PDF input"));
    }
    let pdf_name = args
        .input
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_raise(|| ErrorKind::Usage("input path has no usable filename"))?
        .to_string();
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => args.input.parent().unwrap_or(Path::new(".")).to_path_buf(),
    };

    let converter = Converter::discover().or_raise(|| ErrorKind::Tiles)?;
    let pdfinfo = Pdfinfo::discover().or_raise(|| ErrorKind::Tiles)?;
    let total = pdfinfo.page_count(&args.input).or_raise(|| ErrorKind::Tiles)?;
    let converting = pages_to_convert(total, config.tiles.max_pages);
    if converting < total {
        tracing::warn!(total, converting, "Large PDF, capping converted pages");
    }

    let params = config.tiles.params();
    let mut entries = Vec::new();
    let mut failed = 0usize;

    // Cover first, then each page. A bad page shouldn't kill the rest.
    let mut jobs: Vec<(Option<u32>, u32)> = vec![(None, 1)];
    jobs.extend((1..=converting).map(|page| (Some(page), page)));
    for (label, page) in jobs {
        let filename = page_filename(&pdf_name, label);
        let output = output_dir.join(&filename);
        match converter.pdf_page_to_ptif(&args.input, page, &output, &params) {
            Ok(ptif) => {
                println!("{} ({}x{})", ptif.path.display(), ptif.width, ptif.height);
                entries.push(page_entry(&filename, label, &ptif));
            }
            Err(error) => {
                tracing::error!(page, %error, "Page conversion failed");
                failed += 1;
            }
        }
    }

    let listing = json!({
        "source": pdf_name,
        "total_pages": total,
        "converted_pages": converting,
        "files": entries,
    });
    let listing_path = output_dir.join(format!("{pdf_name}.pages.json"));
    let body = serde_json::to_vec_pretty(&listing).or_raise(|| ErrorKind::Serialize)?;
    tokio::fs::write(&listing_path, body).await.or_raise(|| ErrorKind::Io)?;
    println!("{}", listing_path.display());

    if failed > 0 {
        exn::bail!(ErrorKind::Partial(failed, converting as usize + 1));
    }
    Ok(())
}

fn page_entry(filename: &str, page: Option<u32>, ptif: &PtifOutput) -> serde_json::Value {
    json!({
        "key": filename,
        "page": page,
        "width": ptif.width,
        "height": ptif.height,
        "size": ptif.size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_filename() {
        assert_eq!(page_filename("doc.pdf", None), "doc.pdf.ptif");
        assert_eq!(page_filename("doc.pdf", Some(3)), "doc.pdf.page-3.ptif");
    }
}
