//! Identifier-to-directory sharding.
//!
//! The host application spreads generated tiles and uploaded files across
//! nested directories derived from their identifiers. Two layouts exist:
//!
//! - record tiles: record `216` lives under `21/6_/_/`, i.e. the first two
//!   characters, then the remainder padded with an underscore, then a bare
//!   underscore level;
//! - file-instance buckets: UUID `abcd1234-…` lives under `ab/cd/abcd1234-…`.
//!
//! Tiles have occasionally been observed one prefix *lower* than expected
//! (record `216` under `20/6_/_/`), so record lookups also return that
//! "one less" guess as a second candidate when the prefix is numeric.

use crate::error::{ErrorKind, Result};
use std::path::PathBuf;

/// The directory a record's tiles are expected in.
pub fn record_shard_dir(record_id: &str) -> Result<PathBuf> {
    validate_id(record_id)?;
    let (prefix, remainder) = record_id.split_at(record_id.len().min(2));
    Ok(PathBuf::from(prefix).join(format!("{remainder}_")).join("_"))
}

/// All directories worth checking for a record's tiles, most likely first.
pub fn record_shard_candidates(record_id: &str) -> Result<Vec<PathBuf>> {
    let primary = record_shard_dir(record_id)?;
    let mut candidates = vec![primary];
    // The "one less" prefix guess, kept from years of chasing tiles that
    // landed one shard off. Only meaningful for numeric prefixes.
    let (prefix, remainder) = record_id.split_at(record_id.len().min(2));
    if let Ok(numeric) = prefix.parse::<u32>()
        && numeric > 0
    {
        // Always two characters, even when the record id itself is shorter.
        let alternate = format!("{:02}", numeric - 1);
        candidates.push(PathBuf::from(alternate).join(format!("{remainder}_")).join("_"));
    }
    Ok(candidates)
}

/// The directory a bucket's file instances live under: `ab/cd/<uuid>`.
pub fn bucket_dir(bucket_id: &str) -> Result<PathBuf> {
    if bucket_id.len() < 4 || !bucket_id.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        exn::bail!(ErrorKind::InvalidId(bucket_id.to_string()));
    }
    Ok(PathBuf::from(&bucket_id[..2]).join(&bucket_id[2..4]).join(bucket_id))
}

fn validate_id(record_id: &str) -> Result<()> {
    let acceptable = |c: char| c.is_ascii_alphanumeric() || c == '-';
    if record_id.is_empty() || !record_id.chars().all(acceptable) {
        exn::bail!(ErrorKind::InvalidId(record_id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::Path;

    #[rstest]
    #[case("216", "21/6_/_")]
    #[case("1024", "10/24_/_")]
    #[case("9", "9/_/_")]
    #[case("ab3cd", "ab/3cd_/_")]
    fn test_record_shard_dir(#[case] id: &str, #[case] expected: &str) {
        assert_eq!(record_shard_dir(id).unwrap(), Path::new(expected));
    }

    #[test]
    fn test_candidates_include_one_less_prefix() {
        let candidates = record_shard_candidates("216").unwrap();
        assert_eq!(candidates, vec![PathBuf::from("21/6_/_"), PathBuf::from("20/6_/_")]);
    }

    #[test]
    fn test_one_less_prefix_keeps_zero_padding() {
        let candidates = record_shard_candidates("105").unwrap();
        assert_eq!(candidates[1], PathBuf::from("09/5_/_"));
    }

    #[test]
    fn test_one_less_prefix_pads_single_digit_ids() {
        // A single-digit id still gets a two-character alternate prefix.
        let candidates = record_shard_candidates("9").unwrap();
        assert_eq!(candidates, vec![PathBuf::from("9/_/_"), PathBuf::from("08/_/_")]);
    }

    #[test]
    fn test_non_numeric_prefix_has_single_candidate() {
        let candidates = record_shard_candidates("ab3cd").unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_zero_prefix_has_single_candidate() {
        // Prefix "00" can't go one lower.
        let candidates = record_shard_candidates("007").unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[rstest]
    #[case("")]
    #[case("21/6")]
    #[case("id with spaces")]
    fn test_invalid_record_ids(#[case] id: &str) {
        assert!(record_shard_dir(id).is_err());
    }

    #[test]
    fn test_bucket_dir() {
        let id = "b8902cb3-eaaf-4201-89c6-f6475085c0c3";
        assert_eq!(bucket_dir(id).unwrap(), Path::new("b8").join("90").join(id));
        assert!(bucket_dir("xyz").is_err());
        assert!(bucket_dir("nothex-nothex").is_err());
    }
}
