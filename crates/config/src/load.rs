use crate::error::{ErrorKind, Result};
use crate::model::Config;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml, Yaml};
use std::path::{Path, PathBuf};

/// Filename looked for in the working directory and the platform config dir.
pub const DEFAULT_FILE: &str = "tilectl.toml";

/// Load the effective configuration.
///
/// Sources are layered lowest-to-highest priority: built-in defaults, then
/// the first discovered config file (or `explicit` when given, which must
/// exist), then `TILECTL_*` environment variables. Nested keys use a double
/// underscore, e.g. `TILECTL_TILES__TILE_WIDTH=512`.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    if let Some(path) = explicit {
        if !path.exists() {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        figment = merge_file(figment, path)?;
    } else if let Some(found) = candidates().into_iter().find(|c| c.exists()) {
        tracing::debug!(path = %found.display(), "Using discovered configuration file");
        figment = merge_file(figment, &found)?;
    }
    let config: Config =
        figment.merge(Env::prefixed("TILECTL_").split("__")).extract().or_raise(|| ErrorKind::Load)?;
    config.validate()?;
    Ok(config)
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(figment.merge(Toml::file(path))),
        Some("yaml") | Some("yml") => Ok(figment.merge(Yaml::file(path))),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    }
}

fn candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(DEFAULT_FILE)];
    if let Some(dirs) = directories::ProjectDirs::from("", "", "tilectl") {
        paths.push(dirs.config_dir().join(DEFAULT_FILE));
        paths.push(dirs.config_dir().join("tilectl.yaml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TileCompression;

    #[test]
    fn test_load_defaults_without_file() {
        figment::Jail::expect_with(|_jail| {
            let config = load(None).unwrap();
            assert_eq!(config.api.base_url, "https://127.0.0.1:5000");
            assert_eq!(config.tiles.tile_width, 256);
            assert_eq!(config.tiles.compression, TileCompression::Deflate);
            Ok(())
        });
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "tilectl.toml",
                r#"
                    [tiles]
                    tile_width = 512
                    tile_height = 512
                    compression = "jpeg"

                    [instance]
                    path = "/srv/invenio/instance"
                "#,
            )?;
            let config = load(None).unwrap();
            assert_eq!(config.tiles.tile_width, 512);
            assert_eq!(config.tiles.compression, TileCompression::Jpeg);
            assert_eq!(config.instance.path, PathBuf::from("/srv/invenio/instance"));
            // Untouched sections keep their defaults.
            assert_eq!(config.tiles.dpi, 300);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("tilectl.toml", "[tiles]\ntile_width = 512\n")?;
            jail.set_env("TILECTL_TILES__TILE_WIDTH", "1024");
            jail.set_env("TILECTL_API__TIMEOUT_SECS", "30");
            let config = load(None).unwrap();
            assert_eq!(config.tiles.tile_width, 1024);
            assert_eq!(config.api.timeout_secs, 30);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_must_exist() {
        figment::Jail::expect_with(|_jail| {
            let err = load(Some(Path::new("missing.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::NotFound(_)));
            Ok(())
        });
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("tilectl.ini", "[api]")?;
            let err = load(Some(Path::new("tilectl.ini"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TILECTL_TILES__DPI", "9999");
            let err = load(None).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid(_)));
            Ok(())
        });
    }
}
