use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::figure::ImageFormat;

/// Base name of the optional config file looked up in the working directory.
pub const DEFAULT_CONFIG_NAME: &str = "healthviz";
pub const ENV_PREFIX: &str = "HEALTHVIZ";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub dataset: PathBuf,
    pub output_dir: PathBuf,
    pub format: ImageFormat,
}

/// Defaults, then the config file, then `HEALTHVIZ_*` environment variables.
/// An explicit `path` must exist; the default file is optional.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let builder = Config::builder()
        .set_default("dataset", "health_data.csv")?
        .set_default("output_dir", "figures")?
        .set_default("format", "png")?;
    let builder = match path {
        Some(path) => builder.add_source(File::from(path)),
        None => builder.add_source(File::with_name(DEFAULT_CONFIG_NAME).required(false)),
    };
    let settings = builder
        .add_source(Environment::with_prefix(ENV_PREFIX))
        .build()?
        .try_deserialize()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VizError;
    use std::io::Write;

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "output_dir = \"charts\"\nformat = \"svg\"").unwrap();

        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("charts"));
        assert_eq!(settings.format, ImageFormat::Svg);
        assert_eq!(settings.dataset, PathBuf::from("health_data.csv"));
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(load_settings(Some(&missing)), Err(VizError::Config(_))));
    }

    #[test]
    fn test_bad_format_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "format = \"gif\"").unwrap();
        assert!(matches!(load_settings(Some(file.path())), Err(VizError::Config(_))));
    }
}
