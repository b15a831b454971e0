use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::core::SurveydashConfig;
use crate::errors::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".surveydash.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Starter configuration written by `surveydash init`.
pub const DEFAULT_CONFIG: &str = r#"# surveydash configuration

[source]
page_size = 50
batch_size = 1000

[geocode]
# Lookups are debounced; values below 300 ms / 3 characters are raised.
debounce_ms = 300
min_query_len = 3

[export]
page_height = 1120.0
margin = 40.0
gap = 16.0

[display]
decimals = 1
compact = false

# Per-variant filter whitelists. Omitted variants use built-in profiles.
[variants.formal]

[variants.public]
allowed_filters = ["AGE", "GENDER", "district", "address"]

[variants.merged]
allowed_filters = ["AGE", "GENDER", "district", "address"]
"#;

/// Pure function to read config file contents
pub(crate) fn read_config_file(path: &Path) -> std::result::Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Pure function to parse and validate config from TOML string
pub fn parse_and_validate_config(contents: &str) -> Result<SurveydashConfig> {
    let config = toml::from_str::<SurveydashConfig>(contents).map_err(|e| {
        Error::configuration(format!("Failed to parse {CONFIG_FILE_NAME}: {e}"), None)
    })?;
    config.validate()
}

/// Try one candidate path; missing files are silent, broken ones warn.
pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<SurveydashConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{} in {}. Using defaults.", e, config_path.display());
            None
        }
    }
}

pub(crate) fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// Pure function to generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for a config file.
pub fn load_config_near(start: PathBuf) -> SurveydashConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            SurveydashConfig::default()
        })
}

pub fn load_config() -> SurveydashConfig {
    match std::env::current_dir() {
        Ok(dir) => load_config_near(dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            SurveydashConfig::default()
        }
    }
}

/// Load an explicitly named config file. Any failure is an error.
pub fn load_config_from(path: &Path) -> Result<SurveydashConfig> {
    let contents = read_config_file(path).map_err(|e| {
        Error::configuration(
            format!("cannot read {}: {e}", path.display()),
            Some(path.to_path_buf()),
        )
    })?;
    parse_and_validate_config(&contents).map_err(|e| match e {
        Error::Configuration { message, .. } => {
            Error::configuration(message, Some(path.to_path_buf()))
        }
        other => other,
    })
}

/// Write [`DEFAULT_CONFIG`] into `dir`, refusing to clobber unless `force`.
pub fn write_default_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        return Err(Error::configuration(
            format!("{} already exists (use --force to overwrite)", path.display()),
            Some(path),
        ));
    }
    fs::write(&path, DEFAULT_CONFIG)?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SurveyVariant;
    use crate::filter::FilterKey;

    #[test]
    fn test_default_config_text_parses() {
        let config = parse_and_validate_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.source.batch_size, 1000);
        assert!(config
            .profile(SurveyVariant::Formal)
            .allows_filter(&FilterKey::question("ETHNICITY")));
        assert!(!config
            .profile(SurveyVariant::Public)
            .allows_filter(&FilterKey::question("ETHNICITY")));
    }

    #[test]
    fn test_directory_ancestors_stops_at_depth() {
        let dirs: Vec<_> = directory_ancestors(PathBuf::from("/a/b/c/d"), 2).collect();
        assert_eq!(dirs, vec![PathBuf::from("/a/b/c/d"), PathBuf::from("/a/b/c")]);
    }

    #[test]
    fn test_parse_error_is_configuration_error() {
        let err = parse_and_validate_config("[source]\npage_size = \"many\"").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
