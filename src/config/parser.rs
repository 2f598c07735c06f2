use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use std::fs;
use std::path::Path;

/// Loads and validates a configuration from a TOML file
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates a configuration from TOML text
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::CursorMode;

    const EXAMPLE: &str = r#"
        [store]
        database-path = "./cursors.db"

        [[source]]
        name = "catalog-objects"
        mode = "since-last-update"
        page-size = 500
        overlap-seconds = 60

        [[source]]
        name = "feature-records"
        mode = "from-last-id"
        page-size = 1000
    "#;

    #[test]
    fn test_parse_example() {
        let config = parse_config(EXAMPLE).unwrap();
        assert_eq!(config.store.database_path, "./cursors.db");
        assert_eq!(config.sources.len(), 2);

        let catalog = &config.sources[0];
        assert_eq!(catalog.name, "catalog-objects");
        assert_eq!(catalog.mode, CursorMode::SinceLastUpdate);
        assert_eq!(catalog.page_size, 500);
        assert_eq!(catalog.overlap_seconds, 60);

        let features = &config.sources[1];
        assert_eq!(features.mode, CursorMode::FromLastId);
        // overlap-seconds falls back to the default
        assert_eq!(features.overlap_seconds, 30);
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        let content = EXAMPLE.replace("since-last-update", "sideways");
        assert!(parse_config(&content).is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_page_size() {
        let content = EXAMPLE.replace("page-size = 500", "page-size = 0");
        assert!(parse_config(&content).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harvest.toml");
        std::fs::write(&path, EXAMPLE).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.sources.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config(Path::new("/nonexistent/harvest.toml"));
        assert!(result.is_err());
    }
}
