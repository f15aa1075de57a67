use std::fs;
use std::path::Path;

use crate::io::store::{StoreError, atomic_write};
use crate::model::config::AppConfig;
use crate::util::locale::Locale;

pub const CONFIG_FILE: &str = "config.toml";

/// Read config.toml, returning both the parsed config and the raw
/// toml_edit document for format-preserving edits. A missing file yields
/// defaults and an empty document.
pub fn read_config(data_dir: &Path) -> Result<(AppConfig, toml_edit::DocumentMut), StoreError> {
    let path = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok((AppConfig::default(), toml_edit::DocumentMut::new()));
    }
    let text = fs::read_to_string(&path).map_err(|e| StoreError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let config: AppConfig = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Write the config document back, preserving formatting
pub fn write_config(data_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), StoreError> {
    let path = data_dir.join(CONFIG_FILE);
    atomic_write(&path, doc.to_string().as_bytes())
        .map_err(|e| StoreError::WriteError { path, source: e })
}

/// Set `ui.locale`, creating the table if needed
pub fn set_locale(doc: &mut toml_edit::DocumentMut, locale: Locale) {
    if !doc.contains_key("ui") {
        doc["ui"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["ui"]["locale"] = toml_edit::value(locale.code());
}

/// Contents of a freshly initialized config.toml
pub fn initial_config(locale: Locale) -> String {
    format!(
        r#"# pulse configuration

[ui]
locale = "{}"
# what a trackable item is called in messages
noun = "tracker"

[limits]
max_name_len = 38
"#,
        locale.code()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> &'static str {
        r#"# my settings
[ui]
locale = "en"   # keep english
noun = "habit"

[limits]
max_name_len = 20
"#
    }

    #[test]
    fn round_trip_preserves_text() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), sample_config()).unwrap();

        let (config, doc) = read_config(tmp.path()).unwrap();
        assert_eq!(config.ui.noun, "habit");
        assert_eq!(config.limits.max_name_len, 20);

        write_config(tmp.path(), &doc).unwrap();
        let written = fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(written, sample_config());
    }

    #[test]
    fn set_locale_keeps_comments() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_locale(&mut doc, Locale::Ru);
        let result = doc.to_string();
        assert!(result.contains("# my settings"));
        assert!(result.contains("noun = \"habit\""));
        let config: AppConfig = toml::from_str(&result).unwrap();
        assert_eq!(config.ui.locale, Locale::Ru);
    }

    #[test]
    fn set_locale_on_empty_document() {
        let mut doc = toml_edit::DocumentMut::new();
        set_locale(&mut doc, Locale::Ru);
        let config: AppConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(config.ui.locale, Locale::Ru);
        assert_eq!(config.ui.noun, "tracker");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let (config, doc) = read_config(tmp.path()).unwrap();
        assert_eq!(config.ui.locale, Locale::En);
        assert!(doc.to_string().is_empty());
    }

    #[test]
    fn bad_value_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[ui]\nlocale = \"fr\"\n").unwrap();
        assert!(matches!(
            read_config(tmp.path()),
            Err(StoreError::ConfigParse(_))
        ));
    }

    #[test]
    fn initial_config_parses() {
        let config: AppConfig = toml::from_str(&initial_config(Locale::Ru)).unwrap();
        assert_eq!(config.ui.locale, Locale::Ru);
        assert_eq!(config.limits.max_name_len, 38);
    }
}
