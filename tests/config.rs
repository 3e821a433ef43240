use sourcedeck::config::Config;
use sourcedeck::ui::components::columns::ColumnId;
use sourcedeck::utils::coords::CoordinateFormat;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("sourcedeck.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();

    assert!(config.validate().is_ok());
    assert_eq!(config.api.base_url, "http://localhost:5000");
    assert_eq!(config.table.rows_per_page, 10);
    assert_eq!(config.table.coordinate_format, CoordinateFormat::Sexagesimal);
    assert!(config.table.classifications_in_group_only);
    assert!(!config.logging.enabled);
}

#[test]
fn test_default_columns_hide_optional_ones() {
    let visible = Config::default().visible_columns();

    assert_eq!(visible.len(), 14);
    assert!(!visible.contains(&ColumnId::Alias));
    assert!(!visible.contains(&ColumnId::Origin));
    assert!(!visible.contains(&ColumnId::Finder));
    assert_eq!(visible[0], ColumnId::Favorite);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[api]
base_url = "https://fritz.science"

[table]
rows_per_page = 25
coordinate_format = "decimal"
hidden_columns = ["redshift", "groups"]
default_group = 3
"#,
    );

    let config = Config::load_from_file(&path).unwrap();

    assert_eq!(config.api.base_url, "https://fritz.science");
    assert_eq!(config.api.token_env, "SKYPORTAL_TOKEN");
    assert_eq!(config.table.rows_per_page, 25);
    assert_eq!(config.table.coordinate_format, CoordinateFormat::Decimal);
    assert_eq!(config.table.default_group, Some(3));
    assert_eq!(config.display.time_format, "%H:%M");

    let visible = config.visible_columns();
    assert!(!visible.contains(&ColumnId::Redshift));
    assert!(!visible.contains(&ColumnId::Groups));
    assert!(visible.contains(&ColumnId::SourceId));
}

#[test]
fn test_invalid_values_are_rejected() {
    let dir = TempDir::new().unwrap();

    for content in [
        "[table]\nrows_per_page = 7\n",
        "[table]\nhidden_columns = [\"nope\"]\n",
        "[api]\nbase_url = \"not a url\"\n",
        "[api]\ntoken_env = \"\"\n",
        "[logging]\nlevel = \"loud\"\n",
        "[display]\ndate_format = \"%d/%m/%Y\"\n",
    ] {
        let path = write_config(&dir, content);
        assert!(Config::load_from_file(&path).is_err(), "accepted: {}", content);
    }
}

#[test]
fn test_malformed_toml_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[table\nrows_per_page = ");

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(Config::load_from_file(dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_generated_config_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    Config::generate_default_config(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# sourcedeck configuration file"));
    assert!(!content.contains("default_group"));

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.table.rows_per_page, 10);
    assert_eq!(config.api.token_env, "SKYPORTAL_TOKEN");
}
