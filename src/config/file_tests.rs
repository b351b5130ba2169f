//! Tests for config file location and properties reading.

use std::io::Write;
use std::path::PathBuf;

use super::file::{FileLocation, FileStyle, read_properties};

mod style {
    use super::*;

    #[test]
    fn from_name_recognizes_types() {
        assert_eq!(FileStyle::from_name("yaml"), FileStyle::Structured);
        assert_eq!(FileStyle::from_name("YML"), FileStyle::Structured);
        assert_eq!(FileStyle::from_name("properties"), FileStyle::Flat);
        assert_eq!(FileStyle::from_name("props"), FileStyle::Flat);
        assert_eq!(FileStyle::from_name("json"), FileStyle::Unknown);
    }

    #[test]
    fn declared_type_wins_over_extension() {
        let location = FileLocation::new("./config", "config.yaml", "properties");

        assert_eq!(location.style(), FileStyle::Flat);
    }

    #[test]
    fn extension_used_when_type_unknown() {
        let location = FileLocation::new("./config", "config.yml", "");

        assert_eq!(location.style(), FileStyle::Structured);
    }

    #[test]
    fn declared_type_is_case_insensitive() {
        let location = FileLocation::new("./config", "config", "YAML");

        assert_eq!(location.style(), FileStyle::Structured);
    }

    #[test]
    fn unknown_type_and_extension() {
        let location = FileLocation::new("./config", "config.json", "json");

        assert_eq!(location.style(), FileStyle::Unknown);
    }
}

mod path {
    use super::*;

    #[test]
    fn appends_declared_type_without_extension() {
        let location = FileLocation::new("/etc/collector", "config", "yaml");

        assert_eq!(location.path(), PathBuf::from("/etc/collector/config.yaml"));
    }

    #[test]
    fn keeps_existing_extension() {
        let location = FileLocation::new("/etc/collector", "settings.conf", "properties");

        assert_eq!(location.path(), PathBuf::from("/etc/collector/settings.conf"));
    }

    #[test]
    fn no_type_no_extension() {
        let location = FileLocation::new("/etc/collector", "config", "");

        assert_eq!(location.path(), PathBuf::from("/etc/collector/config"));
    }

    #[test]
    fn expands_home_directory() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let location = FileLocation::new("~/collector", "config", "yaml");

        assert_eq!(location.path(), home.join("collector").join("config.yaml"));
    }

    #[test]
    fn tilde_inside_name_is_literal() {
        let location = FileLocation::new("~other/config", "config", "yaml");

        assert_eq!(location.path(), PathBuf::from("~other/config/config.yaml"));
    }
}

mod properties {
    use super::*;

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();

        let entries = read_properties(&dir.path().join("config.properties")).unwrap();

        assert!(entries.is_none());
    }

    #[test]
    fn reads_entries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# collector settings").unwrap();
        writeln!(file, "host=acme.example.com").unwrap();
        writeln!(file, "prometheus_address: prometheus.monitoring").unwrap();
        writeln!(file, "history = 3").unwrap();

        let entries = read_properties(file.path()).unwrap().unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries["host"], "acme.example.com");
        assert_eq!(entries["prometheus_address"], "prometheus.monitoring");
        assert_eq!(entries["history"], "3");
    }

    #[test]
    fn directory_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(read_properties(dir.path()).is_err());
    }
}
