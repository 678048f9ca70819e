use price_forecast::data::collect_all;
use price_forecast::{DataLoader, PipelineConfig, PipelineError};
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

mod common;

#[test]
fn test_data_loader_from_csv() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Market Name,Modal Price (Rs./Quintal),Reported Date").unwrap();
    writeln!(file, "Azadpur,1800,01/01/2023").unwrap();
    writeln!(file, "Azadpur,1850,02/01/2023").unwrap();
    writeln!(file, "Azadpur,1825,03/01/2023").unwrap();

    let df = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(df.shape(), (3, 3));
    assert!(df.column("Modal Price (Rs./Quintal)").unwrap().dtype().is_numeric());
}

#[test]
fn test_entity_path_convention() {
    let path = DataLoader::entity_path("data/raw", "Bhindi");
    assert_eq!(path, std::path::PathBuf::from("data/raw/Bhindi.csv"));
}

#[test]
fn test_load_entity_from_raw_dir() {
    let dir = tempdir().unwrap();
    common::write_report(dir.path(), "Bhindi", 20, 7);
    let config = PipelineConfig {
        raw_data_dir: dir.path().to_path_buf(),
        ..Default::default()
    };

    let table = DataLoader::load_entity(&config, "Bhindi").unwrap();

    assert_eq!(table.entity, "Bhindi");
    assert_eq!(table.shape(), (20, 6));
    assert_eq!(table.source, dir.path().join("Bhindi.csv"));
}

#[test]
fn test_missing_file_is_file_not_found() {
    let dir = tempdir().unwrap();
    let config = PipelineConfig {
        raw_data_dir: dir.path().to_path_buf(),
        ..Default::default()
    };

    let err = DataLoader::load_entity(&config, "Bhindi").unwrap_err();
    assert!(matches!(err, PipelineError::FileNotFound(_)));
}

#[test]
fn test_header_only_file_is_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "invalid,csv,format").unwrap();

    let err = DataLoader::from_csv(file.path()).unwrap_err();
    assert!(matches!(err, PipelineError::ParseError(_)));
}

#[test]
fn test_collect_all_keeps_configured_order() {
    let dir = tempdir().unwrap();
    common::write_report(dir.path(), "Bhindi", 15, 1);
    common::write_report(dir.path(), "Tomato", 25, 2);
    let config = PipelineConfig {
        raw_data_dir: dir.path().to_path_buf(),
        entities: vec!["Tomato".to_string(), "Bhindi".to_string()],
        ..Default::default()
    };

    let tables = collect_all(&config).unwrap();

    let loaded: Vec<(&str, usize)> = tables
        .iter()
        .map(|table| (table.entity.as_str(), table.shape().0))
        .collect();
    assert_eq!(loaded, vec![("Tomato", 25), ("Bhindi", 15)]);
}

#[test]
fn test_collect_all_stops_at_missing_entity() {
    let dir = tempdir().unwrap();
    common::write_report(dir.path(), "Bhindi", 15, 1);
    let config = PipelineConfig {
        raw_data_dir: dir.path().to_path_buf(),
        entities: vec!["Bhindi".to_string(), "Onion".to_string()],
        ..Default::default()
    };

    let err = collect_all(&config).unwrap_err();
    assert!(matches!(err, PipelineError::FileNotFound(_)));
}
