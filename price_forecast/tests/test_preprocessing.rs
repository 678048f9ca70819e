use assert_approx_eq::assert_approx_eq;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use price_forecast::config::{ColumnNames, PreprocessConfig};
use price_forecast::frame::column_as_f64;
use price_forecast::preprocessing::{ColumnKind, UNKNOWN_ORDINAL};
use price_forecast::{preprocess, PipelineError, Preprocessor};

fn market_frame(markets: &[&str]) -> DataFrame {
    let prices: Vec<f64> = (0..markets.len()).map(|i| 1000.0 + 10.0 * i as f64).collect();
    let dates: Vec<String> = (0..markets.len())
        .map(|i| format!("{:02}/01/2023", i + 1))
        .collect();
    DataFrame::new(vec![
        Series::new("Market Name", markets),
        Series::new("Modal Price (Rs./Quintal)", prices),
        Series::new("Reported Date", dates),
    ])
    .unwrap()
}

fn preprocessor() -> Preprocessor {
    Preprocessor::new(&ColumnNames::default(), &PreprocessConfig::default())
}

#[test]
fn test_output_layout() {
    let df = DataFrame::new(vec![
        Series::new("Variety", &["Local", "Hybrid", "Local"]),
        Series::new("Arrivals", &[Some(10.0), None, Some(30.0)]),
        Series::new("Reported Date", &["01/01/2023", "02/01/2023", "03/01/2023"]),
    ])
    .unwrap();

    let table = preprocess(&df, &ColumnNames::default(), &PreprocessConfig::default()).unwrap();

    // numeric block, one-hot block in sorted category order, then the date
    assert_eq!(
        table.column_names(),
        vec!["Arrivals", "Variety_Hybrid", "Variety_Local", "date"]
    );
    assert_eq!(table.date_column(), Some("date"));
    assert_eq!(
        table.date().unwrap().utf8().unwrap().get(2),
        Some("03/01/2023")
    );

    let arrivals = column_as_f64(table.frame(), "Arrivals").unwrap();
    assert_approx_eq!(arrivals[1].unwrap(), 0.0);
    let stats = table.numeric_stats("Arrivals").unwrap();
    assert_approx_eq!(stats.mean, 20.0);
}

#[test]
fn test_one_hot_rows_sum_to_one_for_known_categories() {
    let df = market_frame(&["Azadpur", "Kolar", "Azadpur", "Bowenpally"]);
    let table = preprocess(&df, &ColumnNames::default(), &PreprocessConfig::default()).unwrap();

    let one_hot: Vec<Vec<Option<f64>>> = ["Azadpur", "Bowenpally", "Kolar"]
        .iter()
        .map(|market| column_as_f64(table.frame(), &format!("Market Name_{}", market)).unwrap())
        .collect();

    for row in 0..df.height() {
        let total: f64 = one_hot.iter().map(|column| column[row].unwrap()).sum();
        assert_approx_eq!(total, 1.0);
    }
}

#[test]
fn test_unseen_category_encodes_to_zeros() {
    let fitted = preprocessor()
        .fit(&market_frame(&["Azadpur", "Kolar"]))
        .unwrap();

    let table = fitted.transform(&market_frame(&["Kolar", "Lasalgaon"])).unwrap();

    let azadpur = column_as_f64(table.frame(), "Market Name_Azadpur").unwrap();
    let kolar = column_as_f64(table.frame(), "Market Name_Kolar").unwrap();
    assert_eq!(kolar, vec![Some(1.0), Some(0.0)]);
    assert_eq!(azadpur, vec![Some(0.0), Some(0.0)]);
    assert!(table.frame().column("Market Name_Lasalgaon").is_err());
}

#[test]
fn test_missing_categories_get_placeholder() {
    let df = DataFrame::new(vec![
        Series::new("Grade", &[Some("FAQ"), None, Some("FAQ")]),
        Series::new("Arrivals", &[1.0, 2.0, 3.0]),
    ])
    .unwrap();

    let (fitted, table) = preprocessor().fit_transform(&df).unwrap();

    assert_eq!(
        fitted.one_hot().categories("Grade").unwrap(),
        &["FAQ".to_string(), "missing".to_string()]
    );
    assert_eq!(
        column_as_f64(table.frame(), "Grade_missing").unwrap(),
        vec![Some(0.0), Some(1.0), Some(0.0)]
    );
    assert_eq!(table.date_column(), None);
    assert!(table.date().is_none());
}

#[test]
fn test_high_cardinality_uses_ordinal_codes() {
    let names: Vec<String> = (0..120).map(|i| format!("trader_{:03}", i)).collect();
    let df = DataFrame::new(vec![
        Series::new("Trader", names.clone()),
        Series::new("Arrivals", (0..120).map(|i| i as f64).collect::<Vec<_>>()),
    ])
    .unwrap();

    let fitted = preprocessor().fit(&df).unwrap();
    assert_eq!(
        fitted.groups().kind_of("Trader"),
        Some(ColumnKind::HighCardinality)
    );

    let unseen = DataFrame::new(vec![
        Series::new("Trader", &["trader_005", "trader_999"]),
        Series::new("Arrivals", &[1.0, 2.0]),
    ])
    .unwrap();
    let table = fitted.transform(&unseen).unwrap();

    assert_eq!(
        column_as_f64(table.frame(), "Trader").unwrap(),
        vec![Some(5.0), Some(UNKNOWN_ORDINAL)]
    );
}

#[test]
fn test_zero_variance_column_scales_to_zero() {
    let df = DataFrame::new(vec![
        Series::new("Arrivals", &[5.0, 5.0, 5.0]),
        Series::new("Reported Date", &["01/01/2023", "02/01/2023", "03/01/2023"]),
    ])
    .unwrap();

    let table = preprocess(&df, &ColumnNames::default(), &PreprocessConfig::default()).unwrap();

    assert_eq!(
        column_as_f64(table.frame(), "Arrivals").unwrap(),
        vec![Some(0.0), Some(0.0), Some(0.0)]
    );
}

#[test]
fn test_rerun_engages_numeric_path_only() {
    let df = market_frame(&["Azadpur", "Kolar", "Azadpur", "Bowenpally"]);
    let first = preprocess(&df, &ColumnNames::default(), &PreprocessConfig::default()).unwrap();

    let (fitted, second) = preprocessor().fit_transform(first.frame()).unwrap();

    assert!(fitted.groups().is_numeric_only());
    assert_eq!(second.column_names(), first.column_names());
    assert_eq!(second.date_column(), Some("date"));
}

#[test]
fn test_date_only_table_is_column_error() {
    let df = DataFrame::new(vec![Series::new(
        "Reported Date",
        &["01/01/2023", "02/01/2023"],
    )])
    .unwrap();

    let err = preprocessor().fit(&df).unwrap_err();
    assert!(matches!(err, PipelineError::ColumnError(_)));
}

#[test]
fn test_transform_requires_fitted_columns() {
    let fitted = preprocessor()
        .fit(&market_frame(&["Azadpur", "Kolar"]))
        .unwrap();
    let missing_market = DataFrame::new(vec![Series::new(
        "Modal Price (Rs./Quintal)",
        &[1.0, 2.0],
    )])
    .unwrap();

    let err = fitted.transform(&missing_market).unwrap_err();
    assert!(matches!(err, PipelineError::ColumnError(_)));
}

#[test]
fn test_output_names_match_transformed_columns() {
    let df = DataFrame::new(vec![
        Series::new("Variety", &["Local", "Hybrid", "Local"]),
        Series::new("Arrivals", &[10.0, 20.0, 30.0]),
        Series::new("Reported Date", &["01/01/2023", "02/01/2023", "03/01/2023"]),
    ])
    .unwrap();

    let (fitted, table) = preprocessor().fit_transform(&df).unwrap();

    let mut encoded = table.column_names();
    encoded.retain(|name| name != "date");
    assert_eq!(fitted.output_names(), encoded);
    assert_eq!(
        fitted.numeric().stats("Arrivals"),
        table.numeric_stats("Arrivals")
    );
    assert!(fitted.numeric().stats("Variety").is_none());
}

#[test]
fn test_colliding_indicator_names_are_rejected() {
    let df = DataFrame::new(vec![
        Series::new("Grade", &["A_B", "C"]),
        Series::new("Grade_A", &["B", "D"]),
        Series::new("Arrivals", &[1.0, 2.0]),
    ])
    .unwrap();

    match preprocessor().fit(&df).unwrap_err() {
        PipelineError::ColumnError(msg) => {
            assert!(msg.contains("'Grade'"), "{}", msg);
            assert!(msg.contains("'Grade_A'"), "{}", msg);
            assert!(msg.contains("Grade_A_B"), "{}", msg);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
