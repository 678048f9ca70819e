#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DATE: &str = "Reported Date";
pub const PRICE: &str = "Modal Price (Rs./Quintal)";

/// Daily market report rows with a linear price trend plus Gaussian noise
pub fn write_report<P: AsRef<Path>>(dir: P, entity: &str, rows: usize, seed: u64) -> PathBuf {
    let path = dir.as_ref().join(format!("{}.csv", entity));
    let mut file = File::create(&path).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 25.0).unwrap();
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    let markets = ["Azadpur", "Bowenpally", "Kolar"];

    writeln!(
        file,
        "District Name,Market Name,Variety,Min Price (Rs./Quintal),{},{}",
        PRICE, DATE
    )
    .unwrap();
    for i in 0..rows {
        let date = start + Duration::days(i as i64);
        let price = 1500.0 + 12.0 * i as f64 + noise.sample(&mut rng);
        writeln!(
            file,
            "Delhi,{},Local,{:.0},{:.0},{}",
            markets[i % markets.len()],
            price - 200.0,
            price,
            date.format("%d/%m/%Y")
        )
        .unwrap();
    }

    path
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}
