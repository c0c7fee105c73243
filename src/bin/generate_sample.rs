use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sales_dashboard::data::writer::{write_csv, write_parquet};
use sales_dashboard::SalesRecord;

/// Write a synthetic vehicle sales dataset as CSV and Parquet.
#[derive(Debug, Parser)]
struct Args {
    /// Output directory
    #[arg(default_value = ".")]
    out_dir: PathBuf,

    /// Seed for the deterministic generator
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const REGIONS: [&str; 6] = ["Africa", "Asia", "Europe", "Middle East", "North America", "South America"];
const MODELS: [&str; 11] = [
    "3 Series", "5 Series", "7 Series", "i3", "i8", "M3", "M5", "X1", "X3", "X5", "X6",
];
const FUEL_TYPES: [&str; 4] = ["Diesel", "Electric", "Hybrid", "Petrol"];

fn pick<'a, R: Rng>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

fn generate<R: Rng>(rng: &mut R) -> Vec<SalesRecord> {
    let mut records = Vec::new();
    for year in 2010..=2024 {
        // Mild upward drift so forecasts have something to follow.
        let growth = 1.0 + (year - 2010) as f64 * 0.02;
        for _ in 0..200 {
            records.push(SalesRecord {
                year,
                region: pick(rng, &REGIONS).to_string(),
                model: pick(rng, &MODELS).to_string(),
                fuel_type: pick(rng, &FUEL_TYPES).to_string(),
                sales_volume: (rng.gen_range(100.0_f64..10_000.0) * growth).round(),
                price_usd: rng.gen_range(30_000.0_f64..120_000.0).round(),
                mileage_km: rng.gen_range(0.0_f64..200_000.0).round(),
                engine_size_l: (rng.gen_range(1.5_f64..5.0) * 10.0).round() / 10.0,
            });
        }
    }
    records
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let records = generate(&mut StdRng::seed_from_u64(args.seed));
    std::fs::create_dir_all(&args.out_dir).context("creating output directory")?;

    let csv_path = args.out_dir.join("sales_sample.csv");
    let csv_file = std::fs::File::create(&csv_path).context("creating CSV output")?;
    write_csv(&records, csv_file)?;

    let parquet_path = args.out_dir.join("sales_sample.parquet");
    let parquet_file = std::fs::File::create(&parquet_path).context("creating parquet output")?;
    write_parquet(&records, parquet_file)?;

    log::info!(
        "Wrote {} records to {} and {}",
        records.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_dashboard::data::loader::read_csv;

    #[test]
    fn same_seed_gives_same_records() {
        let a = generate(&mut StdRng::seed_from_u64(7));
        let b = generate(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_ne!(a, generate(&mut StdRng::seed_from_u64(8)));
    }

    #[test]
    fn generated_rows_pass_validation() {
        let records = generate(&mut StdRng::seed_from_u64(42));
        assert_eq!(records.len(), 15 * 200);

        let mut buf = Vec::new();
        write_csv(&records, &mut buf).unwrap();
        let report = read_csv(buf.as_slice()).unwrap();
        assert!(report.rejected.is_empty());
        assert_eq!(report.dataset.len(), records.len());
        assert_eq!(report.dataset.regions().len(), REGIONS.len());
    }
}
