use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const FIRST_YEAR: i64 = 1950;
const LAST_YEAR: i64 = 2022;

/// (country, baseline, peak value, peak year, width in years)
const COUNTRIES: &[(&str, f64, f64, f64, f64)] = &[
    ("United States", 10.0, 22.0, 1975.0, 35.0),
    ("Canada", 8.0, 18.0, 1980.0, 40.0),
    ("Australia", 7.0, 19.0, 2005.0, 40.0),
    ("Qatar", 5.0, 60.0, 1975.0, 20.0),
    ("Kuwait", 4.0, 35.0, 1975.0, 25.0),
    ("Germany", 6.0, 14.0, 1980.0, 30.0),
    ("China", 0.2, 8.5, 2025.0, 25.0),
    ("India", 0.1, 2.0, 2030.0, 30.0),
    ("France", 4.0, 9.5, 1973.0, 25.0),
    ("Brazil", 0.5, 2.5, 2012.0, 35.0),
    ("Nigeria", 0.1, 0.8, 2010.0, 30.0),
    ("Chad", 0.01, 0.1, 2015.0, 30.0),
];

/// Labels that must never be ranked.
const AGGREGATES: &[&str] = &[
    "World",
    "Africa (GCP)",
    "High-income countries",
    "European Union (27)",
];

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Rows {
    country: Vec<String>,
    year: Vec<i64>,
    value: Vec<Option<f64>>,
}

impl Rows {
    fn push(&mut self, country: &str, year: i64, value: Option<f64>) {
        self.country.push(country.to_string());
        self.year.push(year);
        self.value.push(value);
    }
}

fn generate(rng: &mut SimpleRng) -> Rows {
    let mut rows = Rows {
        country: Vec::new(),
        year: Vec::new(),
        value: Vec::new(),
    };

    for year in FIRST_YEAR..=LAST_YEAR {
        let mut readings = Vec::with_capacity(COUNTRIES.len());
        for &(country, base, peak, peak_year, width) in COUNTRIES {
            let trend = base + gaussian(year as f64, peak_year, width, peak - base);
            let value = (trend + rng.gauss(0.0, 0.03 * trend)).max(0.0);
            // Sparse reporting: roughly one reading in twenty is missing,
            // and almost nothing is reported before 1960.
            let missing = rng.next_f64() < 0.05 || (year < 1960 && rng.next_f64() < 0.6);
            let value = (!missing).then_some(value);
            if let Some(v) = value {
                readings.push(v);
            }
            rows.push(country, year, value);
        }

        let world = readings.iter().sum::<f64>() / readings.len().max(1) as f64;
        for (i, aggregate) in AGGREGATES.iter().enumerate() {
            rows.push(aggregate, year, Some(world * (0.6 + 0.3 * i as f64)));
        }

        // A country with rows but no numeric history at all.
        rows.push("Tuvalu", year, None);
    }

    rows
}

fn write_csv(path: &Path, rows: &Rows) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(["country", "year", "co2_per_capita"])?;
    for i in 0..rows.country.len() {
        let year = rows.year[i].to_string();
        let value = rows.value[i].map(|v| format!("{v:.4}")).unwrap_or_default();
        writer.write_record([rows.country[i].as_str(), year.as_str(), value.as_str()])?;
    }
    // Rows the loader must drop.
    writer.write_record(["France", "n/a", "5.0"])?;
    writer.write_record(["Germany", "", "9.1"])?;
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &Rows) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("country", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
        Field::new("co2_per_capita", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                rows.country.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(rows.year.clone())),
            Arc::new(Float64Array::from(rows.value.clone())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let dir = Path::new("data");
    std::fs::create_dir_all(dir).context("creating data directory")?;

    let csv_path = dir.join("co2.csv");
    write_csv(&csv_path, &rows)?;
    let parquet_path = dir.join("co2.parquet");
    write_parquet(&parquet_path, &rows)?;

    println!(
        "Wrote {} rows for {} labels to {} and {}",
        rows.country.len(),
        COUNTRIES.len() + AGGREGATES.len() + 1,
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
