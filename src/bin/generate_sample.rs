//! Write a synthetic incident table for demos: `generate_sample [OUT]`.
//! The output is CSV unless `OUT` ends in `.parquet`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 5_000;

/// Area name with an approximate center and a relative incident weight.
const AREAS: [(&str, f64, f64, u64); 8] = [
    ("Central", 34.044, -118.247, 9),
    ("77th Street", 33.970, -118.298, 8),
    ("Southwest", 34.014, -118.305, 6),
    ("Hollywood", 34.098, -118.330, 5),
    ("Harbor", 33.760, -118.285, 3),
    ("Topanga", 34.190, -118.600, 2),
    ("Van Nuys", 34.180, -118.450, 4),
    ("Pacific", 33.990, -118.430, 3),
];

const WEAPONS: [&str; 12] = [
    "STRONG-ARM (HANDS, FIST, FEET OR BODILY FORCE)",
    "UNKNOWN WEAPON/OTHER WEAPON",
    "VERBAL THREAT",
    "HAND GUN",
    "SEMI-AUTOMATIC PISTOL",
    "KNIFE WITH BLADE 6INCHES OR LESS",
    "UNKNOWN FIREARM",
    "OTHER KNIFE",
    "MACE/PEPPER SPRAY",
    "VEHICLE",
    "BOTTLE",
    "ROCK/THROWN OBJECT",
];

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Index drawn with probability proportional to `weights`.
    fn weighted(&mut self, weights: &[u64]) -> usize {
        let total: u64 = weights.iter().sum();
        let mut pick = self.below(total);
        for (i, &w) in weights.iter().enumerate() {
            if pick < w {
                return i;
            }
            pick -= w;
        }
        weights.len() - 1
    }
}

#[derive(Default)]
struct Columns {
    dr_no: Vec<i64>,
    date_reported: Vec<String>,
    date_occurred: Vec<String>,
    area: Vec<i64>,
    area_name: Vec<String>,
    crime_code: Vec<i64>,
    victim_age: Vec<Option<i64>>,
    victim_sex: Vec<Option<String>>,
    victim_descent: Vec<String>,
    weapon_code: Vec<Option<i64>>,
    weapon_description: Vec<Option<String>>,
    status: Vec<String>,
    latitude: Vec<f64>,
    longitude: Vec<f64>,
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let weights: Vec<u64> = AREAS.iter().map(|a| a.3).collect();
    let weapon_weights: Vec<u64> = (0..WEAPONS.len() as u64).map(|i| 24 - 2 * i).collect();
    let mut cols = Columns::default();

    for i in 0..ROWS {
        let area_idx = rng.weighted(&weights);
        let (name, lat, lon, _) = AREAS[area_idx];

        let year = 2020 + rng.below(4);
        let month = 1 + rng.below(12);
        let day = 1 + rng.below(26);
        let hour = rng.below(24);
        let lag = rng.below(3);

        // A few ages are unknown or out of range, like the real exports.
        let age = match rng.below(20) {
            0 => None,
            1 => Some(-1),
            _ => Some(rng.gauss(36.0, 15.0).clamp(0.0, 99.0) as i64),
        };
        let sex = match rng.below(25) {
            0 => None,
            n if n % 2 == 0 => Some("F".to_string()),
            _ => Some("M".to_string()),
        };
        let weapon = match rng.below(10) {
            0 => None,
            _ => Some(rng.weighted(&weapon_weights)),
        };

        cols.dr_no.push(200_000_000 + i as i64);
        cols.date_occurred
            .push(format!("{year}-{month:02}-{day:02}T{hour:02}:00:00"));
        cols.date_reported
            .push(format!("{year}-{month:02}-{:02}T00:00:00", day + lag));
        cols.area.push(area_idx as i64 + 1);
        cols.area_name.push(name.to_string());
        cols.crime_code.push(200 + rng.below(700) as i64);
        cols.victim_age.push(age);
        cols.victim_sex.push(sex);
        cols.victim_descent
            .push(["H", "W", "B", "A", "O"][rng.below(5) as usize].to_string());
        cols.weapon_code.push(weapon.map(|w| 400 + w as i64));
        cols.weapon_description
            .push(weapon.map(|w| WEAPONS[w].to_string()));
        cols.status.push(["IC", "AO", "AA"][rng.below(3) as usize].to_string());
        cols.latitude.push(lat + rng.gauss(0.0, 0.015));
        cols.longitude.push(lon + rng.gauss(0.0, 0.015));
    }
    cols
}

fn to_batch(cols: Columns) -> Result<RecordBatch> {
    let text = |name: &str| Field::new(name, DataType::Utf8, true);
    let int = |name: &str| Field::new(name, DataType::Int64, true);
    let float = |name: &str| Field::new(name, DataType::Float64, true);

    let schema = Arc::new(Schema::new(vec![
        int("dr_no"),
        text("date_reported"),
        text("date_occurred"),
        int("area"),
        text("area_name"),
        int("crime_code"),
        int("victim_age"),
        text("victim_sex"),
        text("victim_descent"),
        int("weapon_code"),
        text("weapon_description"),
        text("status"),
        float("latitude"),
        float("longitude"),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(cols.dr_no)),
        Arc::new(StringArray::from(cols.date_reported)),
        Arc::new(StringArray::from(cols.date_occurred)),
        Arc::new(Int64Array::from(cols.area)),
        Arc::new(StringArray::from(cols.area_name)),
        Arc::new(Int64Array::from(cols.crime_code)),
        Arc::new(Int64Array::from(cols.victim_age)),
        Arc::new(StringArray::from(cols.victim_sex)),
        Arc::new(StringArray::from(cols.victim_descent)),
        Arc::new(Int64Array::from(cols.weapon_code)),
        Arc::new(StringArray::from(cols.weapon_description)),
        Arc::new(StringArray::from(cols.status)),
        Arc::new(Float64Array::from(cols.latitude)),
        Arc::new(Float64Array::from(cols.longitude)),
    ];

    RecordBatch::try_new(schema, columns).context("building record batch")
}

fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = arrow::csv::WriterBuilder::new()
        .with_header(true)
        .build(file);
    writer.write(batch).context("writing CSV")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let output_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_incidents.csv"));

    let mut rng = SimpleRng::new(42);
    let batch = to_batch(generate(&mut rng))?;

    let is_parquet = output_path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        write_parquet(&batch, &output_path)?;
    } else {
        write_csv(&batch, &output_path)?;
    }

    log::info!("Wrote {} incidents to {}", batch.num_rows(), output_path.display());
    println!("Wrote {} incidents to {}", batch.num_rows(), output_path.display());
    Ok(())
}
