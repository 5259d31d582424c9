use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

use salary_range::{ExperienceBand, RawObservation};

/// Write a synthetic salary survey corpus
#[derive(Debug, Parser)]
#[command(about)]
struct Args {
    /// Output file; format follows the extension (.parquet, .json, .csv)
    #[arg(default_value = "sample_salaries.parquet")]
    output: PathBuf,

    /// Respondents per country/language/band cell
    #[arg(long, default_value_t = 12)]
    per_band: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
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

/// Median salary in thousands for a band, before country/language scaling.
fn band_base(band: ExperienceBand) -> f64 {
    match band {
        ExperienceBand::LessThanOne => 32.0,
        ExperienceBand::OneToTwo => 45.0,
        ExperienceBand::ThreeToFive => 62.0,
        ExperienceBand::SixToTen => 85.0,
        ExperienceBand::ElevenToSixteen => 110.0,
        ExperienceBand::SixteenPlus => 140.0,
    }
}

fn generate(args: &Args) -> Vec<RawObservation> {
    let mut rng = SimpleRng::new(args.seed);

    let countries = [
        ("Germany", 1.0),
        ("Poland", 0.55),
        ("Spain", 0.7),
        ("United Kingdom", 1.05),
        ("United States", 1.6),
    ];
    let languages = [
        ("C#", 1.0),
        ("Go", 1.1),
        ("JavaScript / TypeScript", 0.95),
        ("Python", 1.0),
        ("Rust", 1.15),
    ];

    let mut records = Vec::new();
    for &(country, country_scale) in &countries {
        for &(language, language_scale) in &languages {
            for band in ExperienceBand::ALL {
                let median = band_base(band) * country_scale * language_scale;
                for _ in 0..args.per_band {
                    // Log-normal spread, rounded to whole thousands like the survey.
                    let value = (median * rng.gauss(0.0, 0.25).exp()).round();
                    records.push(RawObservation::new(country, language, band.label(), value));
                }
            }
            // A free-text answer now and then.
            if rng.next_f64() < 0.3 {
                records.push(RawObservation::new(country, language, "prefer not to say", 50.0));
            }
        }
    }
    records
}

fn write_parquet(path: &Path, records: &[RawObservation]) -> Result<()> {
    let country: StringArray = records.iter().map(|r| r.country.as_deref()).collect();
    let language: StringArray = records.iter().map(|r| r.language.as_deref()).collect();
    let experience: StringArray = records.iter().map(|r| r.experience.as_deref()).collect();
    let value: Float64Array = records.iter().map(|r| r.value).collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("country", DataType::Utf8, true),
        Field::new("language", DataType::Utf8, true),
        Field::new("experience", DataType::Utf8, true),
        Field::new("value", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(country),
            Arc::new(language),
            Arc::new(experience),
            Arc::new(value),
        ],
    )
    .context("creating record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn write_csv(path: &Path, records: &[RawObservation]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for record in records {
        writer.serialize(record).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_json(path: &Path, records: &[RawObservation]) -> Result<()> {
    let file = std::fs::File::create(path).context("creating output file")?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), records).context("writing JSON")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let records = generate(&args);

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "parquet" | "pq" => write_parquet(&args.output, &records)?,
        "csv" => write_csv(&args.output, &records)?,
        "json" => write_json(&args.output, &records)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    println!(
        "Wrote {} observations to {}",
        records.len(),
        args.output.display()
    );
    Ok(())
}
