use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Builder, ListBuilder, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Same shape the viewer's loader reads.
#[derive(Debug, Serialize)]
struct SampleSpectrum {
    name: String,
    spectral_axis: Vec<f64>,
    spectral_axis_unit: String,
    flux: Vec<f64>,
    flux_unit: String,
}

/// Line: (center, width, amplitude relative to continuum); negative
/// amplitudes are absorption.
type SpectralLine = (f64, f64, f64);

fn synthesize(
    axis: &[f64],
    continuum: impl Fn(f64) -> f64,
    lines: &[SpectralLine],
    noise: f64,
    rng: &mut SimpleRng,
) -> Vec<f64> {
    axis.iter()
        .map(|&x| {
            let c = continuum(x);
            let shape: f64 = lines.iter().map(|&(mu, sigma, amp)| gaussian(x, mu, sigma, amp)).sum();
            c * (1.0 + shape) + rng.gauss(0.0, noise * c)
        })
        .collect()
}

fn samples() -> Vec<SampleSpectrum> {
    let mut rng = SimpleRng::new(42);

    // 350 nm → 1000 nm, step 0.5
    let nm: Vec<f64> = (0..1301).map(|i| 350.0 + i as f64 * 0.5).collect();
    // same range in Angstrom
    let angstrom: Vec<f64> = nm.iter().map(|x| x * 10.0).collect();

    let balmer: [SpectralLine; 4] = [(656.3, 1.5, 2.5), (486.1, 1.2, 0.9), (434.0, 1.0, 0.4), (410.2, 1.0, 0.2)];
    let absorption: [SpectralLine; 3] = [(393.4, 1.0, -0.6), (396.8, 1.0, -0.5), (589.3, 0.8, -0.3)];

    vec![
        SampleSpectrum {
            name: "emission_nebula".to_string(),
            flux: synthesize(&nm, |x| 0.02 + 1e-5 * x, &balmer, 0.01, &mut rng),
            spectral_axis: nm.clone(),
            spectral_axis_unit: "nm".to_string(),
            flux_unit: "Jy".to_string(),
        },
        SampleSpectrum {
            name: "g_star".to_string(),
            flux: synthesize(
                &angstrom,
                |x| 1e-13 * (-(x - 5500.0).powi(2) / (2.0 * 2500.0f64.powi(2))).exp(),
                &absorption.map(|(mu, sigma, amp)| (mu * 10.0, sigma * 10.0, amp)),
                0.005,
                &mut rng,
            ),
            spectral_axis: angstrom,
            spectral_axis_unit: "Angstrom".to_string(),
            flux_unit: "erg / (s cm2 Angstrom)".to_string(),
        },
        SampleSpectrum {
            name: "quasar".to_string(),
            flux: synthesize(&nm, |x| 5e-3 * (x / 500.0).powf(-0.5), &[(656.3, 6.0, 1.2), (486.1, 5.0, 0.6)], 0.02, &mut rng),
            spectral_axis: nm,
            spectral_axis_unit: "nm".to_string(),
            flux_unit: "Jy".to_string(),
        },
    ]
}

fn list_column(rows: impl Iterator<Item = Vec<f64>>) -> arrow::array::ListArray {
    let mut builder = ListBuilder::new(Float64Builder::new());
    for row in rows {
        builder.values().append_slice(&row);
        builder.append(true);
    }
    builder.finish()
}

fn write_parquet(spectra: &[SampleSpectrum], path: &str) -> Result<()> {
    let item = Arc::new(Field::new("item", DataType::Float64, true));
    let schema = Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, false),
        Field::new("spectral_axis", DataType::List(item.clone()), false),
        Field::new("spectral_axis_unit", DataType::Utf8, false),
        Field::new("flux", DataType::List(item), false),
        Field::new("flux_unit", DataType::Utf8, false),
    ]));
    let strings = |f: fn(&SampleSpectrum) -> &str| StringArray::from(spectra.iter().map(f).collect::<Vec<_>>());

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(strings(|s| s.name.as_str())),
            Arc::new(list_column(spectra.iter().map(|s| s.spectral_axis.clone()))),
            Arc::new(strings(|s| s.spectral_axis_unit.as_str())),
            Arc::new(list_column(spectra.iter().map(|s| s.flux.clone()))),
            Arc::new(strings(|s| s.flux_unit.as_str())),
        ],
    )
    .context("Failed to create RecordBatch")?;

    let file = std::fs::File::create(path).with_context(|| format!("Failed to create {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;
    Ok(())
}

fn write_json(spectra: &[SampleSpectrum], path: &str) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("Failed to create {path}"))?;
    serde_json::to_writer(file, spectra).context("Failed to write JSON")
}

fn write_csv(spectra: &[SampleSpectrum], path: &str) -> Result<()> {
    let join = |values: &[f64]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(";");
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("Failed to create {path}"))?;
    writer.write_record(["name", "spectral_axis", "spectral_axis_unit", "flux", "flux_unit"])?;
    for s in spectra {
        writer.write_record([
            s.name.as_str(),
            join(&s.spectral_axis).as_str(),
            s.spectral_axis_unit.as_str(),
            join(&s.flux).as_str(),
            s.flux_unit.as_str(),
        ])?;
    }
    writer.flush().context("Failed to flush CSV")?;
    Ok(())
}

fn main() -> Result<()> {
    let spectra = samples();
    write_parquet(&spectra, "sample_spectra.parquet")?;
    write_json(&spectra, "sample_spectra.json")?;
    write_csv(&spectra, "sample_spectra.csv")?;

    println!(
        "Wrote {} spectra ({} samples each) to sample_spectra.{{parquet,json,csv}}",
        spectra.len(),
        spectra[0].flux.len()
    );
    Ok(())
}
