//! Writes a synthetic glass dataset for trying the viewer:
//! `<out>/samples.csv`, one tab-delimited spectrum per glass and a reference standard.
//!
//! Usage: `generate_sample [output-dir]` (default `sample_data`).

use std::path::Path;

use anyhow::{Context, Result};

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Silicate bands, a water band of height `water_height` and a sloping
/// fluorescence background, sampled on a descending shift axis.
fn glass_spectrum(shifts: &[f64], water_height: f64, rng: &mut SimpleRng) -> Vec<f64> {
    let bands = [
        (480.0, 70.0, 100.0),
        (600.0, 40.0, 35.0),
        (800.0, 50.0, 20.0),
        (980.0, 60.0, 45.0),
        (1090.0, 45.0, 30.0),
        (3550.0, 110.0, water_height),
    ];
    shifts
        .iter()
        .map(|&v| {
            let signal: f64 = bands.iter().map(|&(mu, sigma, amp)| gaussian(v, mu, sigma, amp)).sum();
            let background = 15.0 + 0.004 * v + 8e-7 * (v - 2000.0).powi(2);
            signal + background + rng.gauss(0.0, 0.3)
        })
        .collect()
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

fn write_spectrum(path: &Path, shifts: &[f64], intensities: &[f64]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["shift", "intensity"])?;
    for (x, y) in shifts.iter().zip(intensities) {
        writer.write_record([format!("{x:.1}"), format!("{y:.4}")])?;
    }
    writer.flush()?;
    Ok(())
}

/// Water band height giving roughly `water` wt% with the LL2012 relation.
fn water_height(water: f64) -> f64 {
    300.0 * water / (100.0 - water)
}

fn main() -> Result<()> {
    let out = std::env::args().nth(1).unwrap_or_else(|| "sample_data".to_string());
    let out = Path::new(&out);
    std::fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;

    let mut rng = SimpleRng::new(42);

    // Raman shift: 4000 → 22, step 2
    let shifts: Vec<f64> = (0..1990).map(|i| 4000.0 - i as f64 * 2.0).collect();

    // (name, water wt%, FeO wt%)
    let glasses = [
        ("rhyolite_01", 0.5, 1.2),
        ("rhyolite_02", 1.8, 1.5),
        ("dacite_01", 2.9, 4.8),
        ("andesite_01", 3.7, 7.1),
        ("basalt_01", 4.6, 10.4),
        ("basalt_02", 6.0, 11.2),
    ];

    let reference_water = 3.0;
    write_spectrum(
        &out.join("std_ref.txt"),
        &shifts,
        &glass_spectrum(&shifts, water_height(reference_water), &mut rng),
    )?;

    let mut list = csv::Writer::from_path(out.join("samples.csv")).context("creating samples.csv")?;
    list.write_record([
        "Name",
        "Water, wt%",
        "FeO",
        "ROI1 lb",
        "ROI1 hb",
        "ROI2 lb",
        "ROI2 hb",
        "ROI3 lb",
        "ROI3 hb",
        "ROI4 lb",
        "ROI4 hb",
        "Spline coeff",
        "Ref",
        "Water Ref",
    ])?;

    for (name, water, feo) in glasses {
        let file = format!("{name}.txt");
        let y = glass_spectrum(&shifts, water_height(water), &mut rng);
        write_spectrum(&out.join(&file), &shifts, &y)?;
        list.write_record([
            file,
            format!("{water}"),
            format!("{feo}"),
            "50".into(),
            "200".into(),
            "1250".into(),
            "1400".into(),
            "2800".into(),
            "3100".into(),
            "3750".into(),
            "3800".into(),
            "0.001".into(),
            "std_ref.txt".into(),
            format!("{reference_water}"),
        ])?;
    }
    list.flush()?;

    println!(
        "Wrote {} glass spectra ({} shifts each) and samples.csv to {}",
        glasses.len(),
        shifts.len(),
        out.display()
    );
    Ok(())
}
