use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

/// Write a small demo batch: XRD exports plus a location table.
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Target directory (created if missing)
    #[arg(default_value = "sample_data")]
    dir: PathBuf,
}

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

fn generate_pattern(
    angles: &[f64],
    peaks: &[(f64, f64, f64)],
    background: f64,
    rng: &mut SimpleRng,
) -> Vec<f64> {
    angles
        .iter()
        .map(|&two_theta| {
            let signal: f64 = peaks
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(two_theta, mu, sigma, amp))
                .sum();
            (signal + background + rng.gauss(0.0, background.sqrt())).max(0.0)
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

/// Instrument export: metadata preamble, `Angle;Intensity` header, data.
fn render_export(sample: &str, angles: &[f64], counts: &[f64]) -> String {
    let mut out = String::new();
    out.push_str(&format!("FileName;{sample}.raw\n"));
    out.push_str(&format!("SampleID;{sample}\n"));
    out.push_str("Anode;Cu\n");
    out.push_str("Wavelength;1.5406 Å\n");
    out.push_str("Scan axis;2θ/θ\n");
    out.push('\n');
    out.push_str("Angle;Intensity\n");
    for (a, c) in angles.iter().zip(counts) {
        out.push_str(&format!("{a:.2};{c:.0}\n"));
    }
    out
}

/// Latin-1 bytes for text whose characters all fit in one byte; others
/// become `?`.
fn to_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let xrd_dir = args.dir.join("xrd");
    fs::create_dir_all(&xrd_dir).with_context(|| format!("creating {}", xrd_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    // 2θ: 10° → 80°, step 0.05
    let angles: Vec<f64> = (0..=1400).map(|i| 10.0 + i as f64 * 0.05).collect();

    // (sample id, location id as written in the table, height, peak shift)
    let samples = [
        ("S01", Some("S 01"), "0.0", 0.00),
        ("S02", Some("S 02"), "2.5", 0.05),
        ("S03", Some("s03"), "5.0", 0.10),
        ("S04", Some("S04"), "7.5", 0.15),
        ("S05", None, "", 0.20),
    ];
    let base_peaks = [(28.4, 0.12, 900.0), (47.3, 0.15, 520.0), (56.1, 0.18, 310.0)];

    let mut n_files = 0;
    for (i, &(sample, _, _, shift)) in samples.iter().enumerate() {
        let peaks: Vec<(f64, f64, f64)> = base_peaks
            .iter()
            .map(|&(mu, sigma, amp)| (mu + shift, sigma, amp))
            .collect();
        let counts = generate_pattern(&angles, &peaks, 40.0, &mut rng);
        let text = render_export(sample, &angles, &counts);

        // one export in the legacy single-byte encoding
        let bytes = if i == 1 {
            to_latin1(&text)
        } else {
            text.into_bytes()
        };
        write(&xrd_dir.join(format!("{sample}.csv")), &bytes)?;
        n_files += 1;
    }

    let mut locations = String::from("Sample ID;Height (mm)\n");
    locations.push_str("Reference sample;-\n");
    for &(_, location_id, height, _) in &samples {
        if let Some(id) = location_id {
            locations.push_str(&format!("{id};{height}\n"));
        }
    }
    // location with no measurement
    locations.push_str("S06;12.5\n");
    let location_path = args.dir.join("locations.csv");
    write(&location_path, locations.as_bytes())?;

    println!(
        "Wrote {n_files} XRD files ({} points each) to {} and locations to {}",
        angles.len(),
        xrd_dir.display(),
        location_path.display()
    );
    Ok(())
}
