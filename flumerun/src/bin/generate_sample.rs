use std::f64::consts::PI;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use chrono::NaiveDateTime;
use ndarray::{Array1, Array2};
use flume_rs::{datetime_to_datenum, MatData, MatStruct, MatWriter, DAY_OFFSET};

/// Write a synthetic wave flume run container.
///
/// A piston wave maker drives a regular wave train past a line of gauges.
/// The output has the same layout as a logger recording and loads with
/// flumerun.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output .mat file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Number of gauges
    #[arg(short, long, default_value = "8")]
    gauges: usize,

    /// Number of time samples
    #[arg(short, long, default_value = "2000")]
    samples: usize,

    /// Sampling rate in Hz
    #[arg(short, long, default_value = "20")]
    rate: f64,

    /// Time of the first sample
    #[arg(long, default_value = "2011-01-01T06:00:00")]
    start: NaiveDateTime,

    /// Seed for the gauge noise
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Write zlib-compressed variables
    #[arg(short, long)]
    compress: bool,
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
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }
}

// Wave train: 2.5 s period, 0.05 m amplitude, 4 m wavelength
const PERIOD: f64 = 2.5;
const AMPLITUDE: f64 = 0.05;
const WAVELENGTH: f64 = 4.0;
const STROKE: f64 = 0.4;
const NOISE: f64 = 0.002;

fn main() -> Result<()> {
    let args = Args::parse();

    if args.gauges == 0 || args.samples == 0 {
        bail!("--gauges and --samples must be at least 1");
    }
    if !(args.rate.is_finite() && args.rate > 0.0) {
        bail!("--rate must be a positive number, got {}", args.rate);
    }

    let mut rng = SimpleRng::new(args.seed);
    let omega = 2.0 * PI / PERIOD;
    let k = 2.0 * PI / WAVELENGTH;

    let start = datetime_to_datenum(args.start, DAY_OFFSET)
        .with_context(|| format!("Start time {} is out of range", args.start))?;
    let dt = 1.0 / args.rate;
    let seconds: Array1<f64> = Array1::from_iter((0..args.samples).map(|i| i as f64 * dt));
    let date = seconds.mapv(|s| start + s / 86_400.0);

    // Gauges every 1.5 m starting 3 m from the piston, alternating sides
    let x = Array1::from_iter((0..args.gauges).map(|g| 3.0 + 1.5 * g as f64));
    let y = Array1::from_iter((0..args.gauges).map(|g| if g % 2 == 0 { -0.25 } else { 0.25 }));

    let eta = Array2::from_shape_fn((args.samples, args.gauges), |(t, g)| {
        let phase = k * x[g] - omega * seconds[t];
        AMPLITUDE * phase.sin() + rng.gauss(0.0, NOISE)
    });
    let eta_wm = seconds.mapv(|s| -AMPLITUDE * (omega * s).sin());
    let x_wm = seconds.mapv(|s| 0.5 * STROKE * (omega * s).cos());

    let recording = MatStruct::scalar([
        ("date", MatData::column("date", &date.to_vec()).into()),
        ("eta", MatData::from_array2("eta", &eta).into()),
        ("x", MatData::from_array1("x", &x).into()),
        ("y", MatData::from_array1("y", &y).into()),
        ("eta_wm", MatData::column("eta_wm", &eta_wm.to_vec()).into()),
        ("x_wm", MatData::column("x_wm", &x_wm.to_vec()).into()),
    ]);

    MatWriter::new()
        .compressed(args.compress)
        .variable("eta", recording)
        .write(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Written {} samples from {} gauges to {}",
        args.samples,
        args.gauges,
        args.output.display()
    );

    Ok(())
}
