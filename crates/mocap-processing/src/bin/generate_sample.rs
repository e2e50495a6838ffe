use std::f64::consts::PI;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Write a synthetic marker recording in the trajectory-CSV layout.
#[derive(Parser, Debug)]
#[command(version, about = "Generate a synthetic motion-capture recording")]
struct Args {
    /// Data directory; the file lands in <base-path>/<subject>/<condition>.csv
    #[arg(short, long, default_value = "data")]
    base_path: PathBuf,

    #[arg(short, long, default_value = "P06")]
    subject: String,

    #[arg(short, long, default_value = "Optimal")]
    condition: String,

    /// Number of markers (named Marker_1, Marker_2, ...)
    #[arg(short, long, default_value_t = 3)]
    markers: usize,

    /// Number of frames
    #[arg(short, long, default_value_t = 1000)]
    frames: usize,

    /// Sampling rate in Hz
    #[arg(long, default_value_t = 100.0)]
    sample_rate: f64,

    /// Standard deviation of the measurement noise in mm
    #[arg(long, default_value_t = 0.5)]
    noise: f64,

    /// Every n-th frame gets a spike on Marker_1 X (0 disables spikes)
    #[arg(long, default_value_t = 97)]
    spike_every: usize,

    /// Fraction of frames with a dropped (empty) Marker_2 sample
    #[arg(long, default_value_t = 0.01)]
    gap_rate: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Box-Muller transform for normal distribution
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen_range(1e-15..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + std_dev * z
}

/// Position of one axis of one marker at time `t`: a gait-like oscillation
/// around a per-marker offset.
fn trajectory(marker: usize, axis: usize, t: f64) -> f64 {
    let offset = 100.0 * marker as f64 + [0.0, 400.0, 900.0][axis];
    let stride_hz = 1.0 + 0.1 * axis as f64;
    let amplitude = [60.0, 25.0, 40.0][axis];
    offset + amplitude * (2.0 * PI * stride_hz * t + marker as f64).sin()
}

fn write_recording(args: &Args, path: &Path) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut out = BufWriter::new(File::create(path).context("creating recording")?);

    writeln!(out, "Trajectories")?;
    writeln!(out, "{}", args.sample_rate)?;

    let mut names = vec![String::new(), String::new()];
    let mut axes = vec!["Frame".to_string(), "Time".to_string()];
    let mut units = vec![String::new(), String::new()];
    for marker in 1..=args.markers {
        names.extend([format!("Marker_{}", marker), String::new(), String::new()]);
        axes.extend(["X", "Y", "Z"].map(String::from));
        units.extend(std::iter::repeat_n("mm".to_string(), 3));
    }
    writeln!(out, "{}", names.join(","))?;
    writeln!(out, "{}", axes.join(","))?;
    writeln!(out, "{}", units.join(","))?;

    for frame in 0..args.frames {
        let t = frame as f64 / args.sample_rate;
        let mut row = vec![(frame + 1).to_string(), format!("{:.4}", t)];

        for marker in 1..=args.markers {
            let dropped = marker == 2 && rng.gen_bool(args.gap_rate.clamp(0.0, 1.0));
            for axis in 0..3 {
                if dropped {
                    row.push(String::new());
                    continue;
                }
                let mut value = trajectory(marker, axis, t) + gauss(&mut rng, 0.0, args.noise);
                if marker == 1 && axis == 0 && args.spike_every > 0 && frame > 0 && frame % args.spike_every == 0 {
                    value += 80.0;
                }
                row.push(format!("{:.3}", value));
            }
        }
        writeln!(out, "{}", row.join(","))?;
    }

    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subject_dir = args.base_path.join(&args.subject);
    fs::create_dir_all(&subject_dir)
        .with_context(|| format!("creating {}", subject_dir.display()))?;

    let path = subject_dir.join(format!("{}.csv", args.condition));
    write_recording(&args, &path)?;

    println!(
        "Wrote {} frames x {} markers to {}",
        args.frames,
        args.markers,
        path.display()
    );
    Ok(())
}
