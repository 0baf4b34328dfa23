use std::fs;
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use warpshaper_dsp::analysis::{impulse_response, magnitude_response_db};
use warpshaper_dsp::{Dither, DitherKind, ShapedQuantizer, ShaperConfig, WarpedLatticeShaper};

const DEFAULT_LAMBDA: f32 = 0.5;
const DEFAULT_K: [f32; 2] = [0.25, -0.15];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let cli = Cli::parse();
    match cli.command {
        Commands::Impulse(args) => execute_impulse(args),
        Commands::Shape(args) => execute_shape(args),
        Commands::Response(args) => execute_response(args),
    }
}

#[derive(Parser)]
#[command(author, version, about = "Warped lattice noise shaper tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the warp gain and the impulse response of the shaped error.
    Impulse(ImpulseArgs),
    /// Quantize a test tone with and without noise shaping.
    Shape(ShapeArgs),
    /// Print the magnitude response of the shaped error.
    Response(ResponseArgs),
}

#[derive(Args)]
struct FilterArgs {
    /// JSON file with `lambda`, `coefficients` and an optional `order`.
    #[arg(long, conflicts_with_all = ["lambda", "k", "order"])]
    config: Option<PathBuf>,
    /// Warping coefficient.
    #[arg(long, allow_negative_numbers = true)]
    lambda: Option<f32>,
    /// Reflection coefficients, comma separated.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    k: Vec<f32>,
    /// Number of coefficients to use. Defaults to all of them.
    #[arg(long)]
    order: Option<usize>,
}

impl FilterArgs {
    fn load(&self) -> Result<ShaperConfig> {
        if let Some(path) = &self.config {
            let data = fs::read_to_string(path)
                .with_context(|| format!("failed to read shaper config {}", path.display()))?;
            let config: ShaperConfig = serde_json::from_str(&data)
                .with_context(|| format!("{} is not a valid shaper config", path.display()))?;
            return Ok(config);
        }
        let lambda = self.lambda.unwrap_or(DEFAULT_LAMBDA);
        let k: &[f32] = if self.k.is_empty() {
            &DEFAULT_K
        } else {
            &self.k
        };
        let order = self.order.unwrap_or(k.len());
        ShaperConfig::try_new(lambda, order, k).context("invalid shaper parameters")
    }

    fn shaper(&self) -> Result<WarpedLatticeShaper> {
        let config = self.load()?;
        tracing::info!(
            order = config.order(),
            lambda = config.lambda(),
            k = ?config.coefficients(),
            "configured shaper"
        );
        Ok(WarpedLatticeShaper::with_config(config))
    }
}

#[derive(Args)]
struct ImpulseArgs {
    #[command(flatten)]
    filter: FilterArgs,
    /// Number of samples to print.
    #[arg(long, default_value_t = 16)]
    len: usize,
}

fn execute_impulse(args: ImpulseArgs) -> Result<()> {
    let mut shaper = args.filter.shaper()?;
    println!("warp_gain = {}", shaper.warp_gain());
    for y in impulse_response(&mut shaper, args.len) {
        println!("{y}");
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DitherArg {
    None,
    Rect,
    Tpdf,
}

impl From<DitherArg> for DitherKind {
    fn from(arg: DitherArg) -> Self {
        match arg {
            DitherArg::None => DitherKind::None,
            DitherArg::Rect => DitherKind::Rectangular,
            DitherArg::Tpdf => DitherKind::Tpdf,
        }
    }
}

#[derive(Args)]
struct ShapeArgs {
    #[command(flatten)]
    filter: FilterArgs,
    /// Output word length.
    #[arg(long, default_value_t = 8)]
    bits: u32,
    /// Test tone frequency in Hz.
    #[arg(long, default_value_t = 1_000.0)]
    freq: f32,
    /// Sample rate in Hz.
    #[arg(long, default_value_t = 44_100.0)]
    rate: f32,
    /// Test tone peak amplitude, full scale being 1.0.
    #[arg(long, default_value_t = 0.5)]
    amplitude: f32,
    /// Number of samples to process.
    #[arg(long, default_value_t = 44_100)]
    samples: usize,
    #[arg(long, value_enum, default_value_t = DitherArg::Tpdf)]
    dither: DitherArg,
    /// Clamp the fed-back error to this many quantization steps.
    #[arg(long)]
    clip: Option<f32>,
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

fn execute_shape(args: ShapeArgs) -> Result<()> {
    ensure!((1..=24).contains(&args.bits), "bits must be within 1..=24");
    ensure!(args.rate > 0.0, "sample rate must be positive");
    if let Some(clip) = args.clip {
        ensure!(clip.is_finite(), "clip threshold must be a finite number, got {clip}");
    }

    let step = 2.0 / (1u32 << args.bits) as f32;
    let input: Vec<f32> = (0..args.samples)
        .map(|n| {
            let phase = std::f32::consts::TAU * args.freq * n as f32 / args.rate;
            args.amplitude * phase.sin()
        })
        .collect();

    let dither = || Dither::new(args.dither.into(), args.seed);
    let mut plain = ShapedQuantizer::new(WarpedLatticeShaper::new())
        .with_step(step)
        .with_dither(dither());
    let mut shaped = ShapedQuantizer::new(args.filter.shaper()?)
        .with_step(step)
        .with_dither(dither());
    if let Some(clip) = args.clip {
        shaped = shaped.with_clip_threshold(clip);
    }

    let mut plain_out = vec![0.0f32; input.len()];
    let mut shaped_out = vec![0.0f32; input.len()];
    plain.process(&input, &mut plain_out);
    shaped.process(&input, &mut shaped_out);

    println!("step = {step}");
    println!("warp_gain = {}", shaped.shaper().warp_gain());
    print_error_stats("plain", &input, &plain_out, step);
    print_error_stats("shaped", &input, &shaped_out, step);
    Ok(())
}

fn print_error_stats(label: &str, input: &[f32], output: &[f32], step: f32) {
    let (sum_sq, peak) = input
        .iter()
        .zip(output)
        .map(|(&s, &q)| f64::from((q - s) / step))
        .fold((0.0f64, 0.0f64), |(sum, peak), e| (sum + e * e, peak.max(e.abs())));
    let rms = (sum_sq / input.len().max(1) as f64).sqrt();
    println!("{label}: error rms = {rms:.4} steps, peak = {peak:.4} steps");
}

#[derive(Args)]
struct ResponseArgs {
    #[command(flatten)]
    filter: FilterArgs,
    /// Number of frequency points from DC to Nyquist.
    #[arg(long, default_value_t = 32)]
    bins: usize,
    /// Impulse response length used for the transform.
    #[arg(long, default_value_t = 1_024)]
    len: usize,
    /// Report frequencies in Hz for this sample rate.
    #[arg(long)]
    rate: Option<f32>,
}

fn execute_response(args: ResponseArgs) -> Result<()> {
    let mut shaper = args.filter.shaper()?;
    let response = impulse_response(&mut shaper, args.len);
    for point in magnitude_response_db(&response, args.bins) {
        match args.rate {
            Some(rate) => println!(
                "{:.1} Hz\t{:.3} dB",
                point.frequency * f64::from(rate),
                point.magnitude_db
            ),
            None => println!("{:.4}\t{:.3} dB", point.frequency, point.magnitude_db),
        }
    }
    Ok(())
}
