use std::path::PathBuf;

use anyhow::{Context, Result};
use bgpeaks::{default_output_path, CloseMode, PeakCallerBuilder};
use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};

/// Call peaks from a bedGraph signal track and write them as sorted BED
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input bedGraph file (plain or gzipped)
    bedgraph: PathBuf,

    /// Keep records whose value is at least this threshold
    #[arg(short, long, allow_negative_numbers = true)]
    threshold: f64,

    /// Minimum peak length
    #[arg(short, long)]
    min_length: u64,

    /// Maximum peak length
    #[arg(short = 'M', long, default_value_t = u64::MAX, hide_default_value = true)]
    max_length: u64,

    /// Peaks at most this many bases apart are considered close
    #[arg(short = 'd', long)]
    inter_peak_distance: u64,

    /// How close peaks are resolved
    #[arg(long, value_enum, default_value_t = CloseArg::Merge)]
    close_peaks: CloseArg,

    /// Do not write the peak ID column
    #[arg(long)]
    no_id: bool,

    /// Prefix of generated peak IDs, e.g. `id` for `id1 .. idN`
    #[arg(long)]
    id_prefix: Option<String>,

    /// Output BED file, defaults to the input name with `.bg` replaced by `_peaks.bed`
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Discard peaks overlapping any region of this BED file
    #[arg(short, long)]
    blacklist: Option<PathBuf>,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CloseArg {
    /// Merge close peaks and sum their scores
    Merge,
    /// Keep only the highest of close peaks
    KeepHighest,
}

impl From<CloseArg> for CloseMode {
    fn from(arg: CloseArg) -> Self {
        match arg {
            CloseArg::Merge => CloseMode::Merge,
            CloseArg::KeepHighest => CloseMode::KeepHighest,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let output = args.output.clone().unwrap_or_else(|| default_output_path(&args.bedgraph));

    let mut builder = PeakCallerBuilder::new(args.threshold)
        .with_min_length(args.min_length)
        .with_max_length(args.max_length)
        .with_inter_peak_distance(args.inter_peak_distance)
        .with_close_mode(args.close_peaks.into())
        .with_ids(!args.no_id);
    if let Some(prefix) = args.id_prefix {
        builder = builder.with_id_prefix(prefix);
    }
    if let Some(blacklist) = &args.blacklist {
        builder = builder.with_blacklist(blacklist);
    }
    let caller = builder.build().context("Failed to set up peak calling")?;

    let n = caller
        .run(&args.bedgraph, &output)
        .with_context(|| format!("Failed to call peaks from {:?}", args.bedgraph))?;
    log::info!("Wrote {} peaks to {:?}", n, output);

    Ok(())
}
