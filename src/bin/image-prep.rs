use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use image_prep::{
    default_output_dir, BatchSummary, ProcessResult, ProcessingOptions, Processor,
    DEFAULT_MAX_SIZE, DEFAULT_QUALITY,
};

#[derive(Parser)]
#[command(
    name = "image-prep",
    about = "Resize a folder of JPEGs, optionally stripping EXIF, tagging and watermarking them",
    version,
    after_help = "Example: image-prep -i ./photos -s 1080 -r \"Jane Doe\"\n\n\
                  With --rights and no --watermark, the rights holder is also drawn as the \
                  watermark. Only files ending in .jpg or .jpeg are processed."
)]
struct Cli {
    /// Source folder
    #[arg(short = 'i', long = "input_directory")]
    input_directory: PathBuf,

    /// Destination folder (default: <input_directory>/output)
    #[arg(short = 'o', long = "output_directory")]
    output_directory: Option<PathBuf>,

    /// Largest allowed width or height, in pixels
    #[arg(short = 's', long = "max_size", default_value_t = DEFAULT_MAX_SIZE)]
    max_size: u32,

    /// Remove all existing metadata before tagging
    #[arg(
        short = 'x',
        long = "strip_exif",
        action = ArgAction::Set,
        default_value_t = true,
        value_name = "BOOL"
    )]
    strip_exif: bool,

    /// Copyright holder written to the EXIF Artist field
    #[arg(short = 'r', long = "rights")]
    rights: Option<String>,

    /// Watermark text (default: the --rights value)
    #[arg(short = 'w', long = "watermark")]
    watermark: Option<String>,

    /// TrueType/OpenType font for the watermark
    #[arg(long)]
    font: Option<PathBuf>,

    /// JPEG quality (1-100)
    #[arg(long, default_value_t = DEFAULT_QUALITY)]
    quality: u8,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output_dir = cli
        .output_directory
        .unwrap_or_else(|| default_output_dir(&cli.input_directory));

    let opts = ProcessingOptions {
        max_size: cli.max_size,
        strip_metadata: cli.strip_exif,
        rights_holder: cli.rights,
        watermark_text: cli.watermark,
        quality: cli.quality,
        font: cli.font,
    };

    let processor = match Processor::new(opts) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Fatal: {e}");
            process::exit(1);
        }
    };

    let results = match processor.process_directory(&cli.input_directory, &output_dir) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Fatal: {e}");
            process::exit(1);
        }
    };

    for r in &results {
        print_result(r, cli.quiet);
    }

    if !cli.quiet {
        let summary = BatchSummary::from_results(&results);
        eprintln!();
        eprint!("[Summary] Processed: {}", summary.processed);
        if summary.skipped > 0 {
            eprint!(", Skipped: {}", summary.skipped);
        }
        eprintln!(" (Total: {})", summary.total());
    }
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
///
/// Per-file outcomes are already printed as `[OK]`/`[SKIP]` lines, so only
/// errors are logged by default.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn print_result(result: &ProcessResult, quiet: bool) {
    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.success {
        if !quiet {
            eprintln!("[OK] {filename} ({})", result.message);
        }
    } else {
        eprintln!("[SKIP] {filename}: {}", result.message);
    }
}
