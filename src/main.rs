use clap::{Parser, Subcommand};
use facepool::bulk::{self, PoolImageError};
use facepool::catalog::Pool;
use facepool::config::{self, FacepoolConfig};
use facepool::document;
use facepool::imaging::ImageCrateCodec;
use facepool::output;
use facepool::progress::StatusTree;
use rayon::ThreadPool;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "facepool")]
#[command(about = "Manage face pools: named character portraits grouped into categories")]
#[command(long_about = "\
Manage face pools: named character portraits grouped into categories

A face pool is a JSON document describing categories of faces, plus the
image files it points to:

  faces/
  ├── faces.json                   # The pool document
  ├── facepool.toml                # Optional config (ordering, processing)
  ├── niko/
  │   ├── happy.png                # \"Niko, happy\": \"niko/happy.png\"
  │   └── sad.png
  └── alula/
      └── normal.png

Image paths are relative to the image root, which defaults to the
document's directory.

Run 'facepool gen-config' to generate a documented facepool.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: facepool.toml next to the document)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Image root directory (default: the document's directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a pool, read every image, and report problems
    Check {
        /// Pool document
        document: PathBuf,
    },
    /// Rewrite a pool document in canonical form
    Fmt {
        /// Pool document
        document: PathBuf,
        /// Overwrite the document instead of printing to stdout
        #[arg(long)]
        write: bool,
    },
    /// Copy a pool and all of its images to another directory
    Export {
        /// Pool document
        document: PathBuf,
        /// Destination directory
        #[arg(long)]
        to: PathBuf,
    },
    /// Print a stock facepool.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::Check { document: doc } => {
            let config = resolve_config(cli.config.as_deref(), doc)?;
            let root = resolve_root(cli.root.as_deref(), doc);
            let mut pool = document::load_pool(doc, &config.decode_options())?;
            let scheduler = build_thread_pool(&config.processing)?;

            println!("==> Checking {}", doc.display());
            let status = StatusTree::new();
            let result = read_all(&mut pool, &root, &status, scheduler.as_ref());
            output::print_pool(&mut pool);
            output::print_status(&status.snapshot());
            match result {
                Ok(()) => println!("==> All images readable"),
                Err(err) => {
                    output::print_image_errors(&err);
                    return Err(err.into());
                }
            }
        }
        Command::Fmt { document: doc, write } => {
            let config = resolve_config(cli.config.as_deref(), doc)?;
            let mut pool = document::load_pool(doc, &config.decode_options())?;
            if *write {
                document::save_pool(&mut pool, doc)?;
                info!(path = %doc.display(), "Rewrote document");
            } else {
                println!("{}", document::encode_pool(&mut pool)?);
            }
        }
        Command::Export { document: doc, to } => {
            let config = resolve_config(cli.config.as_deref(), doc)?;
            let root = resolve_root(cli.root.as_deref(), doc);
            let mut pool = document::load_pool(doc, &config.decode_options())?;
            let scheduler = build_thread_pool(&config.processing)?;
            let codec = ImageCrateCodec::new();

            println!("==> Reading images from {}", root.display());
            let status = StatusTree::new();
            if let Err(err) = read_all(&mut pool, &root, &status, scheduler.as_ref()) {
                output::print_image_errors(&err);
                return Err(err.into());
            }

            println!("==> Writing images to {}", to.display());
            let written = match &scheduler {
                Some(scheduler) => {
                    bulk::write_images_par(&mut pool, to, &codec, Some(&status), scheduler)
                }
                None => bulk::write_images(&mut pool, to, &codec, Some(&status)),
            };
            output::print_status(&status.snapshot());
            if let Err(err) = written {
                output::print_image_errors(&err);
                return Err(err.into());
            }

            let file_name = doc
                .file_name()
                .ok_or_else(|| format!("not a file: {}", doc.display()))?;
            let target = to.join(file_name);
            document::save_pool(&mut pool, &target)?;
            println!("==> Export complete: {}", target.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the global `tracing` subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("facepool={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit `--config` file, else the optional `facepool.toml` next to the document.
fn resolve_config(
    explicit: Option<&Path>,
    document: &Path,
) -> Result<FacepoolConfig, config::ConfigError> {
    match explicit {
        Some(path) => config::load_config_file(path),
        None => config::load_config(&document_dir(document)),
    }
}

fn resolve_root(explicit: Option<&Path>, document: &Path) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| document_dir(document))
}

fn document_dir(document: &Path) -> PathBuf {
    match document.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Build the worker pool for bulk image I/O, or `None` to run sequentially.
///
/// Capped at the number of available CPU cores: the user can constrain down, not up.
fn build_thread_pool(
    processing: &config::ProcessingConfig,
) -> Result<Option<ThreadPool>, rayon::ThreadPoolBuildError> {
    if processing.sequential {
        return Ok(None);
    }
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("facepool-io-{i}"))
        .build()
        .map(Some)
}

fn read_all(
    pool: &mut Pool,
    root: &Path,
    status: &StatusTree,
    scheduler: Option<&ThreadPool>,
) -> Result<(), PoolImageError> {
    let codec = ImageCrateCodec::new();
    match scheduler {
        Some(scheduler) => bulk::read_images_par(pool, root, &codec, Some(status), scheduler),
        None => bulk::read_images(pool, root, &codec, Some(status)),
    }
}
