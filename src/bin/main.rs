//! RMKL Command Line Interface
//!
//! Builds kernels from JSON specs and runs them over LibSVM or CSV data:
//! variance normalization, Gram matrices and parameter inspection.

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{error, info, warn};
use rmkl::core::{Dataset, KernelError, Result};
use rmkl::data::{CSVDataset, DenseDataset, LibSVMDataset};
use rmkl::kernel::{read_kernel, write_kernel, KernelFunction, Parameterized};
use rmkl::persistence::{KernelSpec, NormalizationReport};
use rmkl::trainer::VarianceNormalizationTrainer;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "rmkl")]
#[command(about = "Composable kernel functions with variance normalization")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "RMKL Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scale a kernel to unit feature-space variance over a dataset
    Normalize(NormalizeArgs),
    /// Print the Gram matrix of a kernel over a dataset
    Gram(GramArgs),
    /// Show the parameter vector of a kernel
    Params(ParamsArgs),
}

#[derive(Args)]
struct NormalizeArgs {
    /// Kernel spec file (JSON)
    #[arg(short, long)]
    kernel: PathBuf,

    /// Data file (LibSVM or CSV format)
    #[arg(long)]
    data: PathBuf,

    /// Data format: auto, libsvm, or csv
    #[arg(short, long, default_value = "auto")]
    format: String,

    /// Smallest accepted feature-space variance
    #[arg(short, long, default_value = "1e-10")]
    tolerance: f64,

    /// Output report file (JSON)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct GramArgs {
    /// Kernel spec file (JSON)
    #[arg(short, long)]
    kernel: PathBuf,

    /// Data file (LibSVM or CSV format)
    #[arg(long)]
    data: PathBuf,

    /// Data format: auto, libsvm, or csv
    #[arg(short, long, default_value = "auto")]
    format: String,
}

#[derive(Args)]
struct ParamsArgs {
    /// Kernel spec file (JSON)
    #[arg(short, long)]
    kernel: PathBuf,

    /// Switch every slot to adaptive before printing
    #[arg(short, long)]
    all_adaptive: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Normalize(args) => normalize_command(args),
        Commands::Gram(args) => gram_command(args),
        Commands::Params(args) => params_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn normalize_command(args: NormalizeArgs) -> Result<()> {
    info!("Kernel spec: {:?}", args.kernel);
    info!("Data file: {:?}", args.data);

    let spec = KernelSpec::from_file(&args.kernel)?;
    let data = load_dataset(&args.data, &args.format)?;
    let mut kernel = spec.build_scaled()?;

    let mut trainer = VarianceNormalizationTrainer::new().with_tolerance(args.tolerance);
    trainer.train(&mut kernel, &data)?;

    let report = NormalizationReport::from_training(&spec, &kernel, &trainer, &data)?;
    report.print_summary();

    if let Some(output) = args.output {
        report.save_to_file(&output)?;
        info!("Report saved to: {output:?}");
    }
    Ok(())
}

fn gram_command(args: GramArgs) -> Result<()> {
    let spec = KernelSpec::from_file(&args.kernel)?;
    let data = load_dataset(&args.data, &args.format)?;
    let kernel = spec.build()?;
    let kernel = read_kernel(&kernel);

    info!("Computing {0}x{0} Gram matrix", data.len());
    for i in 0..data.len() {
        let row = (0..data.len())
            .map(|j| kernel.eval(data.element(i), data.element(j)))
            .collect::<Result<Vec<_>>>()?;
        let line: Vec<String> = row.iter().map(|v| format!("{v:.6}")).collect();
        println!("{}", line.join(" "));
    }
    Ok(())
}

fn params_command(args: ParamsArgs) -> Result<()> {
    let spec = KernelSpec::from_file(&args.kernel)?;
    let kernel = spec.build()?;
    if args.all_adaptive {
        write_kernel(&kernel).set_adaptive_all(true);
    }

    let kernel = read_kernel(&kernel);
    println!("Kernel: {}", kernel.name());
    println!("Slots: {}", kernel.number_of_slots());
    println!("Parameters: {}", kernel.number_of_parameters());
    println!("Vector: {:?}", kernel.parameter_vector());
    Ok(())
}

fn load_dataset(path: &Path, format: &str) -> Result<DenseDataset> {
    let format = if format == "auto" {
        detect_format(path)
    } else {
        format.to_string()
    };

    info!("Loading dataset as {format} format");
    let data = match format.as_str() {
        "libsvm" => LibSVMDataset::from_file(path)?.to_dense(),
        "csv" => CSVDataset::from_file(path)?.into_dense(),
        _ => {
            return Err(KernelError::InvalidParameter(format!(
                "Unsupported format: {format}. Use 'libsvm' or 'csv'"
            )))
        }
    };
    info!("Loaded {} samples with {} dimensions", data.len(), data.dim());
    Ok(data)
}

fn detect_format(path: &Path) -> String {
    if let Some(ext) = path.extension() {
        match ext.to_str() {
            Some("csv") => "csv".to_string(),
            Some("libsvm") | Some("svm") => "libsvm".to_string(),
            _ => {
                warn!("Unknown file extension, assuming LibSVM format");
                "libsvm".to_string()
            }
        }
    } else {
        warn!("No file extension, assuming LibSVM format");
        "libsvm".to_string()
    }
}
