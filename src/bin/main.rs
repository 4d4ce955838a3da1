//! rkernel Command Line Interface
//!
//! A command-line interface for computing regularized kernel matrices and
//! weighted kernel parameter derivatives from CSV point sets.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info};
use ndarray::Array2;
use rkernel::core::{Dataset, HelperConfig, KernelError, Result};
use rkernel::data::{self, BatchedDataset};
use rkernel::helpers;
use rkernel::kernel::KernelConfig;
use rkernel::persistence::{GradientReport, KernelMatrixReport, Report, ReportMetadata};
use rkernel::utils::{matrix, memory, reference};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "rkernel")]
#[command(about = "Kernel matrix and kernel parameter derivative helpers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "rkernel contributors")]
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
    /// Compute the regularized kernel matrix of a point set
    Matrix(MatrixArgs),
    /// Compute the weighted kernel parameter derivative
    Gradient(GradientArgs),
    /// Compare batched results against pair-by-pair evaluation
    Check(CheckArgs),
    /// Display a saved report
    Info(InfoArgs),
}

#[derive(Args, Clone, Debug)]
struct KernelArgs {
    /// Kernel function
    #[arg(short, long, default_value = "rbf")]
    kernel: CliKernel,

    /// Kernel gamma (RBF width or polynomial scale)
    #[arg(short, long, default_value = "1.0")]
    gamma: f64,

    /// Polynomial degree
    #[arg(long, default_value = "2")]
    degree: u32,

    /// Polynomial independent term
    #[arg(long, default_value = "1.0")]
    coef0: f64,

    /// Use the log-encoded RBF parameter (derivative with respect to ln gamma)
    #[arg(long)]
    unconstrained: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliKernel {
    /// Gaussian RBF: exp(-gamma ||x - y||²)
    #[value(name = "rbf")]
    Rbf,
    /// Linear: <x, y>
    #[value(name = "linear")]
    Linear,
    /// Polynomial: (gamma <x, y> + coef0)^degree
    #[value(name = "polynomial")]
    Polynomial,
}

impl From<&KernelArgs> for KernelConfig {
    fn from(args: &KernelArgs) -> Self {
        match args.kernel {
            CliKernel::Rbf => KernelConfig::Rbf {
                gamma: args.gamma,
                unconstrained: args.unconstrained,
            },
            CliKernel::Linear => KernelConfig::Linear,
            CliKernel::Polynomial => KernelConfig::Polynomial {
                degree: args.degree,
                gamma: args.gamma,
                coef0: args.coef0,
            },
        }
    }
}

#[derive(Args)]
struct MatrixArgs {
    /// Point set (CSV, one point per row)
    #[arg(long)]
    data: PathBuf,

    /// Output report file (optional, prints rows to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    kernel_args: KernelArgs,

    /// Value added to the diagonal
    #[arg(short, long, default_value = "0.0")]
    regularization: f64,

    /// Points per batch
    #[arg(short, long, default_value = "256")]
    batch_size: usize,
}

#[derive(Args)]
struct GradientArgs {
    /// Point set (CSV, one point per row)
    #[arg(long)]
    data: PathBuf,

    /// Weight matrix (CSV, N rows of N values)
    #[arg(short, long)]
    weights: PathBuf,

    /// Output report file (optional, prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    kernel_args: KernelArgs,

    /// Points per batch
    #[arg(short, long, default_value = "256")]
    batch_size: usize,
}

#[derive(Args)]
struct CheckArgs {
    /// Point set (CSV, one point per row)
    #[arg(long)]
    data: PathBuf,

    /// Weight matrix (CSV); defaults to all ones
    #[arg(short, long)]
    weights: Option<PathBuf>,

    #[command(flatten)]
    kernel_args: KernelArgs,

    /// Value added to the diagonal
    #[arg(short, long, default_value = "1.0")]
    regularization: f64,

    /// Points per batch
    #[arg(short, long, default_value = "8")]
    batch_size: usize,

    /// Maximum allowed absolute (matrix) and relative (gradient) difference
    #[arg(short, long, default_value = "1e-10")]
    tolerance: f64,

    /// Memory available to the row cache of the lazily evaluated matrix (MB)
    #[arg(long, default_value = "16")]
    cache_mb: usize,
}

#[derive(Args)]
struct InfoArgs {
    /// Report file
    report: PathBuf,
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
        Commands::Matrix(args) => matrix_command(args),
        Commands::Gradient(args) => gradient_command(args),
        Commands::Check(args) => check_command(args),
        Commands::Info(args) => info_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn load_points(path: &Path, batch_size: usize) -> Result<BatchedDataset> {
    info!("Loading points from: {path:?}");
    let dataset = data::load_dataset(path, batch_size)?;
    info!(
        "Loaded {} points with {} dimensions in {} batches",
        dataset.len(),
        dataset.dim(),
        dataset.number_of_batches()
    );
    Ok(dataset)
}

fn matrix_command(args: MatrixArgs) -> Result<()> {
    let config = HelperConfig {
        regularization: args.regularization,
        batch_size: args.batch_size,
        ..HelperConfig::default()
    };
    config.validate()?;

    let kernel_config = KernelConfig::from(&args.kernel_args);
    let kernel = kernel_config.build()?;
    let dataset = load_points(&args.data, config.batch_size)?;

    info!(
        "Computing {} kernel matrix (~{} bytes)",
        kernel_config,
        memory::estimate_kernel_matrix_memory(dataset.len())
    );
    let kernel_matrix =
        helpers::calculate_regularized_kernel_matrix(&kernel, &dataset, config.regularization)?;

    if let Some(output_path) = args.output {
        let report = Report::KernelMatrix(KernelMatrixReport::new(
            kernel_config,
            config.regularization,
            &kernel_matrix,
            ReportMetadata::new(dataset.len(), dataset.dim(), config.batch_size),
        ));
        report.save_to_file(&output_path)?;
        info!("Kernel matrix saved to: {output_path:?}");
    } else {
        println!("# Kernel matrix {0}x{0} ({kernel_config})", kernel_matrix.nrows());
        for row in kernel_matrix.rows() {
            let line: Vec<String> = row.iter().map(|v| format!("{v:.12}")).collect();
            println!("{}", line.join(","));
        }
    }

    Ok(())
}

fn gradient_command(args: GradientArgs) -> Result<()> {
    let kernel_config = KernelConfig::from(&args.kernel_args);
    let kernel = kernel_config.build()?;
    let dataset = load_points(&args.data, args.batch_size)?;

    info!("Loading weights from: {:?}", args.weights);
    let weights = data::read_matrix_file(&args.weights)?;

    let gradient =
        helpers::calculate_kernel_matrix_parameter_derivative(&kernel, &dataset, &weights)?;
    let report = GradientReport::new(
        kernel_config,
        kernel.parameter_vector(),
        &gradient,
        ReportMetadata::new(dataset.len(), dataset.dim(), args.batch_size),
    );

    if let Some(output_path) = args.output {
        Report::Gradient(report).save_to_file(&output_path)?;
        info!("Gradient saved to: {output_path:?}");
    } else {
        println!("# Weighted parameter derivative ({})", report.kernel);
        for (i, value) in report.gradient.iter().enumerate() {
            println!("{i} {value:.12e}");
        }
    }

    Ok(())
}

fn check_command(args: CheckArgs) -> Result<()> {
    if !args.tolerance.is_finite() || args.tolerance < 0.0 {
        return Err(KernelError::InvalidParameter(format!(
            "tolerance must be a finite non-negative number, got {}",
            args.tolerance
        )));
    }

    let kernel_config = KernelConfig::from(&args.kernel_args);
    let kernel = kernel_config.build()?;
    let dataset = load_points(&args.data, args.batch_size)?;
    let n = dataset.len();

    let weights = match &args.weights {
        Some(path) => data::read_matrix_file(path)?,
        None => Array2::ones((n, n)),
    };

    let batched_matrix =
        helpers::calculate_regularized_kernel_matrix(&kernel, &dataset, args.regularization)?;
    let reference_matrix = reference::kernel_matrix(&kernel, &dataset, args.regularization)?;
    let matrix_difference = matrix::max_abs_difference(&batched_matrix, &reference_matrix);

    let cache_size = memory::recommend_cache_size(n, args.cache_mb);
    let mut cached =
        helpers::CachedKernelMatrix::new(&kernel, &dataset, args.regularization, cache_size)?;
    let cached_matrix = cached.to_dense();
    // A second pass is served from the row cache and must agree exactly
    let cached_repeat = cached.to_dense();
    let cached_difference = matrix::max_abs_difference(&cached_matrix, &batched_matrix)
        .max(matrix::max_abs_difference(&cached_repeat, &cached_matrix));
    let cache_stats = cached.stats();

    let batched_gradient =
        helpers::calculate_kernel_matrix_parameter_derivative(&kernel, &dataset, &weights)?;
    let reference_gradient = reference::parameter_derivative(&kernel, &dataset, &weights)?;
    let gradient_difference =
        matrix::max_relative_difference(&batched_gradient, &reference_gradient);

    println!("=== Batched vs Pairwise Check ===");
    println!("Kernel: {kernel_config}");
    println!("Points: {n}, batch size: {}", args.batch_size);
    println!("Symmetric: {}", matrix::is_symmetric(&batched_matrix, args.tolerance));
    println!("Max matrix difference (absolute): {matrix_difference:.3e}");
    println!("Max gradient difference (relative): {gradient_difference:.3e}");
    println!("Max cached matrix difference (absolute): {cached_difference:.3e}");
    println!(
        "Row cache: {}/{} rows, hit rate {:.1}%",
        cache_stats.size,
        cache_stats.capacity,
        cache_stats.hit_rate() * 100.0
    );

    if matrix_difference > args.tolerance
        || gradient_difference > args.tolerance
        || cached_difference > args.tolerance
    {
        return Err(KernelError::InvalidDataset(format!(
            "batched results differ from pairwise evaluation beyond tolerance {}",
            args.tolerance
        )));
    }

    println!("Check passed");
    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    info!("Loading report from: {:?}", args.report);
    let report = Report::load_from_file(&args.report)?;
    report.print_summary()
}
