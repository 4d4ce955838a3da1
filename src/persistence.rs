//! Serialization of computed kernel matrices and gradients
//!
//! Reports carry the result together with the kernel description and the
//! settings that produced it, so the CLI can save results and inspect them
//! later.

use crate::core::{KernelError, Result};
use crate::kernel::KernelConfig;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Metadata recorded with every report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Library version used to create the report
    pub library_version: String,
    /// Number of points in the dataset
    pub n_points: usize,
    /// Dimension of the points
    pub dimension: usize,
    /// Batch size used for the computation
    pub batch_size: usize,
    /// Creation timestamp
    pub created_at: String,
}

impl ReportMetadata {
    pub fn new(n_points: usize, dimension: usize, batch_size: usize) -> Self {
        Self {
            library_version: env!("CARGO_PKG_VERSION").to_string(),
            n_points,
            dimension,
            batch_size,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Serializable regularized kernel matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelMatrixReport {
    pub kernel: KernelConfig,
    pub regularization: f64,
    /// Matrix rows
    pub matrix: Vec<Vec<f64>>,
    pub metadata: ReportMetadata,
}

impl KernelMatrixReport {
    pub fn new(
        kernel: KernelConfig,
        regularization: f64,
        matrix: &Array2<f64>,
        metadata: ReportMetadata,
    ) -> Self {
        Self {
            kernel,
            regularization,
            matrix: matrix.rows().into_iter().map(|row| row.to_vec()).collect(),
            metadata,
        }
    }

    /// Convert the stored rows back into a dense matrix
    pub fn to_array(&self) -> Result<Array2<f64>> {
        let rows = self.matrix.len();
        let cols = self.matrix.first().map(Vec::len).unwrap_or(0);
        let mut flat = Vec::with_capacity(rows * cols);
        for row in &self.matrix {
            if row.len() != cols {
                return Err(KernelError::DimensionMismatch {
                    expected: cols,
                    actual: row.len(),
                });
            }
            flat.extend_from_slice(row);
        }
        Array2::from_shape_vec((rows, cols), flat)
            .map_err(|e| KernelError::SerializationError(e.to_string()))
    }

    /// Save report to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_json(self, path)
    }

    /// Load report from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_json(path)
    }

    /// Print report summary
    ///
    /// # Errors
    /// `DimensionMismatch` if the stored rows do not form a square matrix.
    pub fn print_summary(&self) -> Result<()> {
        let matrix = self.to_array()?;
        let (n, cols) = matrix.dim();
        if n != cols {
            return Err(KernelError::DimensionMismatch {
                expected: n,
                actual: cols,
            });
        }

        println!("=== Kernel Matrix Report ===");
        println!("Kernel: {}", self.kernel);
        println!("Regularization: {}", self.regularization);
        println!("Size: {n}x{n}");
        if n > 0 {
            println!("Trace: {:.6}", matrix.diag().sum());
        }
        print_metadata(&self.metadata);
        Ok(())
    }
}

/// Serializable weighted parameter derivative
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientReport {
    pub kernel: KernelConfig,
    /// Kernel parameter vector at which the derivative was taken
    pub parameters: Vec<f64>,
    pub gradient: Vec<f64>,
    pub metadata: ReportMetadata,
}

impl GradientReport {
    pub fn new(
        kernel: KernelConfig,
        parameters: Vec<f64>,
        gradient: &Array1<f64>,
        metadata: ReportMetadata,
    ) -> Self {
        Self {
            kernel,
            parameters,
            gradient: gradient.to_vec(),
            metadata,
        }
    }

    /// Save report to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_json(self, path)
    }

    /// Load report from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_json(path)
    }

    /// Print report summary
    pub fn print_summary(&self) {
        println!("=== Kernel Gradient Report ===");
        println!("Kernel: {}", self.kernel);
        println!("Parameters: {:?}", self.parameters);
        println!("Gradient: {:?}", self.gradient);
        print_metadata(&self.metadata);
    }
}

/// Any report the CLI can inspect
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum Report {
    KernelMatrix(KernelMatrixReport),
    Gradient(GradientReport),
}

impl Report {
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_json(self, path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_json(path)
    }

    pub fn print_summary(&self) -> Result<()> {
        match self {
            Report::KernelMatrix(report) => report.print_summary(),
            Report::Gradient(report) => {
                report.print_summary();
                Ok(())
            }
        }
    }
}

fn print_metadata(metadata: &ReportMetadata) {
    println!("Points: {}", metadata.n_points);
    println!("Dimension: {}", metadata.dimension);
    println!("Batch size: {}", metadata.batch_size);
    println!("Library Version: {}", metadata.library_version);
    println!("Created: {}", metadata.created_at);
}

fn save_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let file = File::create(path).map_err(KernelError::IoError)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)
        .map_err(|e| KernelError::SerializationError(e.to_string()))
}

fn load_json<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> Result<T> {
    let file = File::open(path).map_err(KernelError::IoError)?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| KernelError::SerializationError(e.to_string()))
}
