//! Kernel configuration files and normalization reports
//!
//! Kernels over dense vectors can be described in JSON and rebuilt later:
//!
//! ```json
//! {
//!   "type": "scaled",
//!   "kernel": {
//!     "type": "weighted_sum",
//!     "kernels": [
//!       { "weight": 0.5, "kernel": { "type": "rbf", "gamma": 0.1 } },
//!       { "kernel": { "type": "polynomial", "degree": 2, "offset": 1.0 } }
//!     ]
//!   }
//! }
//! ```
//!
//! Training results are written as a [`NormalizationReport`].

use crate::core::{Dataset, KernelError, Result};
use crate::kernel::{
    KernelFunction, LinearKernel, PolynomialKernel, RBFKernel, ScaledKernel, SharedKernel,
    SubrangeKernel, WeightedSumKernel,
};
use crate::trainer::{feature_space_variance, VarianceNormalizationTrainer};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::{Arc, RwLock};

fn one() -> f64 {
    1.0
}

/// Serializable description of a kernel over dense vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KernelSpec {
    Rbf {
        gamma: f64,
    },
    Linear,
    Polynomial {
        degree: u32,
        #[serde(default = "one")]
        offset: f64,
    },
    WeightedSum {
        kernels: Vec<WeightedComponent>,
    },
    Subrange {
        dim: usize,
        parts: Vec<SubrangePart>,
    },
    Scaled {
        #[serde(default = "one")]
        factor: f64,
        kernel: Box<KernelSpec>,
    },
}

/// Child of a weighted sum, weight defaults to 1.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedComponent {
    #[serde(default = "one")]
    pub weight: f64,
    pub kernel: KernelSpec,
}

/// Child of a subrange product acting on `start..end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubrangePart {
    pub start: usize,
    pub end: usize,
    pub kernel: KernelSpec,
}

fn erase<K: KernelFunction<[f64]> + 'static>(kernel: K) -> SharedKernel<[f64]> {
    Arc::new(RwLock::new(kernel))
}

impl KernelSpec {
    /// Parse a spec from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| KernelError::SerializationError(e.to_string()))
    }

    /// Load a spec from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| KernelError::SerializationError(e.to_string()))
    }

    /// Save the spec as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| KernelError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Kernel type identifier, as in the `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            KernelSpec::Rbf { .. } => "rbf",
            KernelSpec::Linear => "linear",
            KernelSpec::Polynomial { .. } => "polynomial",
            KernelSpec::WeightedSum { .. } => "weighted_sum",
            KernelSpec::Subrange { .. } => "subrange",
            KernelSpec::Scaled { .. } => "scaled",
        }
    }

    /// Build the described kernel
    ///
    /// Every node gets a fresh kernel; a spec cannot express sharing.
    pub fn build(&self) -> Result<SharedKernel<[f64]>> {
        let kernel = match self {
            KernelSpec::Rbf { gamma } => erase(RBFKernel::new(*gamma)?),
            KernelSpec::Linear => erase(LinearKernel::new()),
            KernelSpec::Polynomial { degree, offset } => {
                erase(PolynomialKernel::new(*degree, *offset)?)
            }
            KernelSpec::WeightedSum { kernels } => {
                let children = kernels
                    .iter()
                    .map(|c| c.kernel.build())
                    .collect::<Result<Vec<_>>>()?;
                let weights = kernels.iter().map(|c| c.weight).collect();
                erase(WeightedSumKernel::with_weights(children, weights)?)
            }
            KernelSpec::Subrange { dim, parts } => {
                let children = parts
                    .iter()
                    .map(|p| -> Result<_> { Ok((p.kernel.build()?, p.start..p.end)) })
                    .collect::<Result<Vec<_>>>()?;
                erase(SubrangeKernel::new(*dim, children)?)
            }
            KernelSpec::Scaled { .. } => erase(self.build_scaled()?),
        };
        Ok(kernel)
    }

    /// Build the kernel wrapped in a [`ScaledKernel`]
    ///
    /// A top-level `scaled` spec is used as the wrapper itself, anything
    /// else is wrapped with a factor of 1.0.
    pub fn build_scaled(&self) -> Result<ScaledKernel<[f64]>> {
        match self {
            KernelSpec::Scaled { factor, kernel } => {
                ScaledKernel::with_factor(kernel.build()?, *factor)
            }
            _ => Ok(ScaledKernel::new(self.build()?)),
        }
    }

    /// Spec of this kernel under a new top-level factor
    pub fn with_factor(&self, factor: f64) -> KernelSpec {
        let inner = match self {
            KernelSpec::Scaled { kernel, .. } => kernel.as_ref().clone(),
            other => other.clone(),
        };
        KernelSpec::Scaled {
            factor,
            kernel: Box::new(inner),
        }
    }
}

/// Result of a variance normalization run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationReport {
    /// Normalized kernel, ready to be loaded again
    pub kernel: KernelSpec,
    /// Trained scale factor
    pub factor: f64,
    /// Mean kernel value of the unscaled kernel
    pub mean: f64,
    /// Mean diagonal value of the unscaled kernel
    pub trace: f64,
    /// Feature-space variance of the scaled kernel, recomputed
    pub variance: f64,
    /// Number of samples
    pub samples: usize,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Library version used to create the report
    pub library_version: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl NormalizationReport {
    /// Summarize a finished training run
    ///
    /// The variance of the scaled kernel is evaluated again over `data`.
    pub fn from_training<D>(
        spec: &KernelSpec,
        kernel: &ScaledKernel<[f64]>,
        trainer: &VarianceNormalizationTrainer,
        data: &D,
    ) -> Result<Self>
    where
        D: Dataset<Element = [f64]> + ?Sized,
    {
        Ok(Self {
            kernel: spec.with_factor(kernel.factor()),
            factor: kernel.factor(),
            mean: trainer.mean(),
            trace: trainer.trace(),
            variance: feature_space_variance(kernel, data)?,
            samples: data.len(),
            metadata: ReportMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        })
    }

    /// Save report to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| KernelError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load report from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let report = serde_json::from_reader(reader)
            .map_err(|e| KernelError::SerializationError(e.to_string()))?;
        Ok(report)
    }

    /// Print report summary
    pub fn print_summary(&self) {
        println!("=== Variance Normalization ===");
        println!("Kernel Type: {}", self.kernel.kind());
        println!("Samples: {}", self.samples);
        println!("Mean: {:.6}", self.mean);
        println!("Trace: {:.6}", self.trace);
        println!("Factor: {:.6}", self.factor);
        println!("Variance: {:.6}", self.variance);
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DenseDataset;
    use crate::kernel::{read_kernel, Parameterized};
    use approx::assert_relative_eq;
    use tempfile::NamedTempFile;

    const NESTED: &str = r#"{
        "type": "scaled",
        "factor": 2.0,
        "kernel": {
            "type": "weighted_sum",
            "kernels": [
                { "weight": 0.5, "kernel": { "type": "rbf", "gamma": 0.1 } },
                { "kernel": { "type": "polynomial", "degree": 2 } }
            ]
        }
    }"#;

    #[test]
    fn test_parse_nested_spec() {
        let spec = KernelSpec::from_json(NESTED).unwrap();
        assert_eq!(spec.kind(), "scaled");

        match &spec {
            KernelSpec::Scaled { factor, kernel } => {
                assert_eq!(*factor, 2.0);
                match kernel.as_ref() {
                    KernelSpec::WeightedSum { kernels } => {
                        assert_eq!(kernels[1].weight, 1.0);
                        assert_eq!(
                            kernels[1].kernel,
                            KernelSpec::Polynomial {
                                degree: 2,
                                offset: 1.0
                            }
                        );
                    }
                    other => panic!("unexpected inner spec {other:?}"),
                }
            }
            other => panic!("unexpected spec {other:?}"),
        }
    }

    #[test]
    fn test_build_evaluates_like_spec() {
        let kernel = KernelSpec::from_json(NESTED).unwrap().build_scaled().unwrap();
        assert_eq!(kernel.factor(), 2.0);

        let x = [1.0, 0.0];
        let y = [0.0, 1.0];
        // 2 * (0.5 * exp(-0.2) + (0 + 1)²)
        let expected = 2.0 * (0.5 * (-0.2_f64).exp() + 1.0);
        assert_relative_eq!(kernel.eval(&x[..], &y[..]).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_build_subrange() {
        let spec = KernelSpec::from_json(
            r#"{"type": "subrange", "dim": 4, "parts": [
                {"start": 0, "end": 2, "kernel": {"type": "linear"}},
                {"start": 2, "end": 4, "kernel": {"type": "rbf", "gamma": 1.0}}
            ]}"#,
        )
        .unwrap();
        let kernel = spec.build().unwrap();
        let x = [1.0, 2.0, 0.0, 0.0];
        let value = read_kernel(&kernel).eval(&x[..], &x[..]).unwrap();
        assert_relative_eq!(value, 5.0, epsilon = 1e-12);
        assert_eq!(read_kernel(&kernel).number_of_slots(), 2);
    }

    #[test]
    fn test_invalid_specs() {
        let bad_gamma = KernelSpec::from_json(r#"{"type": "rbf", "gamma": -1.0}"#).unwrap();
        assert!(matches!(bad_gamma.build(), Err(KernelError::InvalidParameter(_))));

        let bad_range = KernelSpec::Subrange {
            dim: 2,
            parts: vec![SubrangePart {
                start: 1,
                end: 3,
                kernel: KernelSpec::Linear,
            }],
        };
        assert!(matches!(bad_range.build(), Err(KernelError::InvalidRange { .. })));

        let empty = KernelSpec::WeightedSum {
            kernels: Vec::new(),
        };
        assert!(matches!(empty.build(), Err(KernelError::EmptyComposite)));

        assert!(matches!(
            KernelSpec::from_json(r#"{"type": "sigmoid"}"#),
            Err(KernelError::SerializationError(_))
        ));
    }

    #[test]
    fn test_with_factor_replaces_wrapper() {
        let spec = KernelSpec::from_json(NESTED).unwrap();
        match spec.with_factor(0.25) {
            KernelSpec::Scaled { factor, kernel } => {
                assert_eq!(factor, 0.25);
                assert_eq!(kernel.kind(), "weighted_sum");
            }
            other => panic!("unexpected spec {other:?}"),
        }
    }

    #[test]
    fn test_spec_file_round_trip() {
        let spec = KernelSpec::from_json(NESTED).unwrap();
        let file = NamedTempFile::new().unwrap();
        spec.save_to_file(file.path()).unwrap();
        assert_eq!(KernelSpec::from_file(file.path()).unwrap(), spec);
    }

    #[test]
    fn test_report_from_training() -> Result<()> {
        let spec = KernelSpec::Rbf { gamma: 0.5 };
        let mut kernel = spec.build_scaled()?;
        let data = DenseDataset::new(vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 2.0]])?;

        let mut trainer = VarianceNormalizationTrainer::new();
        trainer.train(&mut kernel, &data)?;
        let report = NormalizationReport::from_training(&spec, &kernel, &trainer, &data)?;

        assert_eq!(report.samples, 3);
        assert_eq!(report.trace, 1.0);
        assert_relative_eq!(report.variance, 1.0, epsilon = 1e-12);
        assert_relative_eq!(report.factor, 1.0 / (report.trace - report.mean), epsilon = 1e-12);
        assert!(chrono::DateTime::parse_from_rfc3339(&report.metadata.created_at).is_ok());

        let file = NamedTempFile::new().unwrap();
        report.save_to_file(file.path())?;
        let loaded = NormalizationReport::load_from_file(file.path())?;
        assert_eq!(loaded.kernel, report.kernel);
        assert_eq!(loaded.samples, 3);

        // The saved kernel reproduces the normalized one
        let rebuilt = loaded.kernel.build_scaled()?;
        assert_relative_eq!(rebuilt.factor(), kernel.factor(), epsilon = 1e-12);
        Ok(())
    }
}
