use crate::integrator::IntegrationParams;
use crate::operator::FilterKind;
use anyhow::{anyhow, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Filter selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub kind: FilterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>, // Only used by prince_de_galles
}

/// Time stepping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationConfig {
    #[serde(default)]
    pub t0: f64,
    #[serde(default = "default_h")]
    pub h: f64,
    #[serde(default = "default_nbiter")]
    pub nbiter: usize,
}

fn default_h() -> f64 {
    0.01
}

fn default_nbiter() -> usize {
    100
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            t0: 0.0,
            h: default_h(),
            nbiter: default_nbiter(),
        }
    }
}

impl IntegrationConfig {
    fn validate(&self) -> Result<()> {
        if !self.t0.is_finite() {
            return Err(anyhow!("t0 must be finite, got {}", self.t0));
        }
        if !self.h.is_finite() || self.h <= 0.0 {
            return Err(anyhow!("h must be finite and positive, got {}", self.h));
        }
        if self.h > 0.25 {
            warn!(
                "Step size h={} is large for explicit RK4 on these stencils, output may blow up",
                self.h
            );
        }
        Ok(())
    }

    pub fn params(&self) -> IntegrationParams {
        IntegrationParams::new(self.t0, self.h, self.nbiter)
    }
}

/// Run options that do not change the numerics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_report_period")]
    pub report_period: usize,
    #[serde(default)]
    pub parallel_channels: bool,
}

fn default_report_period() -> usize {
    10
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            report_period: default_report_period(),
            parallel_channels: false,
        }
    }
}

impl RunConfig {
    fn validate(&self) -> Result<()> {
        if self.report_period == 0 {
            return Err(anyhow!("report_period must be positive"));
        }
        Ok(())
    }
}

/// Complete filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub filter: FilterConfig,
    #[serde(default)]
    pub integration: IntegrationConfig,
    #[serde(default)]
    pub run: RunConfig,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| anyhow!("Failed to parse TOML config: {}", e))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<()> {
        self.integration.validate()?;
        self.run.validate()?;

        if self.input == self.output {
            return Err(anyhow!(
                "Output path must differ from input path ({})",
                self.input.display()
            ));
        }
        if self.filter.seed.is_some() && self.filter.kind != FilterKind::PrinceDeGalles {
            warn!(
                "seed is ignored by the {:?} filter, it only applies to prince_de_galles",
                self.filter.kind
            );
        }
        if self.run.parallel_channels && self.filter.kind == FilterKind::PrinceDeGalles {
            warn!("Parallel channels draw different random stencils than a sequential run");
        }

        Ok(())
    }

    /// Log configuration summary
    pub fn log_summary(&self) {
        info!("=== Filter Configuration ===");
        info!("Input: {}", self.input.display());
        info!("Output: {}", self.output.display());
        match self.filter.seed {
            Some(seed) => info!("Filter: {:?} (seed={})", self.filter.kind, seed),
            None => info!("Filter: {:?}", self.filter.kind),
        }
        let params = self.integration.params();
        info!(
            "Integration: t0={}, h={}, nbiter={}, final t={}",
            params.t0,
            params.h,
            params.nbiter,
            params.final_time()
        );
        info!(
            "Channels: {}",
            if self.run.parallel_channels {
                "parallel"
            } else {
                "sequential"
            }
        );
        info!("============================");
    }
}
