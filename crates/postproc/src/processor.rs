//! Programmatic surface tying the registry, decoder and interpolators together.

use crate::depvar::{self, DepvarOptions, DepvarSeries};
use crate::temporal::{self, ResampleOptions};
use crate::zonebudget::{self, ZoneBudget};
use grid_registry::{GridRegistry, GridSummary, StructuredGridSpec, VertexGridSpec};
use gw_common::{
    FactorFileFormat, FactorMethod, OutputKind, PostprocConfig, PostprocError, Precision,
    QueryPoints, Result, Simulator, TimeSeriesTable,
};
use interp_factors::{read_factor_file, FactorSet};
use mf_binary::FileSpecs;
use std::borrow::Cow;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Where a depvar interpolation takes its factors from.
#[derive(Debug, Clone, Copy)]
pub enum Factors<'a> {
    /// A set already in memory.
    Set(&'a FactorSet),
    /// A factor file written by `calc_interp_factors`.
    File(&'a Path, FactorFileFormat),
}

/// Owns a grid registry and the processing defaults.
///
/// Every installed grid is released when the processor is dropped.
#[derive(Debug)]
pub struct PostProcessor {
    registry: GridRegistry,
    config: PostprocConfig,
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self {
            registry: GridRegistry::new(),
            config: PostprocConfig::default(),
        }
    }
}

impl PostProcessor {
    pub fn new(config: PostprocConfig) -> Result<Self> {
        config.validate().map_err(PostprocError::Config)?;
        Ok(Self {
            registry: GridRegistry::new(),
            config,
        })
    }

    /// Processor configured from `GWPP_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(PostprocConfig::from_env())
    }

    pub fn config(&self) -> &PostprocConfig {
        &self.config
    }

    pub fn registry(&self) -> &GridRegistry {
        &self.registry
    }

    /// Depvar options seeded from the configured defaults.
    pub fn depvar_options(&self, label: impl Into<String>) -> DepvarOptions {
        DepvarOptions::from_config(label, &self.config)
    }

    /// Resampling options seeded from the configured defaults.
    pub fn resample_options(&self) -> ResampleOptions {
        ResampleOptions::from_config(&self.config)
    }

    #[instrument(skip(self, spec), fields(ncol = spec.ncol, nrow = spec.nrow, nlay = spec.nlay))]
    pub fn install_structured(
        &mut self,
        name: &str,
        spec: StructuredGridSpec,
    ) -> Result<GridSummary> {
        self.registry.install_structured(name, spec)
    }

    #[instrument(skip(self, spec), fields(nlay = spec.nlay, ncpl = spec.cells.len()))]
    pub fn install_vertex(&mut self, name: &str, spec: VertexGridSpec) -> Result<GridSummary> {
        self.registry.install_vertex(name, spec)
    }

    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn install_from_grb(&mut self, name: &str, path: impl AsRef<Path>) -> Result<GridSummary> {
        self.registry.install_from_grb(name, path)
    }

    #[instrument(skip(self))]
    pub fn uninstall(&mut self, name: &str) -> Result<()> {
        self.registry.uninstall(name)
    }

    /// Uninstall every grid, returning how many were released.
    #[instrument(skip(self))]
    pub fn release_all(&mut self) -> usize {
        let released = self.registry.release_all();
        info!(released, "Released all grids");
        released
    }

    /// Compute and persist factors; `None` selects the configured method or format.
    #[instrument(
        skip(self, points, factor_path, boundary_path),
        fields(npts = points.len(), factor_file = %factor_path.as_ref().display())
    )]
    pub fn calc_interp_factors(
        &self,
        grid_name: &str,
        points: &QueryPoints,
        method: Option<FactorMethod>,
        factor_path: impl AsRef<Path>,
        format: Option<FactorFileFormat>,
        boundary_path: impl AsRef<Path>,
    ) -> Result<FactorSet> {
        interp_factors::calc_interp_factors(
            &self.registry,
            grid_name,
            points,
            method.unwrap_or(self.config.factor_method),
            factor_path,
            format.unwrap_or(self.config.factor_format),
            boundary_path,
        )
    }

    #[instrument(skip(self, path, table_path), fields(path = %path.as_ref().display()))]
    pub fn inquire_file_specs(
        &self,
        path: impl AsRef<Path>,
        simulator: Simulator,
        kind: OutputKind,
        precision: Option<Precision>,
        table_path: Option<&Path>,
    ) -> Result<FileSpecs> {
        mf_binary::inquire(path, simulator, kind, precision, table_path)
    }

    #[instrument(
        skip(self, path, factors, options),
        fields(path = %path.as_ref().display(), label = %options.label)
    )]
    pub fn interp_from_depvar_file(
        &self,
        path: impl AsRef<Path>,
        simulator: Simulator,
        precision: Option<Precision>,
        factors: Factors<'_>,
        options: &DepvarOptions,
    ) -> Result<DepvarSeries> {
        let set: Cow<'_, FactorSet> = match factors {
            Factors::Set(set) => Cow::Borrowed(set),
            Factors::File(factor_path, format) => {
                Cow::Owned(read_factor_file(factor_path, format)?)
            }
        };
        self.check_factor_origin(&set);
        depvar::interp_from_depvar_file(path, simulator, precision, &set, options)
    }

    #[instrument(
        skip(self, path, points, options),
        fields(path = %path.as_ref().display(), label = %options.label)
    )]
    pub fn interp_from_structured_grid(
        &self,
        grid_name: &str,
        path: impl AsRef<Path>,
        simulator: Simulator,
        precision: Option<Precision>,
        points: &QueryPoints,
        options: &DepvarOptions,
    ) -> Result<DepvarSeries> {
        depvar::interp_from_structured_grid(
            &self.registry,
            grid_name,
            path,
            simulator,
            precision,
            points,
            options,
        )
    }

    #[allow(clippy::too_many_arguments)]
    #[instrument(
        skip(self, path, zones),
        fields(path = %path.as_ref().display(), ncells = zones.len())
    )]
    pub fn extract_flows_from_cbc_file(
        &self,
        path: impl AsRef<Path>,
        simulator: Simulator,
        precision: Option<Precision>,
        label: &str,
        zones: &[i32],
        nzone: usize,
        max_times: Option<usize>,
    ) -> Result<ZoneBudget> {
        zonebudget::extract_flows_from_cbc_file(
            path, simulator, precision, label, zones, nzone, max_times,
        )
    }

    #[instrument(skip(self, table, options, requests), fields(nobs = requests.len()))]
    pub fn interp_to_obstime(
        &self,
        table: &TimeSeriesTable,
        nproc: usize,
        options: &ResampleOptions,
        requests: &[(i32, f64)],
    ) -> Result<Vec<f64>> {
        temporal::interp_to_obstime(table, nproc, options, requests)
    }

    /// Warn when a factor set was computed against a grid that has since
    /// been uninstalled or replaced.
    fn check_factor_origin(&self, set: &FactorSet) {
        let Some(name) = set.grid_name() else {
            return;
        };
        match self.registry.get(name) {
            Ok(grid) if set.matches_grid(grid) => {}
            Ok(grid) => warn!(
                grid = %name,
                computed_for = ?set.snapshot(),
                installed = grid.snapshot(),
                "Factors were computed for an earlier installation of this grid"
            ),
            Err(_) => warn!(grid = %name, "Factors refer to a grid that is no longer installed"),
        }
    }
}

impl Drop for PostProcessor {
    fn drop(&mut self) {
        let released = self.registry.release_all();
        if released > 0 {
            info!(released, "Released grids on shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gw_common::ErrorKind;

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PostprocConfig::default();
        config.time_extrap = -1.0;
        let err = PostProcessor::new(config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_options_follow_config() {
        let mut config = PostprocConfig::default();
        config.no_interp_value = -999.0;
        config.reapportion = true;
        let processor = PostProcessor::new(config).unwrap();
        let options = processor.depvar_options("HEAD");
        assert_eq!(options.no_interp_value, -999.0);
        assert!(options.reapportion);
        assert_eq!(processor.resample_options().no_interp_value, -999.0);
    }

    #[test]
    fn test_release_all_counts() {
        let mut processor = PostProcessor::default();
        processor
            .install_structured("a", StructuredGridSpec::uniform(2, 2, 1, 1.0, 1.0))
            .unwrap();
        processor
            .install_structured("b", StructuredGridSpec::uniform(2, 2, 1, 1.0, 1.0))
            .unwrap();
        assert_eq!(processor.registry().names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(processor.release_all(), 2);
        assert!(matches!(processor.uninstall("a"), Err(PostprocError::GridUninstalled(_))));
    }
}
