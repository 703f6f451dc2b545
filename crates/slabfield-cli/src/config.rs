//! TOML configuration deserialisation for field jobs.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;
use slabfield_core::FieldParams;
use slabfield_geometry::parsers::fractional::read_fractional;
use slabfield_geometry::{AtomSpecies, UnitCell};

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub efield: FieldParams,
    pub cell: CellConfig,
    pub grid: GridConfig,
    #[serde(default)]
    pub spin: SpinConfig,
    pub density: DensityConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Unit cell from TOML.
#[derive(Debug, Deserialize)]
pub struct CellConfig {
    /// Lattice constant (Bohr).
    pub lat0: f64,
    /// Lattice vectors as rows, in units of `lat0`.
    pub latvec: [[f64; 3]; 3],
    pub species: Vec<SpeciesConfig>,
}

/// One atomic species, with positions inline or in a fractional-coordinate file.
#[derive(Debug, Deserialize)]
pub struct SpeciesConfig {
    pub label: String,
    pub zv: f64,
    #[serde(default)]
    pub positions: Vec<[f64; 3]>,
    /// Atoms from this file whose label matches are appended to `positions`.
    pub positions_file: Option<PathBuf>,
}

/// Real-space grid and its decomposition.
#[derive(Debug, Deserialize)]
pub struct GridConfig {
    /// Global dimensions `(ncx, ncy, ncz)`.
    pub dims: [usize; 3],
    /// Number of slabs along the third axis, each run on its own thread.
    #[serde(default = "default_partitions")]
    pub partitions: usize,
}

fn default_partitions() -> usize {
    1
}

#[derive(Debug, Deserialize)]
pub struct SpinConfig {
    /// 1, 2 or 4.
    #[serde(default = "default_nspin")]
    pub nspin: usize,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self { nspin: default_nspin() }
    }
}

fn default_nspin() -> usize {
    1
}

/// A Gaussian electron sheet along the field axis.
#[derive(Debug, Deserialize)]
pub struct DensityConfig {
    /// Sheet centre (fractional, along the field axis).
    pub centre: f64,
    /// Gaussian width (fractional).
    pub width: f64,
    /// Number of electrons in the cell.
    pub electrons: f64,
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to write the planar-averaged potential profile as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_profile: bool,
    /// Whether to write the report and forces as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_profile: true,
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

/// Load and parse a TOML job configuration file.
///
/// Relative `positions_file` paths are resolved against the job file's directory.
pub fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut config: JobConfig = toml::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for species in &mut config.cell.species {
        if let Some(file) = species.positions_file.as_mut() {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
    }

    if !(config.density.width.is_finite() && config.density.width > 0.0) {
        bail!("density.width must be positive and finite, got {}", config.density.width);
    }
    Ok(config)
}

impl CellConfig {
    /// Assemble the unit cell, reading any positions files.
    pub fn build(&self) -> anyhow::Result<UnitCell> {
        let mut species = Vec::with_capacity(self.species.len());
        for s in &self.species {
            let mut positions = s.positions.clone();
            if let Some(file) = &s.positions_file {
                let atoms = read_fractional(file)
                    .with_context(|| format!("reading positions for '{}' from {}", s.label, file.display()))?;
                positions.extend(atoms.into_iter().filter(|a| a.label == s.label).map(|a| a.position));
            }
            if positions.is_empty() {
                log::warn!("species '{}' has no atoms", s.label);
            }
            species.push(AtomSpecies::new(s.label.clone(), s.zv, positions));
        }
        Ok(UnitCell::new(self.lat0, self.latvec, species)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB: &str = r#"
[efield]
efield_dir = 2
efield_amp = 0.001
dip_cor_flag = true

[cell]
lat0 = 10.0
latvec = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 3.0]]

[[cell.species]]
label = "Na"
zv = 1.0
positions = [[0.0, 0.0, 0.3]]

[grid]
dims = [4, 4, 24]
partitions = 3

[density]
centre = 0.3
width = 0.02
electrons = 1.0
"#;

    #[test]
    fn test_non_finite_sheet_width_is_rejected() {
        let dir = std::env::temp_dir().join(format!("slabfield-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for width in ["nan", "inf", "0.0"] {
            let path = dir.join(format!("job-{}.toml", width));
            let job = JOB.replace("width = 0.02", &format!("width = {}", width));
            std::fs::write(&path, job).unwrap();
            let err = load_config(&path).unwrap_err();
            assert!(err.to_string().contains("density.width"), "width = {}", width);
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_parse_job_with_defaults() {
        let job: JobConfig = toml::from_str(JOB).unwrap();
        assert_eq!(job.efield.efield_dir, 2);
        assert!(job.efield.dip_cor_flag);
        // unspecified field options keep their defaults
        assert_eq!(job.efield.efield_pos_max, 0.5);
        assert_eq!(job.efield.efield_pos_dec, 0.1);
        assert_eq!(job.spin.nspin, 1);
        assert_eq!(job.grid.partitions, 3);
        assert!(job.output.save_profile);

        let cell = job.cell.build().unwrap();
        assert_eq!(cell.n_atoms(), 1);
        assert!((cell.omega() - 3000.0).abs() < 1e-9);
    }
}
