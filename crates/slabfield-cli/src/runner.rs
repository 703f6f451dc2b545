//! Field runner: ties together cell, grid partitions, density and the field engine.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use ndarray::Array2;
use serde::Serialize;

use slabfield_compute::{thread_group, GlobalReduce};
use slabfield_core::force::field_forces;
use slabfield_core::potential::{add_efield, FieldStep};
use slabfield_core::{FieldReport, FieldState, SpinChannels};
use slabfield_geometry::{GridPartition, UnitCell};

use crate::config::{DensityConfig, JobConfig};

/// Results from a field run.
pub struct FieldOutput {
    pub report: FieldReport,
    /// Per-atom forces (Ry/Bohr), shape `(n_atoms, 3)`.
    pub forces: Array2<f64>,
    /// Planar average of the spin-0 potential, one value per plane along the field axis.
    pub profile: Vec<f64>,
    /// Length of the cell along the field axis (Bohr).
    pub axis_length: f64,
    pub partitions: Vec<GridPartition>,
}

/// Run one field step on every partition, one thread per partition.
pub fn run_field(job: &JobConfig) -> Result<FieldOutput> {
    let state = FieldState::configure(&job.efield)?;
    let cell = job.cell.build()?;
    let spin = SpinChannels::try_from(job.spin.nspin)?;
    let partitions = GridPartition::split(job.grid.dims, job.grid.partitions)?;
    let axis = state.axis().index();

    println!(
        "  Cell: lat0={} Bohr, omega={:.4} Bohr^3, {} atoms",
        cell.lat0(),
        cell.omega(),
        cell.n_atoms()
    );
    println!(
        "  Grid: {:?} in {} partitions, nspin={}",
        job.grid.dims,
        partitions.len(),
        spin.stored()
    );

    let weights = sheet_weights(&job.density, job.grid.dims[axis])?;
    let ranks = thread_group(partitions.len());

    let results: Vec<Result<(FieldState, FieldStep)>> = std::thread::scope(|s| {
        let handles: Vec<_> = partitions
            .iter()
            .zip(&ranks)
            .map(|(grid, rank)| {
                let mut state = state.clone();
                let cell = &cell;
                let weights = &weights;
                // Every rank must reach the reduction in add_efield: a rank that
                // fails or panics alone leaves the others blocked on the barrier.
                s.spawn(move || -> Result<(FieldState, FieldStep)> {
                    let info = rank.group_info();
                    log::debug!(
                        "rank {}/{} owns planes {}..{}",
                        info.rank,
                        info.size,
                        grid.nczp_start(),
                        grid.nczp_start() + grid.nczp()
                    );
                    let rho = synthesise_density(cell, grid, spin, axis, &job.density, weights);
                    let step = add_efield(&mut state, cell, grid, spin, rho.view(), rank)
                        .with_context(|| format!("field step on rank {}", info.rank))?;
                    Ok((state, step))
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| {
                h.join()
                    .map_err(|_| anyhow!("partition thread panicked"))
                    .and_then(|r| r)
            })
            .collect()
    });

    let mut steps = Vec::with_capacity(results.len());
    for result in results {
        steps.push(result?);
    }
    let (state, first) = steps
        .first()
        .ok_or_else(|| anyhow!("no partitions were run"))?;

    let forces = field_forces(&cell, state)?;
    let profile = planar_average(
        steps.iter().map(|(_, step)| step),
        &partitions,
        axis,
    );
    let a = cell.lattice_vector(axis);
    let axis_length = (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt() * cell.lat0();

    Ok(FieldOutput {
        report: first.report.clone(),
        forces,
        profile,
        axis_length,
        partitions,
    })
}

/// Periodic Gaussian weights of the electron sheet, one per plane along the field axis.
fn sheet_weights(density: &DensityConfig, n_axis: usize) -> Result<Vec<f64>> {
    let weights: Vec<f64> = (0..n_axis)
        .map(|k| {
            let x = k as f64 / n_axis as f64 - density.centre;
            let d = x - x.round();
            (-0.5 * (d / density.width).powi(2)).exp()
        })
        .collect();
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(anyhow!(
            "density sheet of width {} is not resolved by {} planes",
            density.width,
            n_axis
        ));
    }
    Ok(weights)
}

/// Local density of the electron sheet, normalised so that
/// `Σ ρ · Ω / N = electrons` over the whole grid.
fn synthesise_density(
    cell: &UnitCell,
    grid: &GridPartition,
    spin: SpinChannels,
    axis: usize,
    density: &DensityConfig,
    weights: &[f64],
) -> Array2<f64> {
    let n_axis = weights.len() as f64;
    let scale = density.electrons * n_axis / (cell.omega() * weights.iter().sum::<f64>());
    // Collinear charge is shared equally between up and down.
    let share = 1.0 / spin.active() as f64;

    let mut rho = Array2::zeros((spin.stored(), grid.local_len()));
    for ir in 0..grid.local_len() {
        let value = scale * weights[grid.indices(ir)[axis]] * share;
        for is in 0..spin.active() {
            rho[[is, ir]] = value;
        }
    }
    rho
}

/// Average the spin-0 potential over the planes normal to the field axis.
fn planar_average<'a>(
    steps: impl Iterator<Item = &'a FieldStep>,
    partitions: &[GridPartition],
    axis: usize,
) -> Vec<f64> {
    let dims = partitions[0].dims();
    let mut profile = vec![0.0; dims[axis]];
    for (step, grid) in steps.zip(partitions) {
        for ir in 0..grid.local_len() {
            profile[grid.indices(ir)[axis]] += step.potential.values[[0, ir]];
        }
    }
    let per_plane = (partitions[0].global_len() / dims[axis]) as f64;
    profile.iter_mut().for_each(|v| *v /= per_plane);
    profile
}

/// Write the planar-averaged potential to a CSV file.
pub fn write_profile_csv(output: &FieldOutput, path: &Path, job: &JobConfig) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writeln!(file, "# slabfield: planar-averaged field potential")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "# efield_dir: {}", job.efield.efield_dir)?;
    writeln!(file, "# efield_amp: {}", job.efield.efield_amp)?;
    writeln!(file, "# dip_cor_flag: {}", job.efield.dip_cor_flag)?;
    writeln!(file, "#")?;
    writeln!(file, "plane,fractional,position_bohr,potential_ry")?;

    let n = output.profile.len();
    for (k, v) in output.profile.iter().enumerate() {
        let frac = k as f64 / n as f64;
        writeln!(
            file,
            "{},{:.8},{:.8},{:.12e}",
            k,
            frac,
            frac * output.axis_length,
            v
        )?;
    }

    println!("Profile written to: {}", path.display());
    Ok(())
}

#[derive(Serialize)]
struct FieldJson<'a> {
    report: &'a FieldReport,
    forces: &'a Array2<f64>,
    partitions: &'a [GridPartition],
}

/// Write the step report and forces to a JSON file.
pub fn write_field_json(output: &FieldOutput, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(&FieldJson {
        report: &output.report,
        forces: &output.forces,
        partitions: &output.partitions,
    })
    .context("JSON serialisation error")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;

    println!("Field (JSON) written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CellConfig, GridConfig, OutputConfig, SpeciesConfig, SpinConfig};
    use approx::assert_abs_diff_eq;
    use slabfield_core::FieldParams;

    fn job(partitions: usize, nspin: usize) -> JobConfig {
        JobConfig {
            efield: FieldParams {
                efield_dir: 2,
                efield_amp: 0.001,
                dip_cor_flag: true,
                ..Default::default()
            },
            cell: CellConfig {
                lat0: 8.0,
                latvec: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 3.0]],
                species: vec![SpeciesConfig {
                    label: "Na".into(),
                    zv: 1.0,
                    positions: vec![[0.0, 0.0, 0.25]],
                    positions_file: None,
                }],
            },
            grid: GridConfig {
                dims: [3, 3, 30],
                partitions,
            },
            spin: SpinConfig { nspin },
            density: DensityConfig {
                centre: 0.3,
                width: 0.03,
                electrons: 1.0,
            },
            output: OutputConfig::default(),
        }
    }

    #[test]
    fn test_density_integrates_to_electron_count() {
        let job = job(1, 2);
        let cell = job.cell.build().unwrap();
        let grid = GridPartition::whole(job.grid.dims).unwrap();
        let weights = sheet_weights(&job.density, 30).unwrap();
        let rho = synthesise_density(&cell, &grid, SpinChannels::Collinear, 2, &job.density, &weights);

        let total: f64 = rho.sum() * cell.omega() / grid.global_len() as f64;
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
        assert_eq!(rho.row(0), rho.row(1));
    }

    #[test]
    fn test_partitioned_run_matches_single_partition() {
        let single = run_field(&job(1, 1)).unwrap();
        let split = run_field(&job(4, 1)).unwrap();

        assert_abs_diff_eq!(single.report.etotefield, split.report.etotefield, epsilon = 1e-14);
        assert_eq!(single.profile.len(), 30);
        for (a, b) in single.profile.iter().zip(&split.profile) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
        for (a, b) in single.forces.iter().zip(split.forces.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-14);
        }
        assert_eq!(split.partitions.len(), 4);
    }

    #[test]
    fn test_invalid_nspin_is_reported() {
        let err = run_field(&job(1, 3)).err().unwrap();
        assert!(err.to_string().contains("nspin"));
    }
}
