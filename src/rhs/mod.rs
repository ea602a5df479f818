//! Right-hand side assembly.
//!
//! [`DycoreRhs`] collects the advection operators, the diffusion closure,
//! numerical diffusion, Coriolis and the fast pressure/buoyancy terms into
//! one tendency. The integrator evaluates it once per RK stage.
//!
//! With acoustic substepping the stage is split: [`RhsMode::SlowOnly`]
//! freezes everything that is not advanced inside the substeps, while
//! [`DycoreRhs::fast_tendency`], [`DycoreRhs::rho_theta_pass`] and
//! [`DycoreRhs::scalar_pass`] provide the pieces the substep loop
//! recomputes.

mod coriolis;
mod fast;

pub use coriolis::Coriolis;
pub use fast::{FAST_HALO, FastContext, add_buoyancy, add_pressure_gradient};

use crate::advection::{
    AdvectionGrid, FluxAccumulator, Interpolator, MomentumInputs, advection_src_for_momentum,
    advection_src_for_rho_and_theta, advection_src_for_scalars,
};
use crate::config::SolverConfig;
use crate::diffusion::{DiffusionClosure, DiffusionInputs, NUM_DIFF_HALO, add_numerical_diffusion};
use crate::error::{ConfigError, Result};
use crate::field::{Field, MapFactors};
use crate::state::{BaseState, ConsVar, StateVector, primitives};
use crate::types::{Direction, Geometry, IndexBox, Staggering};
use crate::vertical::{TerrainMetrics, compute_omega};

/// Which terms an evaluation includes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RhsMode {
    /// Every term.
    Full,
    /// Everything except the advection of ρ, ρθ and the scalars and the
    /// pressure-gradient and buoyancy forces.
    SlowOnly,
}

/// Assembled tendency of the compressible equations on one level.
#[derive(Clone, Copy)]
pub struct DycoreRhs<'a> {
    config: &'a SolverConfig,
    geom: Geometry,
    base: &'a BaseState,
    map_factors: &'a MapFactors,
    metrics: Option<&'a TerrainMetrics>,
    grid_velocity: Option<&'a Field>,
    closure: Option<&'a dyn DiffusionClosure>,
    dycore: Interpolator,
    dry_scalar: Interpolator,
    moist_scalar: Interpolator,
}

impl<'a> DycoreRhs<'a> {
    /// Flat-grid right-hand side without a diffusion closure.
    pub fn new(config: &'a SolverConfig, geom: &Geometry, base: &'a BaseState, map_factors: &'a MapFactors) -> Self {
        Self {
            config,
            geom: *geom,
            base,
            map_factors,
            metrics: None,
            grid_velocity: None,
            closure: None,
            dycore: config.advection.dycore(),
            dry_scalar: config.advection.dry_scalar(),
            moist_scalar: config.advection.moist_scalar(),
        }
    }

    /// Use terrain-following metrics.
    pub fn with_terrain(mut self, metrics: &'a TerrainMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Add a diffusion closure.
    pub fn with_closure(mut self, closure: &'a dyn DiffusionClosure) -> Self {
        self.closure = Some(closure);
        self
    }

    /// Same right-hand side on moving terrain with the given metrics and
    /// grid speed at z-faces.
    ///
    /// Tendencies are then returned multiplied by the cell or face Jacobian,
    /// as the moving-terrain update expects.
    pub fn with_moving_terrain<'b>(&self, metrics: &'b TerrainMetrics, z_t: &'b Field) -> DycoreRhs<'b>
    where
        'a: 'b,
    {
        DycoreRhs {
            metrics: Some(metrics),
            grid_velocity: Some(z_t),
            ..*self
        }
    }

    /// Solver options this right-hand side was built from.
    pub fn config(&self) -> &SolverConfig {
        self.config
    }

    /// Uniform computational grid.
    pub fn geometry(&self) -> &Geometry {
        &self.geom
    }

    /// Terrain metrics, if any.
    pub fn metrics(&self) -> Option<&'a TerrainMetrics> {
        self.metrics
    }

    /// Grid view passed to the advection kernels.
    ///
    /// Map factors are only applied with `use_map_factors`.
    pub fn grid(&self) -> AdvectionGrid<'a> {
        AdvectionGrid {
            inv_cell_size: self.geom.inv_cell_size(),
            metrics: self.metrics,
            map_factors: self.config.use_map_factors.then_some(self.map_factors),
        }
    }

    /// Check that the attached terrain matches `use_terrain`.
    pub fn check_terrain(&self) -> Result<()> {
        match (self.config.use_terrain, self.metrics.is_some()) {
            (true, false) => Err(ConfigError::Incompatible(
                "use_terrain = true requires terrain metrics (see DycoreRhs::with_terrain)".to_string(),
            )
            .into()),
            (false, true) => Err(ConfigError::Incompatible(
                "terrain metrics were supplied but use_terrain = false".to_string(),
            )
            .into()),
            _ => Ok(()),
        }
    }

    fn fast_context(&self) -> FastContext<'a> {
        FastContext {
            base: self.base,
            eos: self.config.eos,
            gravity: self.config.gravity,
            buoyancy: self.config.buoyancy_type,
            grid: self.grid(),
        }
    }

    /// Ghost cells the state must carry for one evaluation.
    pub fn required_halo(&self) -> [usize; 3] {
        let adv = &self.config.advection;
        // momentum advection reads density one cell beyond its stencil
        let h = (adv.dycore_horiz.stencil_radius() + 1).max(adv.max_horizontal_radius());
        let mut halo = [h, h, 1];
        if self.config.use_num_diff {
            for d in 0..3 {
                halo[d] = halo[d].max(NUM_DIFF_HALO[d]);
            }
        }
        if let Some(c) = self.closure {
            let ch = c.halo();
            for d in 0..3 {
                halo[d] = halo[d].max(ch[d]);
            }
        }
        halo
    }

    /// Contravariant vertical mass flux of `state`, relative to the moving
    /// grid when a grid speed is set.
    pub fn omega(&self, state: &StateVector) -> Result<Field> {
        let cells = state.cells();
        let mut omega = Field::new(cells, Staggering::ZFace, 1, [1, 1, 0]);
        compute_omega(&cells, &state.xmom, &state.ymom, &state.zmom, self.metrics, &mut omega)?;
        if let Some(z_t) = self.grid_velocity {
            let faces = cells.grow([1, 1, 0]).convert(Staggering::ZFace);
            z_t.ensure_contains(&faces, "grid velocity")?;
            let rho = &state.cons;
            let (bottom, top) = (cells.lo[2], cells.hi[2] + 1);
            omega.for_each_mut(&faces, 0..1, |i, j, k, _, v| {
                let rho_face = if k == bottom {
                    rho[(i, j, k)]
                } else if k == top {
                    rho[(i, j, k - 1)]
                } else {
                    0.5 * (rho[(i, j, k)] + rho[(i, j, k - 1)])
                };
                *v -= rho_face * z_t[(i, j, k)];
            });
        }
        Ok(omega)
    }

    /// Advective tendencies of ρ and ρθ into `src`, depositing `fac` times
    /// the face mass fluxes into `avg`.
    pub fn rho_theta_pass(&self, state: &StateVector, fac: f64, avg: &mut FluxAccumulator, src: &mut Field) -> Result<()> {
        let prim = primitives(&state.cons);
        let omega = self.omega(state)?;
        self.rho_theta_pass_with(state, &prim, &omega, fac, avg, src)
    }

    fn rho_theta_pass_with(
        &self,
        state: &StateVector,
        prim: &Field,
        omega: &Field,
        fac: f64,
        avg: &mut FluxAccumulator,
        src: &mut Field,
    ) -> Result<()> {
        let cells = state.cells();
        advection_src_for_rho_and_theta(
            &cells,
            fac,
            &state.xmom,
            &state.ymom,
            omega,
            prim,
            &self.dycore,
            &self.grid(),
            src,
            avg,
        )
    }

    /// Advective tendencies of every scalar beyond ρθ, transported with the
    /// fluxes in `avg` and reconstructed from the primitives of `state`.
    pub fn scalar_pass(&self, state: &StateVector, avg: &FluxAccumulator, src: &mut Field) -> Result<()> {
        let prim = primitives(&state.cons);
        self.scalar_pass_with(state, &prim, avg, src)
    }

    fn scalar_pass_with(&self, state: &StateVector, prim: &Field, avg: &FluxAccumulator, src: &mut Field) -> Result<()> {
        let cells = state.cells();
        let ncons = state.ncons();
        let first = ConsVar::RhoKE.index();
        let dry_end = ncons.min(ConsVar::NUM_DRY);
        let grid = self.grid();
        if dry_end > first {
            advection_src_for_scalars(&cells, first, dry_end - first, avg, prim, &self.dry_scalar, &grid, src)?;
        }
        if ncons > ConsVar::NUM_DRY {
            advection_src_for_scalars(
                &cells,
                ConsVar::NUM_DRY,
                ncons - ConsVar::NUM_DRY,
                avg,
                prim,
                &self.moist_scalar,
                &grid,
                src,
            )?;
        }
        Ok(())
    }

    /// Pressure-gradient and buoyancy tendencies into the momentum of
    /// `fast`. The conserved part of `fast` is left untouched.
    pub fn fast_tendency(&self, state: &StateVector, fast: &mut StateVector) -> Result<()> {
        let cells = state.cells();
        let ctx = self.fast_context();
        fast.xmom.fill(0.0);
        fast.ymom.fill(0.0);
        fast.zmom.fill(0.0);
        add_pressure_gradient(&cells, state, &ctx, fast)?;
        add_buoyancy(&cells, state, &ctx, &mut fast.zmom)
    }

    /// Evaluate the tendency of `state` into `rhs`.
    ///
    /// `dt` is the slow time step, used only to scale numerical diffusion.
    /// In [`RhsMode::Full`] the accumulator is reset and receives the face
    /// mass fluxes of this evaluation.
    pub fn evaluate(
        &self,
        state: &StateVector,
        mode: RhsMode,
        dt: f64,
        avg: &mut FluxAccumulator,
        rhs: &mut StateVector,
    ) -> Result<()> {
        self.check_terrain()?;
        state.ensure_halo(self.required_halo())?;
        if self.config.use_map_factors {
            self.map_factors.ensure_covers(&state.cells().grow([1, 1, 0]))?;
        }
        let cells = state.cells();
        let prim = primitives(&state.cons);
        let omega = self.omega(state)?;
        rhs.clear();

        if mode == RhsMode::Full {
            avg.reset();
            self.rho_theta_pass_with(state, &prim, &omega, 1.0, avg, &mut rhs.cons)?;
            self.scalar_pass_with(state, &prim, avg, &mut rhs.cons)?;
        }

        let inputs = MomentumInputs {
            rho: &state.cons,
            rho_u: &state.xmom,
            rho_v: &state.ymom,
            rho_w: &state.zmom,
            omega: &omega,
        };
        advection_src_for_momentum(
            &cells,
            &inputs,
            &self.dycore,
            &self.grid(),
            &mut rhs.xmom,
            &mut rhs.ymom,
            &mut rhs.zmom,
        )?;

        if let Some(closure) = self.closure {
            let inputs = DiffusionInputs {
                state,
                prim: &prim,
                inv_cell_size: self.geom.inv_cell_size(),
                domain: self.geom.domain,
            };
            closure.add_tendency(&cells, &inputs, rhs)?;
        }

        if self.config.use_num_diff && self.config.num_diff_coeff > 0.0 {
            let coeff = self.config.num_diff_coeff;
            let ncons = state.ncons();
            add_numerical_diffusion(&cells, 1, ncons - 1, dt, coeff, &state.cons, &mut rhs.cons)?;
            let xf = cells.surrounding_nodes(Direction::X);
            add_numerical_diffusion(&xf, 0, 1, dt, coeff, &state.xmom, &mut rhs.xmom)?;
            let yf = cells.surrounding_nodes(Direction::Y);
            add_numerical_diffusion(&yf, 0, 1, dt, coeff, &state.ymom, &mut rhs.ymom)?;
            let zf = IndexBox::new([cells.lo[0], cells.lo[1], cells.lo[2] + 1], cells.hi);
            add_numerical_diffusion(&zf, 0, 1, dt, coeff, &state.zmom, &mut rhs.zmom)?;
        }

        if self.config.use_coriolis {
            let coriolis = Coriolis {
                factor: self.config.coriolis_factor,
                sinphi: self.config.sinphi,
                cosphi: self.config.cosphi,
            };
            coriolis.add_tendency(&cells, state, rhs)?;
        }

        if mode == RhsMode::Full {
            let ctx = self.fast_context();
            add_pressure_gradient(&cells, state, &ctx, rhs)?;
            add_buoyancy(&cells, state, &ctx, &mut rhs.zmom)?;
        }

        if let (Some(m), Some(_)) = (self.metrics, self.grid_velocity) {
            premultiply_by_jacobian(&cells, m, rhs);
        }
        Ok(())
    }
}

/// Multiply cell tendencies by `detJ` and face tendencies by the face
/// Jacobian.
fn premultiply_by_jacobian(cells: &IndexBox, m: &TerrainMetrics, rhs: &mut StateVector) {
    let detj = m.detj();
    let ncons = rhs.ncons();
    rhs.cons.for_each_mut(cells, 0..ncons, |i, j, k, _, v| *v *= detj[(i, j, k)]);
    rhs.xmom.for_each_mut(&cells.surrounding_nodes(Direction::X), 0..1, |i, j, k, _, v| {
        *v *= m.h_zeta_at_iface(i, j, k)
    });
    rhs.ymom.for_each_mut(&cells.surrounding_nodes(Direction::Y), 0..1, |i, j, k, _, v| {
        *v *= m.h_zeta_at_jface(i, j, k)
    });
    rhs.zmom.for_each_mut(&cells.surrounding_nodes(Direction::Z), 0..1, |i, j, k, _, v| {
        *v *= m.detj_at_kface(i, j, k)
    });
}
