//! Three-stage Runge–Kutta integrator with optional acoustic substepping.
//!
//! Every stage restarts from the step-start state `S⁰` and advances it by
//! a fraction of the slow step, with the slow tendency evaluated on the
//! previous stage's state:
//!
//! ```text
//! S¹ = S⁰ + dt/3 · F(S⁰)
//! S² = S⁰ + dt/2 · F(S¹)
//! S³ = S⁰ + dt   · F(S²)
//! ```
//!
//! With substepping the pressure-gradient and buoyancy terms and the
//! advection of ρ and ρθ are integrated with a forward–backward scheme on
//! the short step `dτ = f·dt / n`. The mass fluxes of the substeps are
//! averaged and transport the remaining scalars once per stage.
//!
//! The pressure gradient of a substep sees ρθ pushed forward by
//! [`RHO_THETA_EXTRAPOLATION`] times the change of its offset from the
//! stage state since the previous substep. With `use_lagged_delta_rt` the
//! offset of the last substep carries over into the next stage.
//!
//! Over moving terrain the substeps advance Jacobian-weighted quantities,
//! with the weights interpolated linearly in time between the stage's start
//! and end metrics.

use std::ops::Range;

use log::debug;

use super::integrator::{Integrable, IntegratorInfo};
use super::no_substep::{TerrainStep, apply_moving_slip_wall, no_substep_update};
use super::projection::project_momentum;
use crate::advection::FluxAccumulator;
use crate::boundary::{BoundaryFill, FAST_CONS_COMPONENTS};
use crate::config::SolverConfig;
use crate::equations::EquationOfState;
use crate::error::{ConfigError, Result};
use crate::field::Field;
use crate::rhs::{DycoreRhs, RhsMode};
use crate::state::{ConsVar, StateVector};
use crate::types::{Direction, Geometry, IndexBox, Staggering};
use crate::vertical::{MovingTerrain, SurfaceMotion, TerrainMetrics, grid_velocity};

/// Fraction of the slow step covered by each stage.
pub const STAGE_FRACTIONS: [f64; 3] = [1.0 / 3.0, 0.5, 1.0];

/// Weight of the forward extrapolation of ρθ in the acoustic pressure
/// gradient.
pub const RHO_THETA_EXTRAPOLATION: f64 = 0.1;

/// Scratch buffers reused across the stages of one step.
struct Workspace {
    slow: StateVector,
    fast: StateVector,
    src: Field,
    avg: FluxAccumulator,
    /// State seen by the fast tendency.
    extrap: StateVector,
    /// ρθ offset from the stage state after the previous substep.
    lagged_rt: Field,
}

impl Workspace {
    fn new(state: &StateVector) -> Self {
        let cells = state.cells();
        Self {
            slow: state.zeros_like(),
            fast: state.zeros_like(),
            src: Field::new(cells, Staggering::CellCentered, state.ncons(), [0, 0, 0]),
            avg: FluxAccumulator::new(&cells, [0, 0, 0]),
            extrap: state.zeros_like(),
            lagged_rt: Field::new(cells, Staggering::CellCentered, 1, state.cons.nghost()),
        }
    }
}

/// Jacobian weights of one substep over moving terrain.
#[derive(Clone, Copy)]
struct SubstepWeights<'a> {
    old: &'a TerrainMetrics,
    new: &'a TerrainMetrics,
    start: f64,
    end: f64,
}

impl SubstepWeights<'_> {
    /// `[start, end, new grid]` weights from the old and new values.
    #[inline]
    fn blend(&self, w_old: f64, w_new: f64) -> [f64; 3] {
        [
            w_old + self.start * (w_new - w_old),
            w_old + self.end * (w_new - w_old),
            w_new,
        ]
    }

    #[inline]
    fn cell(&self, i: i32, j: i32, k: i32) -> [f64; 3] {
        self.blend(self.old.detj()[(i, j, k)], self.new.detj()[(i, j, k)])
    }

    #[inline]
    fn face(&self, dir: Direction, i: i32, j: i32, k: i32) -> [f64; 3] {
        match dir {
            Direction::X => self.blend(self.old.h_zeta_at_iface(i, j, k), self.new.h_zeta_at_iface(i, j, k)),
            Direction::Y => self.blend(self.old.h_zeta_at_jface(i, j, k), self.new.h_zeta_at_jface(i, j, k)),
            Direction::Z => self.blend(self.old.detj_at_kface(i, j, k), self.new.detj_at_kface(i, j, k)),
        }
    }
}

/// Fast/slow split time integrator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitIntegrator {
    n_substeps: usize,
    no_substepping: bool,
    force_stage1_single_substep: bool,
    incompressible: bool,
    lagged_delta_rt: bool,
}

impl SplitIntegrator {
    /// Integrator configured from the solver options.
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            n_substeps: config.n_substeps.max(1),
            no_substepping: config.no_substepping,
            force_stage1_single_substep: config.force_stage1_single_substep,
            incompressible: config.incompressible,
            lagged_delta_rt: config.use_lagged_delta_rt,
        }
    }

    /// Override the number of substeps in the last stage.
    pub fn with_substeps(mut self, n: usize) -> Self {
        self.n_substeps = n.max(1);
        self
    }

    /// Whether stages are split into acoustic substeps.
    pub fn uses_substepping(&self) -> bool {
        !self.no_substepping
    }

    /// Number of acoustic substeps taken in `stage` (0-based).
    pub fn substeps_for_stage(&self, stage: usize) -> usize {
        let n = self.n_substeps;
        match stage {
            0 if self.force_stage1_single_substep => 1,
            0 => (n / 3).max(1),
            1 => (n / 2).max(1),
            _ => n,
        }
    }

    /// Advance `state` from `time` to `time + dt` on static terrain.
    ///
    /// The state must carry at least [`DycoreRhs::required_halo`] ghost
    /// cells; its ghosts are refreshed through `bc` before the first stage
    /// and once after every stage.
    pub fn advance<B>(&self, rhs: &DycoreRhs<'_>, bc: &mut B, state: &mut StateVector, time: f64, dt: f64) -> Result<()>
    where
        B: BoundaryFill + ?Sized,
    {
        check_dt(dt)?;
        bc.fill(state, time, false)?;
        let old = state.clone();
        let mut current = state.clone();
        let mut ws = Workspace::new(state);

        for (stage, frac) in STAGE_FRACTIONS.iter().enumerate() {
            let stage_dt = frac * dt;
            let t_end = time + stage_dt;
            let mut next = if self.no_substepping {
                rhs.evaluate(&current, RhsMode::Full, dt, &mut ws.avg, &mut ws.slow)?;
                let mut next = old.clone();
                no_substep_update(&old, &ws.slow, stage_dt, None, &mut next)?;
                if self.incompressible {
                    project_momentum(&mut next, rhs.geometry(), rhs.metrics())?;
                }
                next
            } else {
                let nsub = self.substeps_for_stage(stage);
                self.substep_stage(rhs, bc, &old, &current, nsub, stage_dt, time, dt, None, &mut ws)?
            };
            bc.fill(&mut next, t_end, false)?;
            debug!("stage {} done at t = {t_end:.6} ({})", stage + 1, bc.name());
            current = next;
        }
        state.copy_from(&current)
    }

    /// Advance `state` from `time` to `time + dt` over terrain moving with
    /// `terrain`.
    ///
    /// Tendencies are evaluated with the metrics of the state they act on
    /// and the grid speed over the stage, so the Jacobian-weighted mass is
    /// conserved as the grid deforms.
    pub fn advance_moving<B, M>(
        &self,
        rhs: &DycoreRhs<'_>,
        terrain: &MovingTerrain<M>,
        bc: &mut B,
        state: &mut StateVector,
        time: f64,
        dt: f64,
    ) -> Result<()>
    where
        B: BoundaryFill + ?Sized,
        M: SurfaceMotion,
    {
        if !rhs.config().is_moving_terrain() {
            return Err(ConfigError::Incompatible(
                "moving terrain requires use_terrain = true and terrain_type = moving".to_string(),
            )
            .into());
        }
        check_dt(dt)?;
        bc.fill(state, time, false)?;
        let cells = state.cells();
        let old = state.clone();
        let mut current = state.clone();
        let mut ws = Workspace::new(state);
        let m_start = terrain.metrics_at(time)?;
        let mut m_current: TerrainMetrics = m_start.clone();

        for (stage, frac) in STAGE_FRACTIONS.iter().enumerate() {
            let stage_dt = frac * dt;
            let t_end = time + stage_dt;
            let m_end = terrain.metrics_at(t_end)?;
            let z_t = grid_velocity(&m_start, &m_end, &cells, stage_dt)?;

            let stage_rhs = rhs.with_moving_terrain(&m_current, &z_t);
            let step = TerrainStep {
                old: &m_start,
                new: &m_end,
                z_t: &z_t,
            };
            let mut next = if self.no_substepping {
                stage_rhs.evaluate(&current, RhsMode::Full, dt, &mut ws.avg, &mut ws.slow)?;
                let mut next = old.clone();
                no_substep_update(&old, &ws.slow, stage_dt, Some(&step), &mut next)?;
                next
            } else {
                let nsub = self.substeps_for_stage(stage);
                self.substep_stage(&stage_rhs, bc, &old, &current, nsub, stage_dt, time, dt, Some(&step), &mut ws)?
            };
            bc.fill(&mut next, t_end, false)?;
            debug!("moving-terrain stage {} done at t = {t_end:.6}", stage + 1);
            current = next;
            m_current = m_end;
        }
        state.copy_from(&current)
    }

    /// One stage of forward–backward substeps from `old`, with the slow
    /// tendency frozen at `current`.
    ///
    /// Over moving terrain `rhs` carries the metrics of `current`, and the
    /// substeps run on the stage's end metrics.
    #[allow(clippy::too_many_arguments)]
    fn substep_stage<B>(
        &self,
        rhs: &DycoreRhs<'_>,
        bc: &mut B,
        old: &StateVector,
        current: &StateVector,
        nsub: usize,
        stage_dt: f64,
        time: f64,
        dt: f64,
        terrain: Option<&TerrainStep<'_>>,
        ws: &mut Workspace,
    ) -> Result<StateVector>
    where
        B: BoundaryFill + ?Sized,
    {
        let cells = old.cells();
        let ncons = old.ncons();
        let dtau = stage_dt / nsub as f64;
        let fac = 1.0 / nsub as f64;
        let sub_rhs = match terrain {
            Some(step) => rhs.with_moving_terrain(step.new, step.z_t),
            None => *rhs,
        };

        rhs.evaluate(current, RhsMode::SlowOnly, dt, &mut ws.avg, &mut ws.slow)?;
        ws.avg.reset();
        let mut next = old.clone();

        for m in 0..nsub {
            let t_sub = time + (m + 1) as f64 * dtau;
            let weights = terrain.map(|step| SubstepWeights {
                old: step.old,
                new: step.new,
                start: m as f64 * fac,
                end: (m + 1) as f64 * fac,
            });

            extrapolate_rho_theta(
                &next.cons,
                &current.cons,
                m == 0 && !self.lagged_delta_rt,
                &mut ws.lagged_rt,
                &mut ws.extrap.cons,
            )?;
            sub_rhs.fast_tendency(&ws.extrap, &mut ws.fast)?;
            advance_momentum(&cells, &ws.slow, &ws.fast, dtau, weights.as_ref(), &mut next);
            if let Some(step) = terrain {
                apply_moving_slip_wall(step.z_t, step.new, &mut next)?;
            }
            bc.fill(&mut next, t_sub, true)?;

            sub_rhs.rho_theta_pass(&next, fac, &mut ws.avg, &mut ws.src)?;
            add_tendency(
                &cells,
                FAST_CONS_COMPONENTS,
                &ws.src,
                &ws.slow.cons,
                dtau,
                weights.as_ref(),
                &mut next.cons,
            );
            bc.fill(&mut next, t_sub, true)?;
            debug!("substep {}/{nsub}, dtau = {dtau:.4e}", m + 1);
        }

        // Scalars ride on the time-averaged mass fluxes
        let scalars = FAST_CONS_COMPONENTS.end..ncons;
        if !scalars.is_empty() {
            sub_rhs.scalar_pass(current, &ws.avg, &mut ws.src)?;
            let whole_stage = terrain.map(|step| SubstepWeights {
                old: step.old,
                new: step.new,
                start: 0.0,
                end: 1.0,
            });
            add_tendency(
                &cells,
                scalars,
                &ws.src,
                &ws.slow.cons,
                stage_dt,
                whole_stage.as_ref(),
                &mut next.cons,
            );
        }
        if let Some(step) = terrain {
            apply_moving_slip_wall(step.z_t, step.new, &mut next)?;
        }
        Ok(next)
    }

    /// Largest stable slow step for `state` at Courant number `cfl`.
    ///
    /// Without substepping the step resolves sound waves; with substepping
    /// only the advective speed limits `dt`, subject to each substep
    /// resolving sound waves. Returns infinity for a state at rest with
    /// zero sound speed.
    pub fn stable_dt(&self, state: &StateVector, geom: &Geometry, eos: &EquationOfState, cfl: f64) -> f64 {
        let cells = state.cells();
        let inv = geom.inv_cell_size();
        let rt = ConsVar::RhoTheta.index();
        let (cons, ru, rv, rw) = (&state.cons, &state.xmom, &state.ymom, &state.zmom);
        let mut max_adv = 0.0f64;
        let mut max_acoustic = 0.0f64;
        for (i, j, k) in cells.iter() {
            let rho = cons[(i, j, k, 0)];
            let u = 0.5 * (ru[(i, j, k)] + ru[(i + 1, j, k)]) / rho;
            let v = 0.5 * (rv[(i, j, k)] + rv[(i, j + 1, k)]) / rho;
            let w = 0.5 * (rw[(i, j, k)] + rw[(i, j, k + 1)]) / rho;
            let c = eos.sound_speed(rho, cons[(i, j, k, rt)] / rho);
            max_adv = max_adv.max(u.abs() * inv[0] + v.abs() * inv[1] + w.abs() * inv[2]);
            max_acoustic = max_acoustic.max(c * (inv[0] + inv[1] + inv[2]));
        }
        let limit = |rate: f64| if rate < 1e-14 { f64::INFINITY } else { cfl / rate };
        if self.no_substepping {
            limit(max_adv + max_acoustic)
        } else {
            limit(max_adv).min(self.n_substeps as f64 * limit(max_acoustic))
        }
    }
}

impl IntegratorInfo for SplitIntegrator {
    fn name(&self) -> &'static str {
        if self.no_substepping {
            "RK3 (no substepping)"
        } else {
            "RK3 with acoustic substeps"
        }
    }

    /// Third order for linear problems, second order in general.
    fn order(&self) -> usize {
        2
    }

    fn n_stages(&self) -> usize {
        STAGE_FRACTIONS.len()
    }

    fn is_ssp(&self) -> bool {
        false
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        STAGE_FRACTIONS.iter().map(|f| f * dt).collect()
    }
}

fn check_dt(dt: f64) -> Result<()> {
    if dt > 0.0 && dt.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid("dt", dt, "must be positive and finite").into())
    }
}

/// Copy `next` into `out` with ρθ extrapolated forward, then record the
/// current ρθ offset from `stage` in `lagged`.
///
/// With `restart` the previous offset is discarded, so `out` equals `next`.
fn extrapolate_rho_theta(next: &Field, stage: &Field, restart: bool, lagged: &mut Field, out: &mut Field) -> Result<()> {
    let rt = ConsVar::RhoTheta.index();
    let region = next.grown_box();
    let offset = |i: i32, j: i32, k: i32| next[(i, j, k, rt)] - stage[(i, j, k, rt)];
    out.copy_from(next)?;
    if restart {
        lagged.for_each_mut(&region, 0..1, |i, j, k, _, v| *v = offset(i, j, k));
    }
    let prev = &*lagged;
    out.for_each_mut(&region, rt..rt + 1, |i, j, k, _, v| {
        *v += RHO_THETA_EXTRAPOLATION * (offset(i, j, k) - prev[(i, j, k)]);
    });
    lagged.for_each_mut(&region, 0..1, |i, j, k, _, v| *v = offset(i, j, k));
    Ok(())
}

/// Forward momentum update of one substep. Over moving terrain the bottom
/// faces are left to the slip wall.
fn advance_momentum(
    cells: &IndexBox,
    slow: &StateVector,
    fast: &StateVector,
    dtau: f64,
    weights: Option<&SubstepWeights<'_>>,
    next: &mut StateVector,
) {
    let bottom = cells.lo[2];
    let step = |field: &mut Field, s: &Field, f: &Field, dir: Direction| {
        field.for_each_mut(&cells.surrounding_nodes(dir), 0..1, |i, j, k, _, v| match weights {
            None => *v += dtau * (s[(i, j, k)] + f[(i, j, k)]),
            Some(_) if dir == Direction::Z && k == bottom => {}
            Some(w) => {
                let [w0, w1, wn] = w.face(dir, i, j, k);
                *v = (w0 * *v + dtau * (s[(i, j, k)] + wn * f[(i, j, k)])) / w1;
            }
        });
    };
    step(&mut next.xmom, &slow.xmom, &fast.xmom, Direction::X);
    step(&mut next.ymom, &slow.ymom, &fast.ymom, Direction::Y);
    step(&mut next.zmom, &slow.zmom, &fast.zmom, Direction::Z);
}

/// Add `dtau` times the advective `src` and the frozen `slow` tendency to
/// `comps` of `cons`. Over moving terrain `slow` is Jacobian-weighted and
/// `src` is not.
fn add_tendency(
    cells: &IndexBox,
    comps: Range<usize>,
    src: &Field,
    slow: &Field,
    dtau: f64,
    weights: Option<&SubstepWeights<'_>>,
    cons: &mut Field,
) {
    cons.for_each_mut(cells, comps, |i, j, k, n, v| match weights {
        None => *v += dtau * (src[(i, j, k, n)] + slow[(i, j, k, n)]),
        Some(w) => {
            let [w0, w1, wn] = w.cell(i, j, k);
            *v = (w0 * *v + dtau * (wn * src[(i, j, k, n)] + slow[(i, j, k, n)])) / w1;
        }
    });
}
