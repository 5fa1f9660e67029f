//! AUSM flux-vector splitting for the 2D Euler equations.
//!
//! The flux is evaluated in the frame of the edge normal. With normal
//! velocity u_n, tangential velocity u_t and Mach number M = u_n / a, each
//! side contributes a split convective flux
//!
//! F^± = ρ a M^± [1, u_n, u_t, H]ᵀ + [0, p^±, 0, 0]ᵀ
//!
//! with the Van Leer splits
//!
//! M^± = ±(M ± 1)² / 4,  p^± = p (1 ± M) / 2   for |M| ≤ 1
//!
//! and full upwinding for supersonic flow. The normal-frame result is
//! rotated back to global momentum components.

use super::traits::{FluxContext2D, RiemannSolver2D};
use crate::equations::{EulerState2D, IdealGas, Primitive2D};

/// AUSM Riemann solver.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Ausm2D {
    pub gas: IdealGas,
}

/// Flux in the (normal, tangential) frame.
#[derive(Clone, Copy, Debug, Default)]
struct FrameFlux {
    mass: f64,
    normal: f64,
    tangential: f64,
    energy: f64,
}

impl Ausm2D {
    pub fn new(gas: IdealGas) -> Self {
        Self { gas }
    }

    /// Split flux of one side. `positive` selects the F⁺ branch.
    fn split(&self, prim: &Primitive2D, normal: (f64, f64), positive: bool) -> FrameFlux {
        let (n0, n1) = normal;
        let un = prim.u * n0 + prim.v * n1;
        let ut = -prim.u * n1 + prim.v * n0;
        let a = self.gas.speed_of_sound(prim);
        let h = a * a / self.gas.gamma_minus_one() + 0.5 * (un * un + ut * ut);
        let mach = un / a;

        let (m_split, p_split) = if mach.abs() <= 1.0 {
            if positive {
                (0.25 * (mach + 1.0).powi(2), 0.5 * prim.p * (mach + 1.0))
            } else {
                (-0.25 * (mach - 1.0).powi(2), -0.5 * prim.p * (mach - 1.0))
            }
        } else if (positive && mach < -1.0) || (!positive && mach > 1.0) {
            (0.0, 0.0)
        } else {
            (mach, prim.p)
        };

        let mass = prim.rho * a * m_split;
        FrameFlux {
            mass,
            normal: mass * un + p_split,
            tangential: mass * ut,
            energy: mass * h,
        }
    }

    fn rotate_back(flux: FrameFlux, (n0, n1): (f64, f64)) -> EulerState2D {
        EulerState2D {
            rho: flux.mass,
            rho_u: flux.normal * n0 - flux.tangential * n1,
            rho_v: flux.normal * n1 + flux.tangential * n0,
            energy: flux.energy,
        }
    }
}

impl RiemannSolver2D for Ausm2D {
    type State = EulerState2D;

    fn flux(&self, left: &EulerState2D, right: &EulerState2D, ctx: &FluxContext2D) -> EulerState2D {
        let plus = self.split(&self.gas.to_primitive(left), ctx.normal, true);
        let minus = self.split(&self.gas.to_primitive(right), ctx.normal, false);
        let sum = FrameFlux {
            mass: plus.mass + minus.mass,
            normal: plus.normal + minus.normal,
            tangential: plus.tangential + minus.tangential,
            energy: plus.energy + minus.energy,
        };
        Self::rotate_back(sum, ctx.normal)
    }

    /// Pressure only: [0, p n_x, p n_y, 0].
    fn solid_wall_flux(&self, state: &EulerState2D, ctx: &FluxContext2D) -> EulerState2D {
        let p = self.gas.to_primitive(state).p;
        EulerState2D::new(0.0, p * ctx.normal.0, p * ctx.normal.1, 0.0)
    }

    fn free_wall_flux(&self, state: &EulerState2D, ctx: &FluxContext2D) -> EulerState2D {
        self.gas.normal_flux(&self.gas.to_primitive(state), ctx.normal)
    }

    fn max_wave_speed(&self, state: &EulerState2D) -> f64 {
        let prim = self.gas.to_primitive(state);
        prim.u.hypot(prim.v) + self.gas.speed_of_sound(&prim)
    }

    fn name(&self) -> &'static str {
        "ausm"
    }
}
