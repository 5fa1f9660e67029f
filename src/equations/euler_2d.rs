//! 2D Euler equations for an ideal gas.
//!
//! Conservative variables U = (ρ, ρu, ρv, E) with
//!
//! E = p / (γ - 1) + ρ (u² + v²) / 2
//!
//! and the flux through a unit normal n = (n_x, n_y), with u_n = u n_x + v n_y:
//!
//! F(U)·n = [ρ u_n, ρ u u_n + p n_x, ρ v u_n + p n_y, u_n (E + p)]ᵀ

use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};

use super::state::StateVector;

/// Conservative Euler state (ρ, ρu, ρv, E).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EulerState2D {
    /// Density ρ
    pub rho: f64,
    /// x-momentum ρu
    pub rho_u: f64,
    /// y-momentum ρv
    pub rho_v: f64,
    /// Total energy per unit volume E
    pub energy: f64,
}

impl EulerState2D {
    #[inline]
    pub fn new(rho: f64, rho_u: f64, rho_v: f64, energy: f64) -> Self {
        Self {
            rho,
            rho_u,
            rho_v,
            energy,
        }
    }

    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.rho, self.rho_u, self.rho_v, self.energy]
    }

    #[inline]
    pub fn from_array(arr: [f64; 4]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3])
    }

    /// Momentum vector (ρu, ρv).
    #[inline]
    pub fn momentum(&self) -> (f64, f64) {
        (self.rho_u, self.rho_v)
    }

    /// Replace the momentum vector.
    #[inline]
    pub fn with_momentum(self, (mx, my): (f64, f64)) -> Self {
        Self {
            rho_u: mx,
            rho_v: my,
            ..self
        }
    }
}

impl Add for EulerState2D {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            rho: self.rho + other.rho,
            rho_u: self.rho_u + other.rho_u,
            rho_v: self.rho_v + other.rho_v,
            energy: self.energy + other.energy,
        }
    }
}

impl Sub for EulerState2D {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            rho: self.rho - other.rho,
            rho_u: self.rho_u - other.rho_u,
            rho_v: self.rho_v - other.rho_v,
            energy: self.energy - other.energy,
        }
    }
}

impl Mul<f64> for EulerState2D {
    type Output = Self;

    #[inline]
    fn mul(self, s: f64) -> Self {
        Self {
            rho: self.rho * s,
            rho_u: self.rho_u * s,
            rho_v: self.rho_v * s,
            energy: self.energy * s,
        }
    }
}

impl Mul<EulerState2D> for f64 {
    type Output = EulerState2D;

    #[inline]
    fn mul(self, state: EulerState2D) -> EulerState2D {
        state * self
    }
}

impl AddAssign for EulerState2D {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl SubAssign for EulerState2D {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl MulAssign<f64> for EulerState2D {
    #[inline]
    fn mul_assign(&mut self, s: f64) {
        *self = *self * s;
    }
}

impl StateVector for EulerState2D {
    const N_VARS: usize = 4;

    #[inline]
    fn component(&self, i: usize) -> f64 {
        self.to_array()[i]
    }

    #[inline]
    fn set_component(&mut self, i: usize, value: f64) {
        match i {
            0 => self.rho = value,
            1 => self.rho_u = value,
            2 => self.rho_v = value,
            _ => self.energy = value,
        }
    }
}

/// Primitive Euler state (ρ, u, v, p).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Primitive2D {
    pub rho: f64,
    pub u: f64,
    pub v: f64,
    pub p: f64,
}

impl Primitive2D {
    #[inline]
    pub fn new(rho: f64, u: f64, v: f64, p: f64) -> Self {
        Self { rho, u, v, p }
    }

    /// Velocity component along `normal`.
    #[inline]
    pub fn normal_velocity(&self, normal: (f64, f64)) -> f64 {
        self.u * normal.0 + self.v * normal.1
    }
}

/// Calorically perfect gas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdealGas {
    /// Ratio of specific heats γ
    pub gamma: f64,
}

impl Default for IdealGas {
    fn default() -> Self {
        Self::air()
    }
}

impl IdealGas {
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }

    /// Diatomic gas, γ = 1.4.
    pub fn air() -> Self {
        Self { gamma: 1.4 }
    }

    #[inline]
    pub fn gamma_minus_one(&self) -> f64 {
        self.gamma - 1.0
    }

    #[inline]
    pub fn gamma_over_gamma_minus_one(&self) -> f64 {
        self.gamma / (self.gamma - 1.0)
    }

    /// Conservative → primitive.
    #[inline]
    pub fn to_primitive(&self, state: &EulerState2D) -> Primitive2D {
        let u = state.rho_u / state.rho;
        let v = state.rho_v / state.rho;
        let kinetic = 0.5 * state.rho * (u * u + v * v);
        Primitive2D {
            rho: state.rho,
            u,
            v,
            p: (state.energy - kinetic) * self.gamma_minus_one(),
        }
    }

    /// Primitive → conservative.
    #[inline]
    pub fn to_conservative(&self, prim: &Primitive2D) -> EulerState2D {
        let kinetic = 0.5 * prim.rho * (prim.u * prim.u + prim.v * prim.v);
        EulerState2D {
            rho: prim.rho,
            rho_u: prim.rho * prim.u,
            rho_v: prim.rho * prim.v,
            energy: prim.p / self.gamma_minus_one() + kinetic,
        }
    }

    /// Speed of sound a = sqrt(γ p / ρ).
    #[inline]
    pub fn speed_of_sound(&self, prim: &Primitive2D) -> f64 {
        (self.gamma * prim.p / prim.rho).sqrt()
    }

    /// Total enthalpy per unit mass, H = a² / (γ - 1) + |u|² / 2.
    #[inline]
    pub fn total_enthalpy(&self, prim: &Primitive2D) -> f64 {
        let a = self.speed_of_sound(prim);
        a * a / self.gamma_minus_one() + 0.5 * (prim.u * prim.u + prim.v * prim.v)
    }

    /// Physical flux F(U)·n.
    pub fn normal_flux(&self, prim: &Primitive2D, normal: (f64, f64)) -> EulerState2D {
        let un = prim.normal_velocity(normal);
        let mass = prim.rho * un;
        let energy = self.to_conservative(prim).energy;
        EulerState2D {
            rho: mass,
            rho_u: mass * prim.u + prim.p * normal.0,
            rho_v: mass * prim.v + prim.p * normal.1,
            energy: un * (energy + prim.p),
        }
    }
}
