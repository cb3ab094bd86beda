use serde::{Deserialize, Serialize};

/// Four-momentum of a generator-level particle `(px, py, pz, E)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FourMomentum {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub e: f64,
}

impl FourMomentum {
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { px, py, pz, e }
    }
    /// Builds a massless momentum from transverse momentum, pseudorapidity
    /// and azimuthal angle.
    ///
    /// # Examples
    ///
    /// ```
    /// use simana::hepmc::FourMomentum;
    ///
    /// let p = FourMomentum::from_pt_eta_phi(5.0, 0.3, 0.0);
    /// assert!((p.perp() - 5.0).abs() < 1e-12);
    /// assert!((p.eta() - 0.3).abs() < 1e-12);
    /// ```
    pub fn from_pt_eta_phi(pt: f64, eta: f64, phi: f64) -> Self {
        let pz = pt * eta.sinh();
        Self {
            px: pt * phi.cos(),
            py: pt * phi.sin(),
            pz,
            e: pt * eta.cosh(),
        }
    }
    /// Transverse momentum.
    pub fn perp(&self) -> f64 {
        self.px.hypot(self.py)
    }
    /// Magnitude of the 3-momentum.
    pub fn rho(&self) -> f64 {
        (self.px * self.px + self.py * self.py + self.pz * self.pz).sqrt()
    }
    /// Pseudorapidity. Zero for a null 3-momentum and infinite along the
    /// beam axis.
    pub fn eta(&self) -> f64 {
        let m = self.rho();
        if m == 0.0 {
            return 0.0;
        }
        0.5 * ((m + self.pz) / (m - self.pz)).ln()
    }
    /// Energy component.
    pub fn e(&self) -> f64 {
        self.e
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenParticle {
    pub momentum: FourMomentum,
    pub pdg_id: i32,
    pub status: i32,
}

impl GenParticle {
    /// Status code of stable particles leaving the generator.
    pub const FINAL_STATE: i32 = 1;

    pub fn is_final_state(&self) -> bool {
        self.status == Self::FINAL_STATE
    }
}

/// Collision geometry attached to heavy-ion generator records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeavyIon {
    pub ncoll_hard: i32,
    pub npart_proj: i32,
    pub npart_targ: i32,
    pub ncoll: i32,
    pub spectator_neutrons: i32,
    pub spectator_protons: i32,
    pub impact_parameter: f64,
    pub event_plane_angle: f64,
    pub eccentricity: f64,
    pub sigma_inel_nn: f64,
}

impl HeavyIon {
    /// Number of participating nucleons from both nuclei. Wraps on
    /// overflow, so a corrupt header reads as negative.
    pub fn npart(&self) -> i32 {
        self.npart_proj.wrapping_add(self.npart_targ)
    }
}

/// One generator record of an event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenEvent {
    pub particles: Vec<GenParticle>,
    pub heavy_ion: Option<HeavyIon>,
}

impl GenEvent {
    pub fn final_state(&self) -> impl Iterator<Item = &GenParticle> {
        self.particles.iter().filter(|p| p.is_final_state())
    }
}
