use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Static properties of one particle species.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleData {
    pub pdg_id: i32,
    pub name: String,
    /// Electric charge in units of the positron charge.
    pub charge: f64,
    /// Mass in GeV.
    pub mass: f64,
}

impl ParticleData {
    pub fn new(pdg_id: i32, name: impl Into<String>, charge: f64, mass: f64) -> Self {
        Self {
            pdg_id,
            name: name.into(),
            charge,
            mass,
        }
    }
    /// Charge truncated toward zero. Quarks and other fractionally charged
    /// species end up neutral.
    pub fn integer_charge(&self) -> i32 {
        self.charge as i32
    }
}

/// Lookup of [`ParticleData`] by PDG id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleDataTable {
    inner: HashMap<i32, ParticleData>,
}

// (pdg id, particle name, antiparticle name, charge, mass)
const STANDARD_SPECIES: &[(i32, &str, &str, f64, f64)] = &[
    (1, "d", "dbar", -1.0 / 3.0, 0.00467),
    (2, "u", "ubar", 2.0 / 3.0, 0.00216),
    (3, "s", "sbar", -1.0 / 3.0, 0.0934),
    (11, "e-", "e+", -1.0, 0.000511),
    (12, "nu_e", "nu_ebar", 0.0, 0.0),
    (13, "mu-", "mu+", -1.0, 0.10566),
    (14, "nu_mu", "nu_mubar", 0.0, 0.0),
    (15, "tau-", "tau+", -1.0, 1.77686),
    (16, "nu_tau", "nu_taubar", 0.0, 0.0),
    (211, "pi+", "pi-", 1.0, 0.13957),
    (321, "K+", "K-", 1.0, 0.49368),
    (311, "K0", "K0bar", 0.0, 0.49761),
    (411, "D+", "D-", 1.0, 1.86966),
    (421, "D0", "D0bar", 0.0, 1.86484),
    (2212, "p+", "p-", 1.0, 0.93827),
    (2112, "n0", "n0bar", 0.0, 0.93957),
    (3122, "Lambda0", "Lambda0bar", 0.0, 1.11568),
    (3222, "Sigma+", "Sigma-bar", 1.0, 1.18937),
    (3112, "Sigma-", "Sigma+bar", -1.0, 1.19745),
    (3212, "Sigma0", "Sigma0bar", 0.0, 1.19264),
    (3312, "Xi-", "Xi+", -1.0, 1.32171),
    (3322, "Xi0", "Xi0bar", 0.0, 1.31486),
    (3334, "Omega-", "Omega+", -1.0, 1.67245),
];

// Self-conjugate species.
const STANDARD_NEUTRALS: &[(i32, &str, f64)] = &[
    (21, "g", 0.0),
    (22, "gamma", 0.0),
    (23, "Z0", 91.1876),
    (111, "pi0", 0.13498),
    (130, "K_L0", 0.49761),
    (310, "K_S0", 0.49761),
    (221, "eta", 0.54786),
    (113, "rho0", 0.77526),
    (223, "omega", 0.78265),
    (333, "phi", 1.01946),
];

impl ParticleDataTable {
    pub fn new() -> Self {
        Self::default()
    }
    /// Table of the common lepton, boson and light hadron species, including
    /// antiparticles.
    ///
    /// # Examples
    ///
    /// ```
    /// use simana::pdt::ParticleDataTable;
    ///
    /// let table = ParticleDataTable::standard();
    /// assert_eq!(table.particle(211).unwrap().integer_charge(), 1);
    /// assert_eq!(table.particle(-211).unwrap().integer_charge(), -1);
    /// assert_eq!(table.particle(22).unwrap().integer_charge(), 0);
    /// ```
    pub fn standard() -> Self {
        let species = STANDARD_SPECIES
            .iter()
            .flat_map(|&(id, name, anti, charge, mass)| {
                [
                    ParticleData::new(id, name, charge, mass),
                    ParticleData::new(-id, anti, -charge, mass),
                ]
            });
        let neutrals = STANDARD_NEUTRALS
            .iter()
            .map(|&(id, name, mass)| ParticleData::new(id, name, 0.0, mass));

        species.chain(neutrals).collect()
    }
    /// Adds a species, replacing any previous entry with the same PDG id.
    pub fn insert(&mut self, data: ParticleData) -> Option<ParticleData> {
        self.inner.insert(data.pdg_id, data)
    }
    pub fn particle(&self, pdg_id: i32) -> Option<&ParticleData> {
        self.inner.get(&pdg_id)
    }
    pub fn len(&self) -> usize {
        self.inner.len()
    }
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FromIterator<ParticleData> for ParticleDataTable {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = ParticleData>,
    {
        let mut table = Self::new();
        for data in iter {
            table.insert(data);
        }

        table
    }
}
