use serde::{Deserialize, Serialize};

/// Energy deposit recorded in a calorimeter cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaloHit {
    /// Deposited energy in GeV.
    pub energy: f64,
    /// Arrival time as recorded by the simulation (ns).
    pub time: f64,
    /// Detector cell identifier.
    pub id: u32,
    /// Identifier of the simulated track that produced the deposit.
    pub geant_track_id: i32,
}

/// A particle propagated through the detector simulation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimTrack {
    pub track_id: u32,
    pub pdg_id: i32,
    /// Position of the originating vertex in the event's vertex list.
    /// Negative when the track has no vertex.
    pub vert_index: i32,
    /// `true` when the track has no generator-level counterpart, i.e. it
    /// was produced during the simulation.
    pub no_gen_part: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimVertex {
    /// Track id of the particle that produced the vertex.
    pub parent_index: i32,
}
