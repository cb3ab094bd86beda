//! Energy deposits in a calorimeter crystal, split by the process that
//! produced them.
use crate::event::{Event, EventSetup, InputTag};
use crate::hist::Histogram;
use crate::params::{ConfigError, ParameterSet};
use crate::sim::{CaloHit, SimTrack, SimVertex};
use crate::{Analyzer, Error};
use bon::bon;
use log::{debug, info};
use serde::Serialize;

/// Cell id of the photon-tagged crystal.
pub const TAGGED_CELL_ID: u32 = 22;
/// Upper bound (exclusive) of the early time window.
pub const EARLY_TIME_CUT: f64 = 400.0;

const NBINS: usize = 5000;

/// Classification of a calorimeter hit by the particle that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DepositType {
    /// Every hit, regardless of origin.
    Total,
    Electromagnetic,
    DeltaRay,
    Bremsstrahlung,
}

impl DepositType {
    pub const ALL: [DepositType; 4] = [
        DepositType::Total,
        DepositType::Electromagnetic,
        DepositType::DeltaRay,
        DepositType::Bremsstrahlung,
    ];

    pub fn index(self) -> usize {
        match self {
            DepositType::Total => 0,
            DepositType::Electromagnetic => 1,
            DepositType::DeltaRay => 2,
            DepositType::Bremsstrahlung => 3,
        }
    }
    fn label(self) -> &'static str {
        match self {
            DepositType::Total => "total",
            DepositType::Electromagnetic => "by dE/dx",
            DepositType::DeltaRay => "by delta-ray",
            DepositType::Bremsstrahlung => "by bremms",
        }
    }
    /// Type of a hit produced by a particle of species `pdg_id`.
    ///
    /// # Examples
    ///
    /// ```
    /// use simana::xtal_dedx::DepositType;
    ///
    /// assert_eq!(DepositType::from_pdg_id(11), DepositType::Electromagnetic);
    /// assert_eq!(DepositType::from_pdg_id(-13), DepositType::DeltaRay);
    /// assert_eq!(DepositType::from_pdg_id(22), DepositType::Bremsstrahlung);
    /// ```
    pub fn from_pdg_id(pdg_id: i32) -> Self {
        match pdg_id {
            11 => DepositType::Electromagnetic,
            13 | -13 => DepositType::DeltaRay,
            _ => DepositType::Bremsstrahlung,
        }
    }
    /// Type of `hit` given the event's tracks. A hit whose track is not in
    /// `tracks` is electromagnetic.
    pub fn of_hit(hit: &CaloHit, tracks: &[SimTrack]) -> Self {
        let track = tracks
            .iter()
            .find(|track| track.track_id as i32 == hit.geant_track_id);
        match track {
            Some(track) => Self::from_pdg_id(track.pdg_id),
            None => DepositType::Electromagnetic,
        }
    }
}

/// Per-event sums for one [`DepositType`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Deposits {
    pub hits: f64,
    /// Energy of all hits.
    pub energy: f64,
    /// Energy of hits with time < 400.
    pub energy_early: f64,
    /// Energy of hits in the photon-tagged cell.
    pub tagged_energy: f64,
    /// Energy of hits in the photon-tagged cell with time < 400.
    pub tagged_energy_early: f64,
}

impl Deposits {
    fn add(&mut self, hit: &CaloHit) {
        self.hits += 1.0;
        self.energy += hit.energy;
        if hit.time < EARLY_TIME_CUT {
            self.energy_early += hit.energy;
        }
        if hit.id == TAGGED_CELL_ID {
            self.tagged_energy += hit.energy;
            if hit.time < EARLY_TIME_CUT {
                self.tagged_energy_early += hit.energy;
            }
        }
    }
}

/// Sums of one event, indexed by [`DepositType`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DepositAccumulator {
    inner: [Deposits; 4],
}

impl DepositAccumulator {
    /// Adds `hit` to the total and to the sums of `kind`.
    pub fn add(&mut self, kind: DepositType, hit: &CaloHit) {
        self.inner[DepositType::Total.index()].add(hit);
        if kind != DepositType::Total {
            self.inner[kind.index()].add(hit);
        }
    }
    pub fn get(&self, kind: DepositType) -> &Deposits {
        &self.inner[kind.index()]
    }
}

/// Accumulates the sums of all `hits` of an event.
pub fn accumulate(hits: &[CaloHit], tracks: &[SimTrack]) -> DepositAccumulator {
    let mut accumulator = DepositAccumulator::default();
    for (i, hit) in hits.iter().enumerate() {
        let kind = DepositType::of_hit(hit, tracks);
        accumulator.add(kind, hit);
        debug!(
            "Hit[{i}] ID {} E {} time {} track {} type {}",
            hit.id,
            hit.energy,
            hit.time,
            hit.geant_track_id,
            kind.index()
        );
    }

    accumulator
}

/// PDG ids of the first simulation-only particles in the event, i.e.
/// secondaries whose parent track has a generator-level counterpart.
///
/// Tracks whose vertex or parent cannot be resolved are skipped.
pub fn first_level_secondaries<'a>(
    tracks: &'a [SimTrack],
    vertices: &'a [SimVertex],
) -> impl Iterator<Item = i32> + 'a {
    tracks
        .iter()
        .enumerate()
        .filter(|(_, track)| track.no_gen_part)
        .filter_map(move |(k, track)| {
            debug!(
                "Track {k} PDGId {} Vertex ID {} Generator {}",
                track.pdg_id, track.vert_index, track.no_gen_part
            );
            let vertex = usize::try_from(track.vert_index)
                .ok()
                .and_then(|index| vertices.get(index))?;
            let parent = tracks
                .iter()
                .find(|parent| parent.track_id as i32 == vertex.parent_index)?;
            if parent.no_gen_part {
                return None;
            }
            debug!("Track found with ID {}", track.pdg_id);

            Some(track.pdg_id)
        })
}

/// One histogram per [`DepositType`].
pub type HistogramFamily = [Histogram<f32>; 4];

/// Histograms booked by [`CalorimeterDepositClassifier`].
#[derive(Clone, Debug, Serialize)]
pub struct DepositHistograms {
    /// Number of hits per event.
    pub hits: HistogramFamily,
    /// Energy in the tagged cell, all times.
    pub e1t0: HistogramFamily,
    /// Energy in all cells, all times.
    pub e9t0: HistogramFamily,
    /// Energy in the tagged cell, time < 400.
    pub e1t1: HistogramFamily,
    /// Energy in all cells, time < 400.
    pub e9t1: HistogramFamily,
    /// PDG ids of first-level secondaries.
    pub pdg_type: Histogram<i32>,
}

fn book_family(prefix: &str, title: impl Fn(&str) -> String, high: f64) -> HistogramFamily {
    std::array::from_fn(|i| {
        let title = title(DepositType::ALL[i].label());
        Histogram::new(format!("{prefix}{i}"), title.clone(), NBINS, 0.0, high)
            .with_axis_titles(title, "Events")
    })
}

impl DepositHistograms {
    fn book(energy_max: f64) -> Self {
        let pdg_title = "PDG ID of first level secondary";
        Self {
            hits: book_family("Hits", |t| format!("Number of hits ({t})"), NBINS as f64),
            e1t0: book_family("E1T0", |t| format!("E1 (Loss {t}) in GeV"), energy_max),
            e9t0: book_family("E9T0", |t| format!("E9 (Loss {t}) in GeV"), energy_max),
            e1t1: book_family(
                "E1T1",
                |t| format!("E1 (Loss {t} with t < 400 ns) in GeV"),
                energy_max,
            ),
            e9t1: book_family(
                "E9T1",
                |t| format!("E9 (Loss {t} with t < 400 ns) in GeV"),
                energy_max,
            ),
            pdg_type: Histogram::new("PDGType", pdg_title, NBINS, -2500.0, 2500.0)
                .with_axis_titles(pdg_title, "Tracks"),
        }
    }
    /// Fills every family once with the sums of one event.
    pub fn fill(&mut self, deposits: &DepositAccumulator) {
        for kind in DepositType::ALL {
            let i = kind.index();
            let d = deposits.get(kind);
            debug!(
                "Type({i}) Hit {} E10 {} E11 {} E90 {} E91 {}",
                d.hits, d.tagged_energy, d.tagged_energy_early, d.energy, d.energy_early
            );
            self.hits[i].fill(d.hits);
            self.e1t0[i].fill(d.tagged_energy);
            self.e9t0[i].fill(d.energy);
            self.e1t1[i].fill(d.tagged_energy_early);
            self.e9t1[i].fill(d.energy_early);
        }
    }
}

/// Fills deposit histograms from the calorimeter hits of each event.
#[derive(Clone, Debug)]
pub struct CalorimeterDepositClassifier {
    calo_hit_source: InputTag,
    sim_track_tag: InputTag,
    histograms: DepositHistograms,
}

#[bon]
impl CalorimeterDepositClassifier {
    #[builder]
    pub fn new(
        #[builder(into)] calo_hit_source: InputTag,
        #[builder(into, default = "g4SimHits".to_owned())] module_label_tk: String,
        energy_max: f64,
    ) -> Result<Self, ConfigError> {
        if !(energy_max.is_finite() && energy_max > 0.0) {
            return Err(ConfigError::Invalid {
                name: "EnergyMax".into(),
                reason: format!("{energy_max} is not a positive number"),
            });
        }
        info!(
            "CalorimeterDepositClassifier::Source {calo_hit_source} Track Label {module_label_tk} Energy Max {energy_max}"
        );

        Ok(Self {
            calo_hit_source,
            sim_track_tag: InputTag::new(module_label_tk, ""),
            histograms: DepositHistograms::book(energy_max),
        })
    }
}

impl CalorimeterDepositClassifier {
    /// Builds the classifier from the `caloHitSource`, `EnergyMax` and
    /// untracked `moduleLabelTk` parameters.
    pub fn from_parameters(pset: &ParameterSet) -> Result<Self, ConfigError> {
        let default_label = "g4SimHits".to_owned();
        Self::builder()
            .calo_hit_source(pset.get::<InputTag>("caloHitSource")?)
            .module_label_tk(pset.get_untracked_or("moduleLabelTk", default_label)?)
            .energy_max(pset.get("EnergyMax")?)
            .build()
    }
    pub fn histograms(&self) -> &DepositHistograms {
        &self.histograms
    }
    /// Hands the run's histograms over to the caller.
    pub fn into_histograms(self) -> DepositHistograms {
        self.histograms
    }
    /// Classifies the hits of one event and fills the histograms.
    pub fn analyze_hits(
        &mut self,
        hits: &[CaloHit],
        tracks: &[SimTrack],
        vertices: &[SimVertex],
    ) {
        let deposits = accumulate(hits, tracks);
        self.histograms.fill(&deposits);

        debug!("{} tracks and {} vertices", tracks.len(), vertices.len());
        for pdg_id in first_level_secondaries(tracks, vertices) {
            self.histograms.pdg_type.fill(f64::from(pdg_id));
        }
    }
}

impl Analyzer for CalorimeterDepositClassifier {
    fn analyze(&mut self, event: &Event, _setup: &EventSetup) -> Result<(), Error> {
        debug!("Run = {} Event = {}", event.id().run, event.id().event);

        let Ok(hits) = event.get_by_label::<Vec<CaloHit>>(&self.calo_hit_source) else {
            debug!("No hits with tag {}", self.calo_hit_source);
            return Ok(());
        };
        debug!("Hit buffer {}", hits.len());
        let tracks = event.get_by_label::<Vec<SimTrack>>(&self.sim_track_tag)?;
        let vertices = event.get_by_label::<Vec<SimVertex>>(&self.sim_track_tag)?;

        self.analyze_hits(hits, tracks, vertices);
        Ok(())
    }
}
