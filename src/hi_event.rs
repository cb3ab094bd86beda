//! Heavy-ion event summary from generator-level records.
use crate::event::{Event, EventSetup, InputTag};
use crate::hepmc::GenEvent;
use crate::params::{ConfigError, ParameterSet};
use crate::pdt::ParticleDataTable;
use crate::{Error, Producer};
use bon::bon;
use log::debug;
use serde::{Deserialize, Serialize};

/// |η| below which a particle is at mid-rapidity.
const MID_RAPIDITY: f64 = 0.5;
/// |η| below which energy enters the transverse-energy sum.
const ENERGY_ACCEPTANCE: f64 = 1.0;

/// Collision geometry and charged-particle statistics of one event.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeavyIonEventSummary {
    /// Impact parameter; `-1` if no record carried collision geometry.
    pub b: f64,
    /// Number of participant nucleons; `-1` if unknown.
    pub npart: i32,
    pub ncoll: i32,
    pub nhard: i32,
    /// Event-plane angle.
    pub phi: f64,
    #[serde(rename = "nCharged")]
    pub n_charged: i32,
    #[serde(rename = "nChargedMR")]
    pub n_charged_mr: i32,
    #[serde(rename = "meanPt")]
    pub mean_pt: f64,
    #[serde(rename = "meanPtMR")]
    pub mean_pt_mr: f64,
    /// Half of the energy of charged particles with |η| < 1.
    #[serde(rename = "EtMR")]
    pub et_mr: f64,
    #[serde(rename = "nChargedPtCut")]
    pub n_charged_pt_cut: i32,
    #[serde(rename = "nChargedPtCutMR")]
    pub n_charged_pt_cut_mr: i32,
}

impl Default for HeavyIonEventSummary {
    fn default() -> Self {
        Self {
            b: -1.0,
            npart: -1,
            ncoll: 0,
            nhard: 0,
            phi: 0.0,
            n_charged: 0,
            n_charged_mr: 0,
            mean_pt: 0.0,
            mean_pt_mr: 0.0,
            et_mr: 0.0,
            n_charged_pt_cut: 0,
            n_charged_pt_cut_mr: 0,
        }
    }
}

/// Produces one [`HeavyIonEventSummary`] per event from the configured
/// generator records.
#[derive(Clone, Debug)]
pub struct HeavyIonEventSummarizer {
    generators: Vec<InputTag>,
    pt_cut: f64,
    do_get_data: bool,
    // Only filled through `do_get_data`.
    pdt: Option<ParticleDataTable>,
}

#[bon]
impl HeavyIonEventSummarizer {
    #[builder]
    pub fn new(
        #[builder(field)] generators: Vec<InputTag>,
        pt_cut: f64,
        #[builder(default)] do_get_data: bool,
    ) -> Result<Self, ConfigError> {
        if generators.is_empty() {
            return Err(ConfigError::Invalid {
                name: "generators".into(),
                reason: "at least one generator source is required".into(),
            });
        }
        if !pt_cut.is_finite() {
            return Err(ConfigError::Invalid {
                name: "ptCut".into(),
                reason: format!("{pt_cut} is not a finite number"),
            });
        }

        Ok(Self {
            generators,
            pt_cut,
            do_get_data,
            pdt: None,
        })
    }
}

impl<S: heavy_ion_event_summarizer_builder::State> HeavyIonEventSummarizerBuilder<S> {
    /// Add a generator record source. Sources are read in the order they are
    /// added.
    pub fn generator(mut self, tag: impl Into<InputTag>) -> Self {
        self.generators.push(tag.into());
        self
    }
}

impl HeavyIonEventSummarizer {
    /// Builds the summarizer from the `generators`, `ptCut` and `DoGetData`
    /// parameters.
    pub fn from_parameters(pset: &ParameterSet) -> Result<Self, ConfigError> {
        let generators: Vec<String> = pset.get("generators")?;

        generators
            .iter()
            .fold(Self::builder(), |builder, label| builder.generator(label))
            .pt_cut(pset.get("ptCut")?)
            .do_get_data(pset.get("DoGetData")?)
            .build()
    }
    pub fn generators(&self) -> &[InputTag] {
        &self.generators
    }
    pub fn pt_cut(&self) -> f64 {
        self.pt_cut
    }
    /// Computes the summary of `event` using `pdt` for particle charges.
    ///
    /// Fails if a configured generator record is missing from the event, or
    /// if a final-state particle has no entry in `pdt`.
    pub fn summarize(
        &self,
        event: &Event,
        pdt: &ParticleDataTable,
    ) -> Result<HeavyIonEventSummary, Error> {
        let mut summary = HeavyIonEventSummary::default();
        let mut total_energy = 0.0;

        for tag in &self.generators {
            let record: &GenEvent = event.get_by_label(tag)?;

            for particle in record.final_state() {
                let charge = pdt
                    .particle(particle.pdg_id)
                    .ok_or(Error::UnknownParticle(particle.pdg_id))?
                    .integer_charge();
                if charge == 0 {
                    continue;
                }
                let pt = particle.momentum.perp();
                let eta = particle.momentum.eta();
                let energy = particle.momentum.e();

                summary.n_charged += 1;
                summary.mean_pt += pt;
                if eta.abs() < ENERGY_ACCEPTANCE {
                    total_energy += energy;
                }
                if pt > self.pt_cut {
                    summary.n_charged_pt_cut += 1;
                    if eta.abs() < MID_RAPIDITY {
                        summary.n_charged_pt_cut_mr += 1;
                    }
                }

                if eta.abs() > MID_RAPIDITY {
                    continue;
                }
                summary.n_charged_mr += 1;
                summary.mean_pt_mr += pt;
            }

            if let Some(hi) = &record.heavy_ion {
                // Summed over all sources, even if they describe the same
                // collision. Header values are not validated, so wrap.
                summary.ncoll = summary.ncoll.wrapping_add(hi.ncoll);
                summary.nhard = summary.nhard.wrapping_add(hi.ncoll_hard);
                let npart = hi.npart();
                if npart >= 0 {
                    summary.npart = npart;
                    summary.b = hi.impact_parameter;
                    summary.phi = hi.event_plane_angle;
                }
            }
        }

        if total_energy != 0.0 {
            summary.et_mr = total_energy / 2.0;
        }
        if summary.n_charged_mr != 0 {
            summary.mean_pt_mr /= f64::from(summary.n_charged_mr);
        }
        if summary.n_charged != 0 {
            summary.mean_pt /= f64::from(summary.n_charged);
        }

        Ok(summary)
    }
}

impl Producer for HeavyIonEventSummarizer {
    type Product = HeavyIonEventSummary;

    fn produce(&mut self, event: &Event, setup: &EventSetup) -> Result<Self::Product, Error> {
        // Cleared on every call; the cached table is never fetched.
        self.do_get_data = false;
        if self.do_get_data && self.pdt.is_none() {
            self.pdt = Some(setup.particle_data_table()?.clone());
        }
        let pdt = match &self.pdt {
            Some(pdt) => pdt,
            None => setup.particle_data_table()?,
        };

        let summary = self.summarize(event, pdt)?;
        debug!(
            "Run = {} Event = {} b {} npart {} ncoll {} nhard {} nCharged {} nChargedMR {} meanPt {} meanPtMR {} EtMR {}",
            event.id().run,
            event.id().event,
            summary.b,
            summary.npart,
            summary.ncoll,
            summary.nhard,
            summary.n_charged,
            summary.n_charged_mr,
            summary.mean_pt,
            summary.mean_pt_mr,
            summary.et_mr,
        );

        Ok(summary)
    }
}
