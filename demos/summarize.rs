/// Runs both modules over a handful of generated events, the way the driving
/// framework would.
use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simana::event::{Event, EventId, EventSetup};
use simana::hepmc::{FourMomentum, GenEvent, GenParticle, HeavyIon};
use simana::params::ParameterSet;
use simana::pdt::ParticleDataTable;
use simana::sim::{CaloHit, SimTrack, SimVertex};
use simana::{Analyzer, CalorimeterDepositClassifier, HeavyIonEventSummarizer, Producer};
use std::str::FromStr;

const SUMMARIZER_CONFIG: &str = r#"
generators = ["generator"]
ptCut = 1.0
DoGetData = false
"#;

const CLASSIFIER_CONFIG: &str = r#"
caloHitSource = "g4SimHits:EcalHitsEB"
EnergyMax = 2.0
untracked moduleLabelTk = "g4SimHits"
"#;

fn main() -> Result<()> {
    env_logger::init();

    // ===========================================
    // Module configuration and run conditions.
    let mut summarizer =
        HeavyIonEventSummarizer::from_parameters(&ParameterSet::from_str(SUMMARIZER_CONFIG)?)?;
    let mut classifier =
        CalorimeterDepositClassifier::from_parameters(&ParameterSet::from_str(CLASSIFIER_CONFIG)?)?;
    let setup = EventSetup::new().with_particle_data_table(ParticleDataTable::standard());
    // ===========================================

    let mut rng = StdRng::seed_from_u64(42);
    for n in 0..10 {
        let mut event = Event::new(EventId { run: 1, event: n });
        event.insert("generator", generate_record(&mut rng));
        let (hits, tracks, vertices) = generate_sim(&mut rng);
        event.insert("g4SimHits:EcalHitsEB", hits);
        event.insert("g4SimHits", tracks);
        event.insert("g4SimHits", vertices);

        let summary = summarizer.produce(&event, &setup)?;
        classifier.analyze(&event, &setup)?;
        println!(
            "event {n}: b = {:.2} npart = {} nCharged = {} meanPt = {:.3} EtMR = {:.2}",
            summary.b, summary.npart, summary.n_charged, summary.mean_pt, summary.et_mr
        );
    }

    let histograms = classifier.into_histograms();
    for (i, hist) in histograms.e9t0.iter().enumerate() {
        println!("{} (type {i}): mean {:.4} GeV", hist.title(), hist.mean());
    }
    println!(
        "{}: {} entries",
        histograms.pdg_type.title(),
        histograms.pdg_type.entries()
    );

    Ok(())
}

fn generate_record(rng: &mut impl Rng) -> GenEvent {
    let particles = (0..500)
        .map(|_| GenParticle {
            momentum: FourMomentum::from_pt_eta_phi(
                rng.random_range(0.1..5.0),
                rng.random_range(-3.0..3.0),
                rng.random_range(-3.1..3.1),
            ),
            pdg_id: [211, -211, 111, 321, -321, 2212][rng.random_range(0..6)],
            status: 1,
        })
        .collect();

    GenEvent {
        particles,
        heavy_ion: Some(HeavyIon {
            ncoll: rng.random_range(100..1500),
            ncoll_hard: rng.random_range(0..5),
            npart_proj: rng.random_range(20..208),
            npart_targ: rng.random_range(20..208),
            impact_parameter: rng.random_range(0.0..14.0),
            event_plane_angle: rng.random_range(-3.1..3.1),
            ..Default::default()
        }),
    }
}

fn generate_sim(rng: &mut impl Rng) -> (Vec<CaloHit>, Vec<SimTrack>, Vec<SimVertex>) {
    let tracks: Vec<SimTrack> = (1..=20)
        .map(|track_id| SimTrack {
            track_id,
            pdg_id: [11, 13, 22][rng.random_range(0..3)],
            vert_index: rng.random_range(0..10),
            no_gen_part: track_id > 2,
        })
        .collect();
    let vertices = (0..10)
        .map(|_| SimVertex {
            parent_index: rng.random_range(1..=20),
        })
        .collect();
    let hits = (0..100)
        .map(|_| CaloHit {
            energy: rng.random_range(0.0..0.005),
            time: rng.random_range(0.0..600.0),
            id: if rng.random_bool(0.5) { 22 } else { 23 },
            geant_track_id: rng.random_range(1..=20),
        })
        .collect();

    (hits, tracks, vertices)
}
