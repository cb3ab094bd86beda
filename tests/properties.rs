use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};
use simana::event::{Event, EventId, EventSetup};
use simana::hepmc::{FourMomentum, GenEvent, GenParticle, HeavyIon};
use simana::pdt::ParticleDataTable;
use simana::sim::{CaloHit, SimTrack, SimVertex};
use simana::xtal_dedx::{accumulate, DepositType, TAGGED_CELL_ID};
use simana::{Analyzer, CalorimeterDepositClassifier, HeavyIonEventSummarizer, Producer};

const SPECIES: [i32; 10] = [211, -211, 321, -321, 2212, -2212, 22, 111, 2112, 11];

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_record<R: Rng>(rng: &mut R, n: usize) -> Result<GenEvent> {
    let pt = Exp::new(2.0).context("failed to create exponential distribution")?;
    let particles = (0..n)
        .map(|_| GenParticle {
            momentum: FourMomentum::from_pt_eta_phi(
                pt.sample(rng),
                rng.random_range(-2.5..2.5),
                rng.random_range(-3.1..3.1),
            ),
            pdg_id: SPECIES[rng.random_range(0..SPECIES.len())],
            status: if rng.random_bool(0.8) { 1 } else { 2 },
        })
        .collect();

    Ok(GenEvent {
        particles,
        heavy_ion: Some(HeavyIon {
            ncoll: rng.random_range(0..1000),
            ncoll_hard: rng.random_range(0..10),
            npart_proj: rng.random_range(0..208),
            npart_targ: rng.random_range(0..208),
            impact_parameter: rng.random_range(0.0..15.0),
            event_plane_angle: rng.random_range(-3.1..3.1),
            ..Default::default()
        }),
    })
}

fn setup() -> EventSetup {
    EventSetup::new().with_particle_data_table(ParticleDataTable::standard())
}

fn summarizer() -> Result<HeavyIonEventSummarizer> {
    Ok(HeavyIonEventSummarizer::builder()
        .generator("generator")
        .generator("hiSignal")
        .pt_cut(1.0)
        .build()?)
}

#[test]
fn summary_is_reproducible() -> Result<()> {
    init_logger();
    let mut rng = StdRng::seed_from_u64(7);

    for n in 0..20 {
        let mut event = Event::new(EventId { run: 1, event: n });
        event.insert("generator", random_record(&mut rng, 200)?);
        event.insert("hiSignal", random_record(&mut rng, 50)?);

        let first = summarizer()?.produce(&event, &setup())?;
        let second = summarizer()?.produce(&event, &setup())?;
        assert_eq!(first, second);

        // Same instance, same event: nothing leaks from the previous call.
        let mut reused = summarizer()?;
        let _ = reused.produce(&event, &setup())?;
        assert_eq!(reused.produce(&event, &setup())?, first);
    }

    Ok(())
}

#[test]
fn summary_counts_are_consistent() -> Result<()> {
    init_logger();
    let mut rng = StdRng::seed_from_u64(11);

    for n in 0..20 {
        let mut event = Event::new(EventId { run: 1, event: n });
        event.insert("generator", random_record(&mut rng, 300)?);
        event.insert("hiSignal", random_record(&mut rng, 10)?);
        let summary = summarizer()?.produce(&event, &setup())?;

        assert!(summary.n_charged_mr <= summary.n_charged);
        assert!(summary.n_charged_pt_cut <= summary.n_charged);
        assert!(summary.n_charged_pt_cut_mr <= summary.n_charged_pt_cut);
        assert!(summary.n_charged_pt_cut_mr <= summary.n_charged_mr);
        assert!(summary.mean_pt >= 0.0);
        assert!(summary.et_mr >= 0.0);
        assert!(summary.npart >= 0);
    }

    Ok(())
}

#[test]
fn summary_serialized_names() -> Result<()> {
    let mut event = Event::new(EventId::default());
    event.insert("generator", GenEvent::default());
    event.insert("hiSignal", GenEvent::default());
    let summary = summarizer()?.produce(&event, &setup())?;

    let json = serde_json::to_value(summary)?;
    assert_eq!(json["b"], -1.0);
    assert_eq!(json["npart"], -1);
    assert_eq!(json["nCharged"], 0);
    assert_eq!(json["nChargedMR"], 0);
    assert_eq!(json["meanPtMR"], 0.0);
    assert_eq!(json["EtMR"], 0.0);
    assert_eq!(json["nChargedPtCutMR"], 0);

    Ok(())
}

fn random_sim<R: Rng>(rng: &mut R) -> (Vec<CaloHit>, Vec<SimTrack>, Vec<SimVertex>) {
    let tracks: Vec<SimTrack> = (1..=50)
        .map(|track_id| SimTrack {
            track_id,
            pdg_id: [11, -11, 13, -13, 22, 211][rng.random_range(0..6)],
            vert_index: rng.random_range(-1..40),
            no_gen_part: track_id > 5,
        })
        .collect();
    let vertices = (0..30)
        .map(|_| SimVertex {
            parent_index: rng.random_range(0..60),
        })
        .collect();
    let hits = (0..500)
        .map(|_| CaloHit {
            energy: rng.random_range(0.0..0.01),
            time: rng.random_range(0.0..800.0),
            id: if rng.random_bool(0.3) {
                TAGGED_CELL_ID
            } else {
                9
            },
            geant_track_id: rng.random_range(0..60),
        })
        .collect();

    (hits, tracks, vertices)
}

#[test]
fn deposits_each_hit_in_one_type() {
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..20 {
        let (hits, tracks, _) = random_sim(&mut rng);
        let deposits = accumulate(&hits, &tracks);
        let total = deposits.get(DepositType::Total);
        let parts = &DepositType::ALL[1..];

        let hit_sum: f64 = parts.iter().map(|&k| deposits.get(k).hits).sum();
        assert_eq!(hit_sum, total.hits);
        assert_eq!(total.hits, hits.len() as f64);

        let energy_sum: f64 = parts.iter().map(|&k| deposits.get(k).energy).sum();
        assert!((energy_sum - total.energy).abs() < 1e-9);
        let tagged_sum: f64 = parts
            .iter()
            .map(|&k| deposits.get(k).tagged_energy_early)
            .sum();
        assert!((tagged_sum - total.tagged_energy_early).abs() < 1e-9);

        assert!(total.tagged_energy_early <= total.tagged_energy);
        assert!(total.tagged_energy <= total.energy);
        assert!(total.energy_early <= total.energy);
    }
}

#[test]
fn classifier_over_many_events() -> Result<()> {
    init_logger();
    let mut rng = StdRng::seed_from_u64(5);
    let mut classifier = CalorimeterDepositClassifier::builder()
        .calo_hit_source("g4SimHits:EcalHitsEB")
        .energy_max(10.0)
        .build()?;

    for n in 0..25 {
        let (hits, tracks, vertices) = random_sim(&mut rng);
        let mut event = Event::new(EventId { run: 1, event: n });
        event.insert("g4SimHits:EcalHitsEB", hits);
        event.insert("g4SimHits", tracks);
        event.insert("g4SimHits", vertices);
        classifier.analyze(&event, &setup())?;
    }

    let histograms = classifier.into_histograms();
    for family in [
        &histograms.hits,
        &histograms.e1t0,
        &histograms.e9t0,
        &histograms.e1t1,
        &histograms.e9t1,
    ] {
        assert!(family.iter().all(|h| h.entries() == 25));
    }
    let hits = &histograms.hits[0];
    assert_eq!(hits.bin_content(hits.find_bin(500.0)), 25.0);
    // Secondaries only come from tracks 6..=50, each at most once per event.
    assert!(histograms.pdg_type.entries() <= 25 * 45);

    Ok(())
}
