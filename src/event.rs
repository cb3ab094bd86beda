use crate::hepmc::GenEvent;
use crate::hi_event::HeavyIonEventSummary;
use crate::pdt::ParticleDataTable;
use crate::sim::{CaloHit, SimTrack, SimVertex};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Key of a data product within an [`Event`]: the label of the module that
/// made it plus an optional instance name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputTag {
    pub label: String,
    pub instance: String,
}

impl InputTag {
    pub fn new(label: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instance: instance.into(),
        }
    }
}

impl From<&str> for InputTag {
    /// Splits `"label:instance"` at the first colon. A string without a
    /// colon is a bare label.
    ///
    /// # Examples
    ///
    /// ```
    /// use simana::event::InputTag;
    ///
    /// let tag = InputTag::from("g4SimHits:EcalHitsEB");
    /// assert_eq!(tag, InputTag::new("g4SimHits", "EcalHitsEB"));
    /// assert_eq!(tag.to_string(), "g4SimHits:EcalHitsEB");
    /// assert_eq!(InputTag::from("generator").instance, "");
    /// ```
    fn from(s: &str) -> Self {
        match s.split_once(':') {
            Some((label, instance)) => Self::new(label, instance),
            None => Self::new(s, ""),
        }
    }
}

impl From<&String> for InputTag {
    fn from(s: &String) -> Self {
        Self::from(s.as_str())
    }
}

impl fmt::Display for InputTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance.is_empty() {
            write!(f, "{}", self.label)
        } else {
            write!(f, "{}:{}", self.label, self.instance)
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EventId {
    pub run: u32,
    pub event: u64,
}

/// Error returned when a requested product is not in the event.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("product not found: {kind} with tag `{tag}`")]
pub struct MissingProductError {
    pub kind: &'static str,
    pub tag: InputTag,
}

#[derive(Clone, Debug, Default)]
pub struct Products {
    gen_events: HashMap<InputTag, GenEvent>,
    calo_hits: HashMap<InputTag, Vec<CaloHit>>,
    sim_tracks: HashMap<InputTag, Vec<SimTrack>>,
    sim_vertices: HashMap<InputTag, Vec<SimVertex>>,
    hi_summaries: HashMap<InputTag, HeavyIonEventSummary>,
}

mod private {
    pub trait Sealed {}
}

/// A type that can be stored in and retrieved from an [`Event`].
pub trait Product: private::Sealed + Sized {
    /// Name used in error messages.
    const KIND: &'static str;

    #[doc(hidden)]
    fn store(products: &Products) -> &HashMap<InputTag, Self>;
    #[doc(hidden)]
    fn store_mut(products: &mut Products) -> &mut HashMap<InputTag, Self>;
}

macro_rules! impl_product {
    ($t:ty, $kind:literal, $field:ident) => {
        impl private::Sealed for $t {}

        impl Product for $t {
            const KIND: &'static str = $kind;

            fn store(products: &Products) -> &HashMap<InputTag, Self> {
                &products.$field
            }
            fn store_mut(products: &mut Products) -> &mut HashMap<InputTag, Self> {
                &mut products.$field
            }
        }
    };
}

impl_product!(GenEvent, "GenEvent", gen_events);
impl_product!(Vec<CaloHit>, "CaloHits", calo_hits);
impl_product!(Vec<SimTrack>, "SimTracks", sim_tracks);
impl_product!(Vec<SimVertex>, "SimVertices", sim_vertices);
impl_product!(HeavyIonEventSummary, "HeavyIonEventSummary", hi_summaries);

/// The data products of one collision event.
#[derive(Clone, Debug, Default)]
pub struct Event {
    id: EventId,
    products: Products,
}

impl Event {
    pub fn new(id: EventId) -> Self {
        Self {
            id,
            products: Products::default(),
        }
    }
    pub fn id(&self) -> EventId {
        self.id
    }
    /// Stores a product, replacing any product of the same type and tag.
    pub fn insert<P: Product>(&mut self, tag: impl Into<InputTag>, product: P) -> Option<P> {
        P::store_mut(&mut self.products).insert(tag.into(), product)
    }
    /// Looks up a product by tag.
    ///
    /// Required products are read with `?`. Optional products are checked
    /// with e.g. `.ok()` before use.
    ///
    /// # Examples
    ///
    /// ```
    /// use simana::event::{Event, EventId, InputTag};
    /// use simana::sim::CaloHit;
    ///
    /// let mut event = Event::new(EventId::default());
    /// event.insert("g4SimHits:EcalHitsEB", Vec::<CaloHit>::new());
    ///
    /// let tag = InputTag::from("g4SimHits:EcalHitsEB");
    /// assert!(event.get_by_label::<Vec<CaloHit>>(&tag).is_ok());
    /// assert!(event.get_by_label::<Vec<CaloHit>>(&InputTag::from("other")).is_err());
    /// ```
    pub fn get_by_label<P: Product>(&self, tag: &InputTag) -> Result<&P, MissingProductError> {
        P::store(&self.products)
            .get(tag)
            .ok_or_else(|| MissingProductError {
                kind: P::KIND,
                tag: tag.clone(),
            })
    }
}

/// Conditions shared by all events of a run.
#[derive(Clone, Debug, Default)]
pub struct EventSetup {
    particle_data_table: Option<ParticleDataTable>,
}

impl EventSetup {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_particle_data_table(mut self, table: ParticleDataTable) -> Self {
        self.particle_data_table = Some(table);
        self
    }
    pub fn particle_data_table(&self) -> Result<&ParticleDataTable, MissingProductError> {
        self.particle_data_table
            .as_ref()
            .ok_or_else(|| MissingProductError {
                kind: "ParticleDataTable",
                tag: InputTag::default(),
            })
    }
}
