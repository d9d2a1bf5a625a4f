use crate::error::Result;
use kvmon_common::{MetricSample, Observation};
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

pub const METRIC_NAME: &str = "consul_kv_modify_index";
pub const METRIC_HELP: &str = "Consul KV Modify Index";

const LABEL_DC: &str = "dc";
const LABEL_KEY: &str = "key";

/// Latest modify index per `(dc, key)`, shared by every poller.
///
/// The store owns its own [`Registry`] instead of using the process-wide
/// default one, so each instance is independent. Values are last-write-wins
/// and series are never removed once created.
///
/// # Examples
///
/// ```
/// use kvmon_storage::MetricStore;
///
/// let store = MetricStore::new().unwrap();
/// store.observe("dc1", "app/flag", 7.0);
/// store.observe("dc1", "app/flag", 9.0);
///
/// let samples = store.snapshot();
/// assert_eq!(samples.len(), 1);
/// assert_eq!(samples[0].value, 9.0);
/// ```
pub struct MetricStore {
    registry: Registry,
    modify_index: GaugeVec,
}

impl MetricStore {
    /// Creates the gauge vector and registers it in a fresh registry.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let modify_index = GaugeVec::new(Opts::new(METRIC_NAME, METRIC_HELP), &[LABEL_DC, LABEL_KEY])?;
        registry.register(Box::new(modify_index.clone()))?;

        Ok(Self {
            registry,
            modify_index,
        })
    }

    /// Sets the current value for `(dc, key)`, replacing any previous one.
    pub fn observe(&self, dc: &str, key: &str, value: f64) {
        self.modify_index.with_label_values(&[dc, key]).set(value);
    }

    /// Stores one parsed observation; see [`MetricStore::observe`].
    pub fn record(&self, observation: &Observation) {
        self.observe(&observation.dc, &observation.key, observation.version);
    }

    /// Returns every stored `(dc, key, value)` triple, sorted by dc then key.
    pub fn snapshot(&self) -> Vec<MetricSample> {
        let mut samples: Vec<MetricSample> = self
            .registry
            .gather()
            .iter()
            .filter(|family| family.get_name() == METRIC_NAME)
            .flat_map(samples_of)
            .collect();
        samples.sort_by(|a, b| a.dc.cmp(&b.dc).then_with(|| a.key.cmp(&b.key)));
        samples
    }

    /// Number of distinct `(dc, key)` series currently stored.
    pub fn len(&self) -> usize {
        self.registry
            .gather()
            .iter()
            .filter(|family| family.get_name() == METRIC_NAME)
            .map(|family| family.get_metric().len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encodes the store in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Content type matching [`MetricStore::render`] output.
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }
}

fn samples_of(family: &MetricFamily) -> Vec<MetricSample> {
    family
        .get_metric()
        .iter()
        .filter_map(|metric| {
            let mut dc = None;
            let mut key = None;
            for pair in metric.get_label() {
                match pair.get_name() {
                    LABEL_DC => dc = Some(pair.get_value()),
                    LABEL_KEY => key = Some(pair.get_value()),
                    _ => {}
                }
            }
            match (dc, key) {
                (Some(dc), Some(key)) => Some(MetricSample {
                    dc: dc.to_string(),
                    key: key.to_string(),
                    value: metric.get_gauge().get_value(),
                }),
                _ => {
                    tracing::warn!(metric = METRIC_NAME, "Gathered sample without dc/key labels");
                    None
                }
            }
        })
        .collect()
}
