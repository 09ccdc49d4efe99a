//! The two metric families recorded per request.
//!
//! | Family | Type | Labels |
//! |---|---|---|
//! | `hits` | counter | `status`, `path`, `method` |
//! | `method_timings` | histogram (seconds) | one label, see [`TimingLabel`] |
//!
//! [`HttpMetrics`] owns both families. Create it once, share it behind an
//! `Arc`, and register it with whichever [`Registry`] the application
//! exports; nothing here touches a process-global registry.

use http::{Method, StatusCode};
use prometheus::core::Collector;
use prometheus::{CounterVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry};

use crate::error::Error;

/// What the single `method_timings` label holds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TimingLabel {
    /// Label `target`: the full request target, query string included.
    #[default]
    Target,
    /// Label `path`: the target without its query string.
    Path,
    /// Label `method`: the HTTP method.
    Method,
}

impl TimingLabel {
    pub fn name(self) -> &'static str {
        match self {
            Self::Target => "target",
            Self::Path => "path",
            Self::Method => "method",
        }
    }
}

/// Names, help text and buckets for [`HttpMetrics`].
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    namespace: Option<String>,
    hits_name: String,
    hits_help: String,
    timings_name: String,
    timings_help: String,
    buckets: Vec<f64>,
    timing_label: TimingLabel,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            hits_name: "hits".to_owned(),
            hits_help: "Handled HTTP requests by status, path and method".to_owned(),
            timings_name: "method_timings".to_owned(),
            timings_help: "Per method timing".to_owned(),
            buckets: prometheus::DEFAULT_BUCKETS.to_vec(),
            timing_label: TimingLabel::default(),
        }
    }
}

impl MetricsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix for both family names, joined with `_`.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn hits(mut self, name: impl Into<String>, help: impl Into<String>) -> Self {
        self.hits_name = name.into();
        self.hits_help = help.into();
        self
    }

    pub fn timings(mut self, name: impl Into<String>, help: impl Into<String>) -> Self {
        self.timings_name = name.into();
        self.timings_help = help.into();
        self
    }

    /// Histogram upper bounds in seconds, strictly increasing.
    pub fn buckets(mut self, buckets: Vec<f64>) -> Self {
        self.buckets = buckets;
        self
    }

    pub fn timing_label(mut self, label: TimingLabel) -> Self {
        self.timing_label = label;
        self
    }
}

/// The request counter and the latency histogram.
///
/// Cloning is cheap and clones share the same underlying series.
#[derive(Clone)]
pub struct HttpMetrics {
    hits: CounterVec,
    timings: HistogramVec,
    timing_label: TimingLabel,
}

impl HttpMetrics {
    /// Families with the default [`MetricsConfig`].
    pub fn new() -> Result<Self, Error> {
        Self::with_config(&MetricsConfig::default())
    }

    pub fn with_config(config: &MetricsConfig) -> Result<Self, Error> {
        let mut hits_opts = Opts::new(config.hits_name.as_str(), config.hits_help.as_str());
        let mut timings_opts = HistogramOpts::new(config.timings_name.as_str(), config.timings_help.as_str())
            .buckets(config.buckets.clone());
        if let Some(ns) = &config.namespace {
            hits_opts = hits_opts.namespace(ns.as_str());
            timings_opts = timings_opts.namespace(ns.as_str());
        }

        // HistogramVec only checks buckets when the first series is created.
        Histogram::with_opts(timings_opts.clone())?;

        Ok(Self {
            hits: CounterVec::new(hits_opts, &["status", "path", "method"])?,
            timings: HistogramVec::new(timings_opts, &[config.timing_label.name()])?,
            timing_label: config.timing_label,
        })
    }

    pub fn hits(&self) -> &CounterVec { &self.hits }
    pub fn timings(&self) -> &HistogramVec { &self.timings }
    pub fn timing_label(&self) -> TimingLabel { self.timing_label }

    /// Registers both families, returning the failures. A failure leaves the
    /// other family's registration in place.
    pub fn register(&self, registry: &Registry) -> Vec<prometheus::Error> {
        let collectors: [Box<dyn Collector>; 2] =
            [Box::new(self.hits.clone()), Box::new(self.timings.clone())];
        collectors
            .into_iter()
            .filter_map(|c| registry.register(c).err())
            .collect()
    }

    pub(crate) fn record_hit(&self, status: StatusCode, path: &str, method: &Method) -> prometheus::Result<()> {
        self.hits
            .get_metric_with_label_values(&[status.as_str(), path, method.as_str()])?
            .inc();
        Ok(())
    }

    pub(crate) fn observe_timing(&self, label: &str, seconds: f64) -> prometheus::Result<()> {
        self.timings.get_metric_with_label_values(&[label])?.observe(seconds);
        Ok(())
    }
}
