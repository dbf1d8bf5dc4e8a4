//! Latency models
//!
//! Both non-trivial models follow the Decker-Wattenhofer propagation
//! measurements: delay grows with message size.

use crate::error::{NetworkError, NetworkResult};
use crate::ports::LatencyModel;
use serde::{Deserialize, Serialize};
use shared_types::SimTime;

/// Latency model selector as spelled in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NetworkModel {
    /// Instant delivery.
    #[default]
    Zero,
    /// `per_kb_delay * size_kb`.
    #[serde(rename = "Constant-Decker-Wattenhorf")]
    ConstantDeckerWattenhofer,
    /// Two hops of `link_latency + size / bandwidth`.
    #[serde(rename = "Decker-Wattenhorf")]
    DeckerWattenhofer,
}

impl NetworkModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkModel::Zero => "Zero",
            NetworkModel::ConstantDeckerWattenhofer => "Constant-Decker-Wattenhorf",
            NetworkModel::DeckerWattenhofer => "Decker-Wattenhorf",
        }
    }
}

/// Link constants shared by the size-dependent models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkParams {
    /// One-way link latency in seconds.
    pub link_latency_secs: f64,
    /// Link bandwidth in bits per second.
    pub bandwidth_bps: f64,
    /// Propagation delay per kilobyte for the constant model.
    pub per_kb_delay_secs: f64,
}

impl Default for LinkParams {
    fn default() -> Self {
        Self {
            link_latency_secs: 0.1,
            bandwidth_bps: 8_000_000.0,
            per_kb_delay_secs: 0.08,
        }
    }
}

impl LinkParams {
    pub fn validate(&self) -> NetworkResult<()> {
        let checks = [
            ("link_latency_secs", self.link_latency_secs, self.link_latency_secs >= 0.0, "non-negative"),
            ("bandwidth_bps", self.bandwidth_bps, self.bandwidth_bps > 0.0, "positive"),
            ("per_kb_delay_secs", self.per_kb_delay_secs, self.per_kb_delay_secs >= 0.0, "non-negative"),
        ];
        for (name, value, ok, requirement) in checks {
            if !value.is_finite() || !ok {
                return Err(NetworkError::InvalidLinkParameter {
                    name,
                    value,
                    requirement,
                });
            }
        }
        Ok(())
    }
}

pub fn zero_latency() -> SimTime {
    0.0
}

pub fn constant_model(size_bytes: u64, params: &LinkParams) -> SimTime {
    params.per_kb_delay_secs * size_bytes as f64 / 1000.0
}

pub fn variable_model(size_bytes: u64, params: &LinkParams) -> SimTime {
    let transmission = size_bytes as f64 * 8.0 / params.bandwidth_bps;
    2.0 * (params.link_latency_secs + transmission)
}

/// A model bound to its link constants.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Network {
    pub model: NetworkModel,
    pub params: LinkParams,
}

impl Network {
    pub fn new(model: NetworkModel, params: LinkParams) -> Self {
        Self { model, params }
    }
}

impl LatencyModel for Network {
    fn delay(&self, size_bytes: u64) -> SimTime {
        match self.model {
            NetworkModel::Zero => zero_latency(),
            NetworkModel::ConstantDeckerWattenhofer => constant_model(size_bytes, &self.params),
            NetworkModel::DeckerWattenhofer => variable_model(size_bytes, &self.params),
        }
    }
}
