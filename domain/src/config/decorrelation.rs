//! Decorrelation schedule
//!
//! Each worker gets its own sampling parameters so separately-sampled
//! workers are less likely to fail the same way. The engine only forwards
//! these values; it never interprets them.

use serde::{Deserialize, Serialize};

/// Sampling parameters handed to one worker
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Sampling seed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl SamplingParams {
    pub fn with_temperature(temperature: f64) -> Self {
        Self {
            temperature: Some(temperature),
            seed: None,
        }
    }

    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Ordered sampling parameters, one per worker index
///
/// # Example
///
/// ```
/// use tally_domain::DecorrelationSchedule;
///
/// let schedule = DecorrelationSchedule::linear(3, 0.2, 1.0);
/// assert_eq!(schedule.len(), 3);
/// assert_eq!(schedule.get(0).unwrap().temperature, Some(0.2));
/// assert_eq!(schedule.get(2).unwrap().temperature, Some(1.0));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecorrelationSchedule(Vec<SamplingParams>);

impl DecorrelationSchedule {
    pub fn new(params: Vec<SamplingParams>) -> Self {
        Self(params)
    }

    /// One entry per temperature, in order
    pub fn from_temperatures(temperatures: &[f64]) -> Self {
        Self(
            temperatures
                .iter()
                .map(|t| SamplingParams::with_temperature(*t))
                .collect(),
        )
    }

    /// `count` temperatures spread evenly over `[min, max]`, each seeded
    /// with its worker index
    pub fn linear(count: usize, min: f64, max: f64) -> Self {
        let params = (0..count)
            .map(|i| {
                let t = if count <= 1 {
                    min
                } else {
                    min + (max - min) * i as f64 / (count - 1) as f64
                };
                SamplingParams::with_temperature(round_to(t, 3)).seeded(i as u64)
            })
            .collect();
        Self(params)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, worker_index: usize) -> Option<&SamplingParams> {
        self.0.get(worker_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SamplingParams> {
        self.0.iter()
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_spread() {
        let schedule = DecorrelationSchedule::linear(5, 0.0, 1.0);
        let temps: Vec<_> = schedule.iter().map(|p| p.temperature.unwrap()).collect();
        assert_eq!(temps, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(schedule.get(4).unwrap().seed, Some(4));
    }

    #[test]
    fn test_linear_single_worker() {
        let schedule = DecorrelationSchedule::linear(1, 0.7, 1.0);
        assert_eq!(schedule.get(0).unwrap().temperature, Some(0.7));
    }

    #[test]
    fn test_from_temperatures() {
        let schedule = DecorrelationSchedule::from_temperatures(&[0.1, 0.9]);
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.get(1).unwrap().temperature, Some(0.9));
        assert!(schedule.get(1).unwrap().seed.is_none());
    }

    #[test]
    fn test_serialize_as_list() {
        let schedule = DecorrelationSchedule::from_temperatures(&[0.5]);
        let json = serde_json::to_string(&schedule).unwrap();
        assert_eq!(json, r#"[{"temperature":0.5}]"#);
    }
}
