//! Series generator with sporadic anomaly injection.

use crate::config::GeneratorConfig;
use chrono::{DateTime, TimeDelta, Utc};
use procsim_core::{round_value, CoreError, ObservationRecord, ParameterDefinition, Series};
use rand::prelude::*;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Anomaly bookkeeping for one parameter over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterStats {
    pub name: String,
    /// Values emitted
    pub samples: u64,
    /// Anomaly candidates outside the normal band, kept as-is
    pub anomalies_injected: u64,
    /// Anomaly candidates inside the normal band, replaced by a normal draw
    pub anomalies_rejected: u64,
}

impl ParameterStats {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Share of samples that carry an injected anomaly.
    pub fn anomaly_rate(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.anomalies_injected as f64 / self.samples as f64
        }
    }
}

/// Per-parameter statistics, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub parameters: Vec<ParameterStats>,
}

impl GenerationStats {
    pub fn get(&self, name: &str) -> Option<&ParameterStats> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn total_injected(&self) -> u64 {
        self.parameters.iter().map(|p| p.anomalies_injected).sum()
    }

    pub fn total_rejected(&self) -> u64 {
        self.parameters.iter().map(|p| p.anomalies_rejected).sum()
    }
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct Generation {
    pub series: Series,
    pub stats: GenerationStats,
}

/// Draws observation records for a set of process parameters.
pub struct SeriesGenerator {
    rng: StdRng,
}

impl SeriesGenerator {
    /// Deterministic generator; identical seeds produce identical series.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded generator when a seed is given, entropy-seeded otherwise.
    pub fn with_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::from_entropy(),
        }
    }

    /// Generates a series ending one interval before now.
    pub fn generate(&mut self, config: &GeneratorConfig) -> procsim_core::Result<Generation> {
        self.generate_at(config, Utc::now())
    }

    /// Generates a series as if run at `generated_at`.
    ///
    /// Record `i` is stamped `generated_at - N·Δt + i·Δt`.
    pub fn generate_at(
        &mut self,
        config: &GeneratorConfig,
        generated_at: DateTime<Utc>,
    ) -> procsim_core::Result<Generation> {
        config.validate()?;

        let overflow = || CoreError::SpanOverflow {
            points: config.point_count,
            interval_secs: config.interval_secs,
        };

        let step = config.interval().num_nanoseconds().ok_or_else(overflow)?;
        let start = generated_at
            .checked_sub_signed(config.span()?)
            .ok_or_else(overflow)?;

        let distributions = config
            .parameters
            .iter()
            .map(|param| {
                Normal::new(param.mean, param.std_dev).map_err(|_| CoreError::InvalidStdDev {
                    name: param.name.clone(),
                    std_dev: param.std_dev,
                })
            })
            .collect::<procsim_core::Result<Vec<_>>>()?;

        let mut stats = GenerationStats {
            parameters: config.parameters.iter().map(|p| ParameterStats::new(&p.name)).collect(),
        };
        let mut series = Series::with_capacity(config.parameter_names(), config.point_count);

        for i in 0..config.point_count {
            // span() already proved point_count × step fits in i64
            let offset = TimeDelta::nanoseconds(step * i as i64);
            let timestamp = start.checked_add_signed(offset).ok_or_else(overflow)?;

            let values = config
                .parameters
                .iter()
                .zip(&distributions)
                .zip(stats.parameters.iter_mut())
                .map(|((param, normal), param_stats)| {
                    self.sample(param, normal, config.anomaly_probability, param_stats)
                })
                .collect();

            series.push(ObservationRecord::new(timestamp, values))?;
        }

        debug!(
            "Generated {} records ({} anomalies injected, {} rejected)",
            series.len(),
            stats.total_injected(),
            stats.total_rejected()
        );

        Ok(Generation { series, stats })
    }

    /// Draws one value for a parameter.
    ///
    /// A rejected anomaly candidate is replaced by exactly one normal draw, which is
    /// not checked again.
    fn sample(
        &mut self,
        param: &ParameterDefinition,
        normal: &Normal<f64>,
        anomaly_probability: f64,
        stats: &mut ParameterStats,
    ) -> f64 {
        let mut value = normal.sample(&mut self.rng);

        if self.rng.gen::<f64>() < anomaly_probability {
            let candidate = self
                .rng
                .gen_range(param.anomaly_range.low..param.anomaly_range.high);

            if param.is_clearly_anomalous(candidate) {
                value = candidate;
                stats.anomalies_injected += 1;
            } else {
                value = normal.sample(&mut self.rng);
                stats.anomalies_rejected += 1;
            }
        }

        stats.samples += 1;
        round_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use procsim_core::AnomalyRange;

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn temperature_only(point_count: usize, anomaly_probability: f64) -> GeneratorConfig {
        GeneratorConfig {
            point_count,
            interval_secs: 5.0,
            anomaly_probability,
            parameters: vec![ParameterDefinition::new(
                "Temperature",
                150.0,
                5.0,
                AnomalyRange::new(165.0, 175.0),
            )],
            ..Default::default()
        }
    }

    #[test]
    fn test_generates_exact_point_count() {
        let mut gen = SeriesGenerator::new(42);
        for n in [1, 2, 10, 257] {
            let out = gen.generate_at(&temperature_only(n, 0.02), fixed_now()).unwrap();
            assert_eq!(out.series.len(), n);
            assert_eq!(out.stats.parameters[0].samples, n as u64);
        }
    }

    #[test]
    fn test_timestamps_are_evenly_spaced_and_end_before_now() {
        let mut gen = SeriesGenerator::new(7);
        let out = gen.generate_at(&temperature_only(10, 0.0), fixed_now()).unwrap();
        let records = out.series.records();

        assert_eq!(records[0].timestamp, fixed_now() - TimeDelta::seconds(50));
        assert_eq!(records[9].timestamp, fixed_now() - TimeDelta::seconds(5));
        for pair in records.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, TimeDelta::seconds(5));
        }
        assert_eq!(records[0].timestamp_string(), "2023-11-14T22:12:30.000Z");
    }

    #[test]
    fn test_fractional_interval() {
        let config = GeneratorConfig {
            interval_secs: 0.125,
            ..temperature_only(4, 0.0)
        };
        let out = SeriesGenerator::new(1).generate_at(&config, fixed_now()).unwrap();
        let stamps: Vec<String> = out.series.records().iter().map(|r| r.timestamp_string()).collect();
        assert_eq!(
            stamps,
            vec![
                "2023-11-14T22:13:19.500Z",
                "2023-11-14T22:13:19.625Z",
                "2023-11-14T22:13:19.750Z",
                "2023-11-14T22:13:19.875Z",
            ]
        );
    }

    #[test]
    fn test_values_are_rounded_and_finite() {
        let config = GeneratorConfig {
            point_count: 500,
            ..Default::default()
        };
        let out = SeriesGenerator::new(3).generate_at(&config, fixed_now()).unwrap();
        for record in out.series.records() {
            assert_eq!(record.values.len(), 5);
            for &v in &record.values {
                assert!(v.is_finite());
                assert_eq!(round_value(v), v);
            }
        }
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let config = GeneratorConfig {
            point_count: 200,
            anomaly_probability: 0.1,
            ..Default::default()
        };
        let a = SeriesGenerator::new(99).generate_at(&config, fixed_now()).unwrap();
        let b = SeriesGenerator::new(99).generate_at(&config, fixed_now()).unwrap();
        let c = SeriesGenerator::new(100).generate_at(&config, fixed_now()).unwrap();

        assert_eq!(a.series, b.series);
        assert_eq!(a.stats, b.stats);
        assert_ne!(a.series, c.series);
    }

    #[test]
    fn test_zero_probability_never_injects() {
        let out = SeriesGenerator::new(11)
            .generate_at(&temperature_only(10, 0.0), fixed_now())
            .unwrap();
        assert_eq!(out.stats.total_injected(), 0);
        assert_eq!(out.stats.total_rejected(), 0);
        for v in out.series.column("Temperature").unwrap() {
            assert!((130.0..=170.0).contains(&v), "value {v} outside mean ± 4σ");
        }
    }

    #[test]
    fn test_full_probability_injects_every_sample() {
        let out = SeriesGenerator::new(12)
            .generate_at(&temperature_only(1000, 1.0), fixed_now())
            .unwrap();
        let stats = out.stats.get("Temperature").unwrap();

        // (165, 175) lies outside [135, 165] apart from the single point 165.0
        assert_eq!(stats.anomalies_injected + stats.anomalies_rejected, 1000);
        assert_eq!(stats.anomalies_rejected, 0);
        for v in out.series.column("Temperature").unwrap() {
            assert!((165.0..=175.0).contains(&v));
        }
    }

    #[test]
    fn test_overlapping_range_falls_back_to_normal_draw() {
        // Candidates in (-1, 3] are inside the band and get replaced; (3, 4) is kept
        let config = GeneratorConfig {
            point_count: 5000,
            interval_secs: 1.0,
            anomaly_probability: 1.0,
            parameters: vec![ParameterDefinition::new("Wide", 0.0, 1.0, AnomalyRange::new(-1.0, 4.0))],
            ..Default::default()
        };
        let out = SeriesGenerator::new(5).generate_at(&config, fixed_now()).unwrap();
        let stats = out.stats.get("Wide").unwrap();

        assert_eq!(stats.anomalies_injected + stats.anomalies_rejected, 5000);
        let kept_share = stats.anomaly_rate();
        assert!((0.17..0.23).contains(&kept_share), "kept share {kept_share}");
    }

    #[test]
    fn test_empirical_anomaly_rate_tracks_probability() {
        let config = GeneratorConfig {
            point_count: 20_000,
            anomaly_probability: 0.02,
            ..Default::default()
        };
        let out = SeriesGenerator::new(2024).generate_at(&config, fixed_now()).unwrap();

        for (param, stats) in config.parameters.iter().zip(&out.stats.parameters) {
            // Share of the anomaly range that survives the normal-band check
            let (lower, upper) = param.normal_band();
            let range = param.anomaly_range;
            let overlap = (range.high.min(upper) - range.low.max(lower)).max(0.0);
            let kept = 1.0 - overlap / (range.high - range.low);

            let drawn = (stats.anomalies_injected + stats.anomalies_rejected) as f64 / stats.samples as f64;
            assert!((drawn - 0.02).abs() < 0.005, "{}: candidate rate {drawn}", stats.name);

            let rate = stats.anomaly_rate();
            let expected = 0.02 * kept;
            assert!((rate - expected).abs() < 0.005, "{}: rate {rate}, expected {expected}", stats.name);
        }

        // Flow_Rate's range (125, 135) straddles its band edge at 130
        let flow = out.stats.get("Flow_Rate").unwrap();
        assert!(flow.anomalies_rejected > 0);
    }

    #[test]
    fn test_parameters_decide_independently() {
        let config = GeneratorConfig {
            point_count: 5000,
            anomaly_probability: 0.5,
            ..Default::default()
        };
        let out = SeriesGenerator::new(8).generate_at(&config, fixed_now()).unwrap();
        let params = &config.parameters;

        let flags: Vec<Vec<bool>> = out
            .series
            .records()
            .iter()
            .map(|r| {
                params
                    .iter()
                    .zip(&r.values)
                    .map(|(p, &v)| p.anomaly_range.contains(v))
                    .collect()
            })
            .collect();

        let anomalous_counts: Vec<usize> = flags.iter().map(|f| f.iter().filter(|&&x| x).count()).collect();
        assert!(anomalous_counts.contains(&0));
        assert!(anomalous_counts.iter().any(|&c| c > 1));
        assert!(anomalous_counts.iter().any(|&c| c < params.len()));
    }

    #[test]
    fn test_invalid_config_fails_before_sampling() {
        let mut gen = SeriesGenerator::new(1);
        let config = GeneratorConfig {
            point_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            gen.generate_at(&config, fixed_now()),
            Err(CoreError::InvalidPointCount(0))
        ));

        let mut config = temperature_only(10, 1.0);
        config.parameters[0].anomaly_range = AnomalyRange::new(-1e308, 1e308);
        assert!(matches!(
            gen.generate_at(&config, fixed_now()),
            Err(CoreError::InvalidAnomalyRange { .. })
        ));

        let mut config = temperature_only(1, 0.0);
        config.interval_secs = 1e12;
        assert!(matches!(
            gen.generate_at(&config, fixed_now()),
            Err(CoreError::InvalidInterval(_))
        ));
    }
}
