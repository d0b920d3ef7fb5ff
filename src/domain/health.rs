// Health scoring - composite water health score from pH, turbidity and temperature
use serde::{Deserialize, Serialize};

/// The two scoring formulas disagree numerically, so each is kept whole:
/// weighted deviation (pH 40%, turbidity 35%, temperature 25%; Healthy /
/// Watch / Critical) and penalty subtraction (100 minus capped penalties;
/// Good / Moderate / Poor). A missing input yields an unknown score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    #[default]
    WeightedDeviation,
    PenaltySubtraction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthLabel {
    Healthy,
    Watch,
    Critical,
    Good,
    Moderate,
    Poor,
    Unknown,
}

impl HealthLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthLabel::Healthy => "Healthy",
            HealthLabel::Watch => "Watch",
            HealthLabel::Critical => "Critical",
            HealthLabel::Good => "Good",
            HealthLabel::Moderate => "Moderate",
            HealthLabel::Poor => "Poor",
            HealthLabel::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthScore {
    pub score: Option<u8>,
    pub label: HealthLabel,
}

impl HealthScore {
    pub const UNKNOWN: HealthScore = HealthScore {
        score: None,
        label: HealthLabel::Unknown,
    };

    /// Doughnut segments: filled and remaining
    pub fn gauge(&self) -> [f64; 2] {
        match self.score {
            Some(score) => [f64::from(score), f64::from(100 - score)],
            None => [0.0, 100.0],
        }
    }
}

impl ScoringStrategy {
    pub fn score(self, ph: Option<f64>, turbidity: Option<f64>, temperature: Option<f64>) -> HealthScore {
        let (Some(ph), Some(turbidity), Some(temperature)) =
            (valid(ph), valid(turbidity), valid(temperature))
        else {
            return HealthScore::UNKNOWN;
        };

        match self {
            ScoringStrategy::WeightedDeviation => weighted_deviation(ph, turbidity, temperature),
            ScoringStrategy::PenaltySubtraction => penalty_subtraction(ph, turbidity, temperature),
        }
    }
}

fn valid(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

fn to_score(value: f64) -> u8 {
    clamp_score(value).round() as u8
}

fn weighted_deviation(ph: f64, turbidity: f64, temperature: f64) -> HealthScore {
    let ph_score = clamp_score(100.0 - (ph - 7.0).abs() * 20.0);
    let turb_score = clamp_score(100.0 - turbidity * 1.2);
    let temp_score = clamp_score(100.0 - (temperature - 22.5).abs() * 3.0);

    let score = to_score(0.4 * ph_score + 0.35 * turb_score + 0.25 * temp_score);
    let label = match score {
        80.. => HealthLabel::Healthy,
        50.. => HealthLabel::Watch,
        _ => HealthLabel::Critical,
    };
    HealthScore {
        score: Some(score),
        label,
    }
}

fn penalty_subtraction(ph: f64, turbidity: f64, temperature: f64) -> HealthScore {
    let mut score = 100.0;
    score -= ((ph - 7.0).abs() * 8.0).min(30.0);
    score -= ((turbidity / 100.0) * 40.0).min(40.0);
    score -= if temperature < 10.0 {
        10.0
    } else if temperature > 35.0 {
        20.0
    } else if temperature < 15.0 || temperature > 30.0 {
        5.0
    } else {
        0.0
    };

    let score = to_score(score);
    let label = match score {
        70.. => HealthLabel::Good,
        40.. => HealthLabel::Moderate,
        _ => HealthLabel::Poor,
    };
    HealthScore {
        score: Some(score),
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ScoringStrategy::{PenaltySubtraction, WeightedDeviation};

    #[test]
    fn test_missing_input_is_unknown_for_both_formulas() {
        for strategy in [WeightedDeviation, PenaltySubtraction] {
            assert_eq!(strategy.score(None, Some(5.0), Some(20.0)), HealthScore::UNKNOWN);
            assert_eq!(strategy.score(Some(7.0), None, Some(20.0)), HealthScore::UNKNOWN);
            assert_eq!(strategy.score(Some(7.0), Some(5.0), Some(f64::NAN)), HealthScore::UNKNOWN);
        }
    }

    #[test]
    fn test_ideal_water_scores_full() {
        assert_eq!(
            WeightedDeviation.score(Some(7.0), Some(0.0), Some(22.5)),
            HealthScore { score: Some(100), label: HealthLabel::Healthy }
        );
        assert_eq!(
            PenaltySubtraction.score(Some(7.0), Some(0.0), Some(22.5)),
            HealthScore { score: Some(100), label: HealthLabel::Good }
        );
    }

    #[test]
    fn test_weighted_deviation_mixed_reading() {
        // ph 8 -> 80, turbidity 25 -> 70, temp 30 -> 77.5
        // 32 + 24.5 + 19.375 = 75.875
        let result = WeightedDeviation.score(Some(8.0), Some(25.0), Some(30.0));
        assert_eq!(result.score, Some(76));
        assert_eq!(result.label, HealthLabel::Watch);
    }

    #[test]
    fn test_weighted_deviation_clamps_sub_scores() {
        // every sub-score bottoms out at 0
        let result = WeightedDeviation.score(Some(0.0), Some(500.0), Some(90.0));
        assert_eq!(result, HealthScore { score: Some(0), label: HealthLabel::Critical });
    }

    #[test]
    fn test_weighted_deviation_label_thresholds() {
        // ph 9.5 -> 50, turbidity 0 -> 100, temp 22.5 -> 100: 20 + 35 + 25 = 80
        let at_80 = WeightedDeviation.score(Some(9.5), Some(0.0), Some(22.5));
        assert_eq!(at_80.score, Some(80));
        assert_eq!(at_80.label, HealthLabel::Healthy);

        // ph 9.6 -> 48: 19.2 + 35 + 25 = 79.2
        let below_80 = WeightedDeviation.score(Some(9.6), Some(0.0), Some(22.5));
        assert_eq!(below_80.score, Some(79));
        assert_eq!(below_80.label, HealthLabel::Watch);

        // ph 4.5 -> 50, turbidity 100 -> 0, temp 22.5 -> 100: 20 + 0 + 25 = 45
        let low = WeightedDeviation.score(Some(4.5), Some(100.0), Some(22.5));
        assert_eq!(low.score, Some(45));
        assert_eq!(low.label, HealthLabel::Critical);

        // ph 7 -> 100, turbidity 100 -> 0, temp 22.5 -> 100: 40 + 0 + 25 = 65
        let mid = WeightedDeviation.score(Some(7.0), Some(100.0), Some(22.5));
        assert_eq!(mid.score, Some(65));
        assert_eq!(mid.label, HealthLabel::Watch);
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        // turbidity 1.25 -> 98.5 * 0.35 = 34.475; with ph 7 and temp 22.5: 99.475 -> 99
        let result = WeightedDeviation.score(Some(7.0), Some(1.25), Some(22.5));
        assert_eq!(result.score, Some(99));

        // penalty: ph 7.0625 -> 0.5 penalty: 99.5 -> 100
        let result = PenaltySubtraction.score(Some(7.0625), Some(0.0), Some(22.5));
        assert_eq!(result.score, Some(100));
    }

    #[test]
    fn test_penalty_subtraction_caps_each_penalty() {
        // ph penalty capped at 30, turbidity at 40, temp > 35 costs 20
        let result = PenaltySubtraction.score(Some(1.0), Some(1000.0), Some(40.0));
        assert_eq!(result, HealthScore { score: Some(10), label: HealthLabel::Poor });
    }

    #[test]
    fn test_penalty_subtraction_temperature_bands() {
        let temp = |t| PenaltySubtraction.score(Some(7.0), Some(0.0), Some(t)).score;
        assert_eq!(temp(9.9), Some(90));
        assert_eq!(temp(10.0), Some(95));
        assert_eq!(temp(14.9), Some(95));
        assert_eq!(temp(15.0), Some(100));
        assert_eq!(temp(30.0), Some(100));
        assert_eq!(temp(30.1), Some(95));
        assert_eq!(temp(35.0), Some(95));
        assert_eq!(temp(35.1), Some(80));
    }

    #[test]
    fn test_penalty_subtraction_labels() {
        // ph 8 -> 8, turbidity 50 -> 20: 72
        let good = PenaltySubtraction.score(Some(8.0), Some(50.0), Some(20.0));
        assert_eq!(good, HealthScore { score: Some(72), label: HealthLabel::Good });

        // ph 10 -> 24, turbidity 100 -> 40: 36
        let poor = PenaltySubtraction.score(Some(10.0), Some(100.0), Some(20.0));
        assert_eq!(poor, HealthScore { score: Some(36), label: HealthLabel::Poor });

        // ph 9 -> 16, turbidity 100 -> 40: 44
        let moderate = PenaltySubtraction.score(Some(9.0), Some(100.0), Some(20.0));
        assert_eq!(moderate, HealthScore { score: Some(44), label: HealthLabel::Moderate });
    }

    #[test]
    fn test_negative_turbidity_is_clamped() {
        let result = PenaltySubtraction.score(Some(7.0), Some(-50.0), Some(22.5));
        assert_eq!(result.score, Some(100));
    }

    #[test]
    fn test_gauge_segments() {
        let score = HealthScore { score: Some(72), label: HealthLabel::Good };
        assert_eq!(score.gauge(), [72.0, 28.0]);
        assert_eq!(HealthScore::UNKNOWN.gauge(), [0.0, 100.0]);
    }
}
