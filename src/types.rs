//! Wire types shared with the prediction service

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::constants::TOP_PICKS;

/// `GET /health`
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub model_loaded: bool,
    #[serde(alias = "explainability_loaded")]
    pub shap_loaded: bool,
    pub timestamp: String,
}

/// Lottery game metadata from `GET /lotteries`
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct LotteryInfo {
    pub name: String,
    pub display_name: String,
    pub number_range: String,
    pub draws_in_dataset: u64,
    pub numbers_per_draw: u32,
    pub has_letter: bool,
    pub draw_format: String,
}

impl LotteryInfo {
    /// Label used in lottery pickers
    pub fn picker_label(&self) -> String {
        format!(
            "{} - {} ({} draws)",
            self.display_name, self.draw_format, self.draws_in_dataset
        )
    }
}

/// Body of `POST /predict`
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PredictRequest {
    pub lottery: String,
    pub numbers: Vec<u32>,
    pub draw_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct NumberPrediction {
    pub number: u32,
    pub probability: f64,
    pub prediction: String,
    pub confidence: String,
}

impl NumberPrediction {
    pub fn appears(&self) -> bool {
        self.prediction == "Appear"
    }
}

/// Response of `POST /predict`
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct PredictionResponse {
    pub lottery: String,
    pub draw_id: i64,
    pub predictions: Vec<NumberPrediction>,
    pub top_5_numbers: Vec<u32>,
    pub timestamp: String,
}

impl PredictionResponse {
    /// Predictions sorted by descending probability
    pub fn ranked(&self) -> Vec<&NumberPrediction> {
        let mut ranked: Vec<&NumberPrediction> = self.predictions.iter().collect();
        ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        ranked
    }

    /// Top picks resolved against `predictions`; numbers the server listed
    /// without a matching prediction are skipped.
    pub fn top_picks(&self) -> Vec<&NumberPrediction> {
        self.top_5_numbers
            .iter()
            .filter_map(|n| self.predictions.iter().find(|p| p.number == *n))
            .collect()
    }

    /// Checks the top-5 invariant and confidence labels, returning one
    /// message per problem found.
    pub fn violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.top_5_numbers.len() > TOP_PICKS {
            problems.push(format!(
                "top_5_numbers has {} entries",
                self.top_5_numbers.len()
            ));
        }
        let known: HashSet<u32> = self.predictions.iter().map(|p| p.number).collect();
        for n in &self.top_5_numbers {
            if !known.contains(n) {
                problems.push(format!("top pick {n} has no prediction"));
            }
        }
        let picks = self.top_picks();
        if picks
            .windows(2)
            .any(|w| w[0].probability < w[1].probability)
        {
            problems.push("top_5_numbers not sorted by probability".to_string());
        }
        for p in &self.predictions {
            if !(0.0..=1.0).contains(&p.probability) {
                problems.push(format!("number {} has probability {}", p.number, p.probability));
                continue;
            }
            let expected = ConfidenceLevel::from_probability(p.probability);
            if ConfidenceLevel::parse(&p.confidence) != Some(expected) {
                problems.push(format!(
                    "number {} labelled {:?}, expected {:?}",
                    p.number,
                    p.confidence,
                    expected.label()
                ));
            }
        }
        problems
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub contribution: f64,
}

impl FeatureContribution {
    pub fn increases(&self) -> bool {
        self.contribution > 0.0
    }
}

/// Response of `GET /explain/{number}`
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ExplanationResponse {
    pub number: u32,
    pub prediction: String,
    pub probability: f64,
    #[serde(default)]
    pub feature_contributions: HashMap<String, f64>,
    pub top_5_features: Vec<FeatureContribution>,
}

impl ExplanationResponse {
    /// Every contribution sorted by descending magnitude, ties by name
    pub fn all_by_magnitude(&self) -> Vec<FeatureContribution> {
        let sorted: BTreeMap<&String, f64> = self
            .feature_contributions
            .iter()
            .map(|(k, v)| (k, *v))
            .collect();
        let mut all: Vec<FeatureContribution> = sorted
            .into_iter()
            .map(|(feature, contribution)| FeatureContribution {
                feature: feature.clone(),
                contribution,
            })
            .collect();
        all.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
        all
    }

    pub fn violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.top_5_features.len() > TOP_PICKS {
            problems.push(format!(
                "top_5_features has {} entries",
                self.top_5_features.len()
            ));
        }
        if self
            .top_5_features
            .windows(2)
            .any(|w| w[0].contribution.abs() < w[1].contribution.abs())
        {
            problems.push("top_5_features not sorted by magnitude".to_string());
        }
        problems
    }
}

/// `GET /statistics`
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ModelStats {
    pub model_type: String,
    pub f1_score: f64,
    pub precision: f64,
    pub recall: f64,
    pub training_samples: u64,
    pub features_count: u32,
    #[serde(default)]
    pub top_5_features: Vec<String>,
}

/// `GET /` service banner
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ApiInfo {
    pub message: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub warning: String,
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}

/// Seven ordinal confidence levels, by distance of the probability from 0.5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    VeryHighLikely,
    HighLikely,
    MediumLikely,
    Low,
    MediumUnlikely,
    HighUnlikely,
    VeryHighUnlikely,
}

/// Visual confidence categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBucket {
    High,
    Medium,
    Low,
    Neutral,
}

impl ConfidenceLevel {
    pub const ALL: [ConfidenceLevel; 7] = [
        ConfidenceLevel::VeryHighLikely,
        ConfidenceLevel::HighLikely,
        ConfidenceLevel::MediumLikely,
        ConfidenceLevel::Low,
        ConfidenceLevel::MediumUnlikely,
        ConfidenceLevel::HighUnlikely,
        ConfidenceLevel::VeryHighUnlikely,
    ];

    /// Same thresholds the prediction service applies
    pub fn from_probability(p: f64) -> Self {
        if p >= 0.75 {
            Self::VeryHighLikely
        } else if p >= 0.70 {
            Self::HighLikely
        } else if p >= 0.60 {
            Self::MediumLikely
        } else if p >= 0.40 {
            Self::Low
        } else if p >= 0.30 {
            Self::MediumUnlikely
        } else if p >= 0.25 {
            Self::HighUnlikely
        } else {
            Self::VeryHighUnlikely
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::VeryHighLikely => "Very High (Likely)",
            Self::HighLikely => "High (Likely)",
            Self::MediumLikely => "Medium (Likely)",
            Self::Low => "Low",
            Self::MediumUnlikely => "Medium (Unlikely)",
            Self::HighUnlikely => "High (Unlikely)",
            Self::VeryHighUnlikely => "Very High (Unlikely)",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.label() == label)
    }

    /// Probability band as shown in tooltips
    pub fn band(self) -> &'static str {
        match self {
            Self::VeryHighLikely => "p ≥ 75%",
            Self::HighLikely => "70% ≤ p < 75%",
            Self::MediumLikely => "60% ≤ p < 70%",
            Self::Low => "40% ≤ p < 60%",
            Self::MediumUnlikely => "30% ≤ p < 40%",
            Self::HighUnlikely => "25% ≤ p < 30%",
            Self::VeryHighUnlikely => "p < 25%",
        }
    }

    /// Four-color category the seven levels most plausibly collapse to.
    /// Not used for rendering: badges follow `confidence_bucket`.
    pub fn intended_bucket(self) -> ConfidenceBucket {
        match self {
            Self::VeryHighLikely | Self::HighLikely => ConfidenceBucket::High,
            Self::MediumLikely => ConfidenceBucket::Medium,
            Self::Low => ConfidenceBucket::Low,
            Self::MediumUnlikely | Self::HighUnlikely | Self::VeryHighUnlikely => {
                ConfidenceBucket::Neutral
            }
        }
    }
}

/// Color category for a confidence label. Only the exact strings "High",
/// "Medium" and "Low" get a color; compound labels such as
/// "Very High (Likely)" fall through to `Neutral`.
// TODO: compound labels render gray; waiting on product input before
// switching badges to ConfidenceLevel::intended_bucket.
pub fn confidence_bucket(label: &str) -> ConfidenceBucket {
    match label {
        "High" => ConfidenceBucket::High,
        "Medium" => ConfidenceBucket::Medium,
        "Low" => ConfidenceBucket::Low,
        _ => ConfidenceBucket::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(number: u32, probability: f64) -> NumberPrediction {
        NumberPrediction {
            number,
            probability,
            prediction: if probability > 0.5 { "Appear" } else { "Not Appear" }.to_string(),
            confidence: ConfidenceLevel::from_probability(probability).label().to_string(),
        }
    }

    fn response(predictions: Vec<NumberPrediction>, top: Vec<u32>) -> PredictionResponse {
        PredictionResponse {
            lottery: "MAHAJANA_SAMPATHA".to_string(),
            draw_id: 1201,
            predictions,
            top_5_numbers: top,
            timestamp: "2026-01-10T12:00:00".to_string(),
        }
    }

    #[test]
    fn ranked_orders_by_descending_probability() {
        let resp = response(
            vec![prediction(23, 0.10), prediction(7, 0.62), prediction(42, 0.05)],
            vec![7, 23, 42],
        );
        let numbers: Vec<u32> = resp.ranked().iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![7, 23, 42]);
    }

    #[test]
    fn top_picks_skip_unknown_numbers() {
        let resp = response(vec![prediction(7, 0.62), prediction(9, 0.3)], vec![7, 55, 9]);
        let picks: Vec<u32> = resp.top_picks().iter().map(|p| p.number).collect();
        assert_eq!(picks, vec![7, 9]);
        assert_eq!(resp.violations(), vec!["top pick 55 has no prediction".to_string()]);
    }

    #[test]
    fn valid_response_has_no_violations() {
        let preds: Vec<NumberPrediction> = (1..=8).map(|n| prediction(n, n as f64 / 10.0)).collect();
        let resp = response(preds, vec![8, 7, 6, 5, 4]);
        assert!(resp.violations().is_empty());
    }

    #[test]
    fn unsorted_or_oversized_top_list_is_flagged() {
        let preds: Vec<NumberPrediction> = (1..=6).map(|n| prediction(n, n as f64 / 10.0)).collect();
        let resp = response(preds, vec![1, 2, 3, 4, 5, 6]);
        let problems = resp.violations();
        assert!(problems.contains(&"top_5_numbers has 6 entries".to_string()));
        assert!(problems.contains(&"top_5_numbers not sorted by probability".to_string()));
    }

    #[test]
    fn mismatched_confidence_label_is_flagged() {
        let mut p = prediction(3, 0.8);
        p.confidence = "Low".to_string();
        let resp = response(vec![p], vec![3]);
        assert_eq!(resp.violations().len(), 1);
    }

    #[test]
    fn confidence_thresholds() {
        assert_eq!(ConfidenceLevel::from_probability(0.75), ConfidenceLevel::VeryHighLikely);
        assert_eq!(ConfidenceLevel::from_probability(0.7), ConfidenceLevel::HighLikely);
        assert_eq!(ConfidenceLevel::from_probability(0.65), ConfidenceLevel::MediumLikely);
        assert_eq!(ConfidenceLevel::from_probability(0.5), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_probability(0.4), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_probability(0.3), ConfidenceLevel::MediumUnlikely);
        assert_eq!(ConfidenceLevel::from_probability(0.25), ConfidenceLevel::HighUnlikely);
        assert_eq!(ConfidenceLevel::from_probability(0.0), ConfidenceLevel::VeryHighUnlikely);
        for level in ConfidenceLevel::ALL {
            assert_eq!(ConfidenceLevel::parse(level.label()), Some(level));
        }
    }

    #[test]
    fn confidence_bucket_matches_exact_labels_only() {
        assert_eq!(confidence_bucket("High"), ConfidenceBucket::High);
        assert_eq!(confidence_bucket("Medium"), ConfidenceBucket::Medium);
        assert_eq!(confidence_bucket("Low"), ConfidenceBucket::Low);
        // Compound labels from the service fall through
        assert_eq!(confidence_bucket("High (Likely)"), ConfidenceBucket::Neutral);
        assert_eq!(confidence_bucket("Very High (Likely)"), ConfidenceBucket::Neutral);
        assert_eq!(confidence_bucket("Medium (Unlikely)"), ConfidenceBucket::Neutral);
        assert_eq!(confidence_bucket("high"), ConfidenceBucket::Neutral);
    }

    #[test]
    fn intended_bucket_differs_from_literal_for_compound_labels() {
        let level = ConfidenceLevel::parse("High (Likely)").unwrap();
        assert_eq!(level.intended_bucket(), ConfidenceBucket::High);
        assert_ne!(level.intended_bucket(), confidence_bucket(level.label()));
        // "Low" is the only label both agree on
        let agree: Vec<ConfidenceLevel> = ConfidenceLevel::ALL
            .into_iter()
            .filter(|l| l.intended_bucket() == confidence_bucket(l.label()))
            .filter(|l| l.intended_bucket() != ConfidenceBucket::Neutral)
            .collect();
        assert_eq!(agree, vec![ConfidenceLevel::Low]);
    }

    #[test]
    fn explanation_sorted_by_magnitude() {
        let json = r#"{
            "number": 7,
            "prediction": "Not Appear",
            "probability": 0.1495,
            "feature_contributions": {"trend": 0.01, "appearance_rate": -0.42, "days_since_last": 0.3},
            "top_5_features": [
                {"feature": "appearance_rate", "contribution": -0.42},
                {"feature": "days_since_last", "contribution": 0.3},
                {"feature": "trend", "contribution": 0.01}
            ]
        }"#;
        let resp: ExplanationResponse = serde_json::from_str(json).unwrap();
        assert!(resp.violations().is_empty());
        let all: Vec<String> = resp.all_by_magnitude().into_iter().map(|f| f.feature).collect();
        assert_eq!(all, vec!["appearance_rate", "days_since_last", "trend"]);
        assert!(!resp.top_5_features[0].increases());
        assert!(resp.top_5_features[1].increases());
    }

    #[test]
    fn explanation_sorted_by_signed_value_is_flagged() {
        let resp = ExplanationResponse {
            number: 7,
            prediction: "Appear".to_string(),
            probability: 0.6,
            feature_contributions: HashMap::new(),
            top_5_features: vec![
                FeatureContribution { feature: "a".into(), contribution: 0.1 },
                FeatureContribution { feature: "b".into(), contribution: -0.5 },
            ],
        };
        assert_eq!(resp.violations().len(), 1);
    }

    #[test]
    fn predict_request_serializes_null_draw_id() {
        let req = PredictRequest {
            lottery: "MAHAJANA_SAMPATHA".to_string(),
            numbers: vec![7, 23, 42],
            draw_id: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"lottery": "MAHAJANA_SAMPATHA", "numbers": [7, 23, 42], "draw_id": null})
        );
    }

    #[test]
    fn lottery_picker_label() {
        let info: LotteryInfo = serde_json::from_str(
            r#"{"name":"dlb_lagna_wasana","display_name":"Lagna Wasana","number_range":"1-80",
                "draws_in_dataset":1520,"numbers_per_draw":4,"has_letter":true,
                "draw_format":"4 numbers + letter"}"#,
        )
        .unwrap();
        assert_eq!(info.picker_label(), "Lagna Wasana - 4 numbers + letter (1520 draws)");
    }
}
