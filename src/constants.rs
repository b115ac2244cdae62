//! Application constants and configuration defaults

use std::ops::RangeInclusive;

pub const APP_NAME: &str = "Lottery ML Analyzer";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Used when neither settings nor `LOTTERY_API_URL` provide a base URL
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "LOTTERY_API_URL";

/// Lottery the backend falls back to for `/explain`
pub const DEFAULT_LOTTERY: &str = "MAHAJANA_SAMPATHA";

/// Numbers the client lets users pick. The backend accepts 0-80.
pub const NUMBER_RANGE: RangeInclusive<u32> = 1..=80;
pub const MAX_SELECTION: usize = 20;
pub const QUICK_PICK_SIZES: [usize; 3] = [5, 10, 20];
pub const TOP_PICKS: usize = 5;

/// Static report images, served by convention path
pub const RESULT_IMAGES: &[(&str, &str)] = &[
    ("Baseline Model Comparison", "/outputs/results/baseline_comparison.png"),
    ("CatBoost Performance", "/outputs/results/catboost_comparison.png"),
    ("Training History", "/outputs/results/catboost_training_history.png"),
    ("Hyperparameter Heatmaps", "/outputs/results/hyperparameter_heatmaps.png"),
    ("Top 10 Configurations", "/outputs/results/top_10_configs.png"),
];

pub const SHAP_IMAGES: &[(&str, &str)] = &[
    ("SHAP Summary", "/outputs/explainability/shap/shap_summary.png"),
    (
        "Global Feature Importance",
        "/outputs/explainability/shap/shap_feature_importance.png",
    ),
];

/// Project files browsable through the file viewer, as (label, path)
pub const PROJECT_FILES: &[(&str, &str)] = &[
    ("Data exploration", "notebooks/01_data_exploration.ipynb"),
    ("Feature engineering", "notebooks/02_feature_engineering.ipynb"),
    ("Model training", "notebooks/03_model_training.ipynb"),
    ("Explainability", "notebooks/04_explainability.ipynb"),
    ("Prediction API", "backend/main.py"),
    ("Feature engineer", "src/preprocessing/feature_engineer.py"),
    ("Data splitter", "src/preprocessing/data_splitter.py"),
];
