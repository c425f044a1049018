use serde::{Deserialize, Serialize};

use crate::domain::ModelId;

/// Body of `POST /models` on the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterModelRequest {
    pub name: String,
    pub version: String,
}

/// Body of a successful `POST /models/{id}/upload` on the artifact store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub gcs_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Body of `GET /models` on the serving engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedModelsResponse {
    pub models: Vec<LoadedModelSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedModelSummary {
    pub id: ModelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

/// Body of `POST /serve/predict`. Non-finite values serialize as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub features: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction: f64,
    pub confidence: f64,
}

impl Prediction {
    /// Iris class name for the predicted class index.
    pub fn class_label(&self) -> &'static str {
        if self.prediction == 0.0 {
            "Iris Setosa"
        } else if self.prediction == 1.0 {
            "Iris Versicolor"
        } else if self.prediction == 2.0 {
            "Iris Virginica"
        } else {
            "Unknown"
        }
    }

    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_iris_classes_and_formats_confidence() {
        let setosa = Prediction {
            prediction: 0.0,
            confidence: 0.97,
        };
        assert_eq!(setosa.class_label(), "Iris Setosa");
        assert_eq!(setosa.confidence_percent(), "97.00%");

        let virginica = Prediction {
            prediction: 2.0,
            confidence: 0.8,
        };
        assert_eq!(virginica.class_label(), "Iris Virginica");
        assert_eq!(virginica.confidence_percent(), "80.00%");

        let odd = Prediction {
            prediction: 1.5,
            confidence: 0.5,
        };
        assert_eq!(odd.class_label(), "Unknown");
    }

    #[test]
    fn serializes_nan_features_as_null() {
        let body = serde_json::to_string(&PredictRequest {
            features: vec![5.1, f64::NAN],
        })
        .expect("encode");
        assert_eq!(body, r#"{"features":[5.1,null]}"#);
    }

    #[test]
    fn integer_prediction_decodes_as_class_index() {
        let prediction: Prediction =
            serde_json::from_str(r#"{"prediction":0,"confidence":0.97}"#).expect("decode");
        assert_eq!(prediction.class_label(), "Iris Setosa");
    }
}
