//! Editable feature vector for predict requests.
//!
//! Entries are kept as the operator typed them. Parsing happens on
//! submission and never rejects input: unparsable entries become `NaN` and
//! the serving engine decides what to do with them.

const IRIS_FEATURE_LABELS: [&str; 4] = [
    "Sepal Length (cm)",
    "Sepal Width (cm)",
    "Petal Length (cm)",
    "Petal Width (cm)",
];

const NEW_ENTRY: &str = "0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrisSample {
    Setosa,
    Versicolor,
    Virginica,
}

impl IrisSample {
    pub fn values(self) -> [&'static str; 4] {
        match self {
            IrisSample::Setosa => ["5.1", "3.5", "1.4", "0.2"],
            IrisSample::Versicolor => ["6.0", "2.9", "4.5", "1.5"],
            IrisSample::Virginica => ["6.7", "3.1", "5.6", "2.4"],
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "setosa" => Some(IrisSample::Setosa),
            "versicolor" => Some(IrisSample::Versicolor),
            "virginica" => Some(IrisSample::Virginica),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureEditor {
    entries: Vec<String>,
}

impl Default for FeatureEditor {
    fn default() -> Self {
        let mut editor = Self {
            entries: Vec::new(),
        };
        editor.load_sample(IrisSample::Setosa);
        editor
    }
}

impl FeatureEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self) {
        self.entries.push(NEW_ENTRY.to_string());
    }

    /// Removes the entry at `index`. The last remaining entry cannot be removed.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        if self.entries.len() <= 1 || index >= self.entries.len() {
            return None;
        }
        Some(self.entries.remove(index))
    }

    pub fn set(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                *entry = value.into();
                true
            }
            None => false,
        }
    }

    pub fn load_sample(&mut self, sample: IrisSample) {
        self.entries = sample.values().iter().map(|v| v.to_string()).collect();
    }

    pub fn label(index: usize) -> String {
        IRIS_FEATURE_LABELS
            .get(index)
            .map(|label| label.to_string())
            .unwrap_or_else(|| format!("Feature {}", index + 1))
    }

    pub fn to_vector(&self) -> Vec<f64> {
        self.entries
            .iter()
            .map(|entry| entry.trim().parse::<f64>().unwrap_or(f64::NAN))
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/features_tests.rs"]
mod tests;
