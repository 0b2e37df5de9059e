//! Label and advisory tables
//!
//! Class names are index-aligned with classifier output positions. Both
//! tables are process-wide constants; nothing mutates them after startup.

use std::collections::HashMap;

/// PlantVillage disease categories, in model output order.
pub const DISEASE_CLASSES: [&str; 38] = [
    "Apple___Apple_scab",
    "Apple___Black_rot",
    "Apple___Cedar_apple_rust",
    "Apple___healthy",
    "Blueberry___healthy",
    "Cherry_(including_sour)___Powdery_mildew",
    "Cherry_(including_sour)___healthy",
    "Corn_(maize)___Cercospora_leaf_spot Gray_leaf_spot",
    "Corn_(maize)___Common_rust_",
    "Corn_(maize)___Northern_Leaf_Blight",
    "Corn_(maize)___healthy",
    "Grape___Black_rot",
    "Grape___Esca_(Black_Measles)",
    "Grape___Leaf_blight_(Isariopsis_Leaf_Spot)",
    "Grape___healthy",
    "Orange___Haunglongbing_(Citrus_greening)",
    "Peach___Bacterial_spot",
    "Peach___healthy",
    "Pepper,_bell___Bacterial_spot",
    "Pepper,_bell___healthy",
    "Potato___Early_blight",
    "Potato___Late_blight",
    "Potato___healthy",
    "Raspberry___healthy",
    "Soybean___healthy",
    "Squash___Powdery_mildew",
    "Strawberry___Leaf_scorch",
    "Strawberry___healthy",
    "Tomato___Bacterial_spot",
    "Tomato___Early_blight",
    "Tomato___Late_blight",
    "Tomato___Leaf_Mold",
    "Tomato___Septoria_leaf_spot",
    "Tomato___Spider_mites Two-spotted_spider_mite",
    "Tomato___Target_Spot",
    "Tomato___Tomato_Yellow_Leaf_Curl_Virus",
    "Tomato___Tomato_mosaic_virus",
    "Tomato___healthy",
];

/// Crop recommendation categories, in tabular model class order.
pub const CROP_CLASSES: [&str; 22] = [
    "apple", "banana", "blackgram", "chickpea", "coconut", "coffee",
    "cotton", "grapes", "jute", "kidneybeans", "lentil", "maize",
    "mango", "mothbeans", "mungbean", "muskmelon", "orange", "papaya",
    "pigeonpeas", "pomegranate", "rice", "watermelon",
];

pub const DISEASE_TREATMENT: &str = "Follow recommended treatment for this disease.";
pub const HEALTHY_ADVICE: &str = "No action needed.";
pub const DEFAULT_ADVICE: &str = "Follow good farming practices.";

/// Ordered class names aligned with classifier output indices.
#[derive(Debug, Clone, Copy)]
pub struct LabelTable {
    names: &'static [&'static str],
}

impl LabelTable {
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    pub fn diseases() -> Self {
        Self::new(&DISEASE_CLASSES)
    }

    pub fn crops() -> Self {
        Self::new(&CROP_CLASSES)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Range-checked lookup. Negative indices are never valid.
    pub fn get(&self, index: i64) -> Option<&'static str> {
        usize::try_from(index).ok().and_then(|i| self.names.get(i).copied())
    }
}

/// Label → recommendation text, with a catch-all default.
#[derive(Debug, Clone)]
pub struct AdvisoryTable {
    entries: HashMap<String, String>,
    default: String,
}

impl AdvisoryTable {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            entries: HashMap::new(),
            default: default.into(),
        }
    }

    pub fn with_entry(mut self, label: impl Into<String>, advice: impl Into<String>) -> Self {
        self.entries.insert(label.into(), advice.into());
        self
    }

    /// Generic treatment advice for every disease label, plus the `healthy` key.
    ///
    /// Concrete healthy labels ("Tomato___healthy") are ordinary entries and
    /// get the treatment text; only the bare `healthy` key maps to the
    /// no-action advice.
    pub fn plant_village() -> Self {
        let mut table = Self::new(DEFAULT_ADVICE);
        for label in DISEASE_CLASSES {
            table.entries.insert(label.to_string(), DISEASE_TREATMENT.to_string());
        }
        table.entries.insert("healthy".to_string(), HEALTHY_ADVICE.to_string());
        table
    }

    pub fn recommendation(&self, label: &str) -> &str {
        self.entries.get(label).map(|s| s.as_str()).unwrap_or(&self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_table_bounds() {
        let diseases = LabelTable::diseases();
        assert_eq!(diseases.len(), 38);
        assert_eq!(diseases.get(0), Some("Apple___Apple_scab"));
        assert_eq!(diseases.get(37), Some("Tomato___healthy"));
        assert_eq!(diseases.get(38), None);
        assert_eq!(diseases.get(-1), None);

        let crops = LabelTable::crops();
        assert_eq!(crops.len(), 22);
        assert_eq!(crops.get(20), Some("rice"));
    }

    #[test]
    fn test_advisory_lookup() {
        let table = AdvisoryTable::plant_village();
        assert_eq!(table.recommendation("Potato___Late_blight"), DISEASE_TREATMENT);
        assert_eq!(table.recommendation("Tomato___healthy"), DISEASE_TREATMENT);
        assert_eq!(table.recommendation("healthy"), HEALTHY_ADVICE);
        assert_eq!(table.recommendation("Class index 99"), DEFAULT_ADVICE);
    }
}
