//! crates/krushi_core/src/labels.rs
//!
//! Class tables of the two pre-trained models and top-1 selection.

use crate::domain::Classification;
use crate::ports::{PortError, PortResult};

/// PlantVillage classes in the (sorted) order of the classifier's output layer.
pub const PLANT_DISEASE_CLASSES: [&str; 38] = [
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

/// Crop labels of the tabular recommendation model, indexed by class id.
pub const CROP_CLASSES: [&str; 22] = [
    "apple",
    "banana",
    "blackgram",
    "chickpea",
    "coconut",
    "coffee",
    "cotton",
    "grapes",
    "jute",
    "kidneybeans",
    "lentil",
    "maize",
    "mango",
    "mothbeans",
    "mungbean",
    "muskmelon",
    "orange",
    "papaya",
    "pigeonpeas",
    "pomegranate",
    "rice",
    "watermelon",
];

/// Picks the highest-probability class. The probability vector must line up
/// with `PLANT_DISEASE_CLASSES`.
pub fn top_disease(probabilities: &[f32]) -> PortResult<Classification> {
    if probabilities.len() != PLANT_DISEASE_CLASSES.len() {
        return Err(PortError::Upstream(format!(
            "classifier returned {} scores, expected {}",
            probabilities.len(),
            PLANT_DISEASE_CLASSES.len()
        )));
    }

    let (index, probability) = probabilities
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, p)| p.is_finite())
        // First index wins a tie.
        .min_by(|(_, a), (_, b)| b.total_cmp(a))
        .ok_or_else(|| PortError::Upstream("classifier returned no finite scores".to_string()))?;

    Ok(Classification {
        label: PLANT_DISEASE_CLASSES[index].to_string(),
        confidence: (probability * 100.0).clamp(0.0, 100.0),
    })
}

/// Looks up a crop label by class id.
pub fn crop_label(index: usize) -> PortResult<&'static str> {
    CROP_CLASSES
        .get(index)
        .copied()
        .ok_or_else(|| PortError::Upstream(format!("unknown crop class id {index}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disease_table_is_sorted() {
        let mut sorted = PLANT_DISEASE_CLASSES;
        sorted.sort_unstable();
        assert_eq!(sorted, PLANT_DISEASE_CLASSES);
    }

    #[test]
    fn top_disease_picks_argmax_as_percentage() {
        let mut scores = vec![0.001_f32; 38];
        scores[30] = 0.93;
        let result = top_disease(&scores).unwrap();
        assert_eq!(result.label, "Tomato___Late_blight");
        assert!((result.confidence - 93.0).abs() < 1e-3);
    }

    #[test]
    fn ties_go_to_the_lowest_index() {
        let mut scores = vec![0.01_f32; 38];
        scores[2] = 0.45;
        scores[30] = 0.45;
        assert_eq!(top_disease(&scores).unwrap().label, "Apple___Cedar_apple_rust");
    }

    #[test]
    fn confidence_stays_within_bounds() {
        let mut scores = vec![0.0_f32; 38];
        scores[0] = 1.2;
        let result = top_disease(&scores).unwrap();
        assert_eq!(result.confidence, 100.0);
        assert!(PLANT_DISEASE_CLASSES.contains(&result.label.as_str()));
    }

    #[test]
    fn wrong_vector_length_is_upstream_error() {
        assert!(matches!(top_disease(&[0.5, 0.5]), Err(PortError::Upstream(_))));
    }

    #[test]
    fn crop_label_rejects_unknown_ids() {
        assert_eq!(crop_label(20).unwrap(), "rice");
        assert!(crop_label(22).is_err());
    }
}
