//! Clinical advisory records attached to each diagnostic class.
//!
//! The catalog is a static table indexed by class identifier, so every class
//! has exactly one record and lookups cannot fail.

use super::diagnosis::{DiagnosticClass, NUM_CLASSES};
use serde::Serialize;

/// Severity, precautions, diet guidance and consultation urgency for a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvisoryRecord {
    /// Free-text severity tier
    pub severity: &'static str,
    /// General precautions, in display order
    pub precautions: &'static [&'static str],
    /// Dietary precautions, in display order
    pub food_precautions: &'static [&'static str],
    /// How urgently a specialist should be seen
    pub consultation: &'static str,
}

static CATALOG: [AdvisoryRecord; NUM_CLASSES] = [
    // Actinic keratoses / Bowen's disease
    AdvisoryRecord {
        severity: "Moderate to High",
        precautions: &[
            "Use sunscreen SPF 30+ daily.",
            "Avoid direct sunlight.",
            "Regularly monitor for changes.",
        ],
        food_precautions: &[
            "Eat fresh fruits and vegetables.",
            "Drink enough water.",
            "Avoid junk and oily food.",
            "Reduce sugar intake.",
            "Avoid alcohol and smoking.",
        ],
        consultation: "Dermatologist consultation strongly recommended.",
    },
    // Basal cell carcinoma
    AdvisoryRecord {
        severity: "High",
        precautions: &[
            "Avoid UV exposure.",
            "Do not scratch the lesion.",
            "Track lesion growth with photos.",
        ],
        food_precautions: &[
            "Eat healthy home-cooked food.",
            "Include fruits and vegetables daily.",
            "Drink enough water.",
            "Avoid alcohol completely.",
            "Avoid processed and junk food.",
        ],
        consultation: "Immediate dermatologist visit recommended.",
    },
    // Benign keratosis
    AdvisoryRecord {
        severity: "Low to Moderate",
        precautions: &[
            "Avoid skin irritation.",
            "Moisturize dry skin.",
            "Monitor for color or size changes.",
        ],
        food_precautions: &[
            "Maintain a balanced diet.",
            "Drink enough water.",
            "Reduce oily and spicy food.",
            "Avoid excess sugar.",
            "Prefer home food.",
        ],
        consultation: "Routine dermatology checkup advised.",
    },
    // Dermatofibroma
    AdvisoryRecord {
        severity: "Low",
        precautions: &[
            "Avoid trauma to the lesion.",
            "Keep skin clean.",
            "Watch for sudden size or texture changes.",
        ],
        food_precautions: &[
            "Eat nutritious food.",
            "Include proteins like pulses or eggs.",
            "Drink enough water.",
            "Avoid junk food.",
            "Avoid excessive caffeine.",
        ],
        consultation: "Non-urgent dermatology visit recommended.",
    },
    // Melanoma
    AdvisoryRecord {
        severity: "Very High (dangerous)",
        precautions: &[
            "Avoid sun completely.",
            "Do not delay medical checkup.",
            "Monitor ABCDE(Asymmetry, Border irregularity, Color variation, Diameter(>6 mm), Evolving) signs.",
        ],
        food_precautions: &[
            "Eat antioxidant-rich fruits and vegetables.",
            "Drink plenty of water.",
            "Avoid alcohol and smoking.",
            "Avoid processed food.",
            "Maintain a healthy diet to support treatment.",
        ],
        consultation: "Urgent dermatologist or oncologist appointment needed.",
    },
    // Melanocytic nevi
    AdvisoryRecord {
        severity: "Low (but monitor)",
        precautions: &[
            "Monitor mole changes.",
            "Use sunscreen daily.",
            "Avoid self-removal.",
        ],
        food_precautions: &[
            "Eat fresh fruits and vegetables.",
            "Drink enough water.",
            "Avoid junk food.",
            "Reduce sugar intake.",
            "Maintain a healthy lifestyle.",
        ],
        consultation: "Consult dermatologist if changes appear.",
    },
    // Vascular lesion
    AdvisoryRecord {
        severity: "Low to Moderate",
        precautions: &[
            "Avoid scratching.",
            "Keep the area clean.",
            "Watch for sudden swelling or bleeding.",
        ],
        food_precautions: &[
            "Drink enough water.",
            "Eat balanced meals.",
            "Reduce salty food.",
            "Avoid alcohol.",
            "Avoid junk food.",
        ],
        consultation: "Dermatology consultation recommended.",
    },
];

/// Returns the advisory record for a class.
pub fn advisory_for(class: DiagnosticClass) -> &'static AdvisoryRecord {
    &CATALOG[class.id()]
}

/// Returns the advisory record for a raw class identifier, if it is valid.
pub fn advisory_for_id(id: usize) -> Option<&'static AdvisoryRecord> {
    CATALOG.get(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_complete() {
        for class in DiagnosticClass::ALL {
            let record = advisory_for(class);
            assert!(!record.severity.is_empty(), "{class}");
            assert!(!record.precautions.is_empty(), "{class}");
            assert!(!record.food_precautions.is_empty(), "{class}");
            assert!(!record.consultation.is_empty(), "{class}");
        }
    }

    #[test]
    fn test_melanoma_record() {
        let record = advisory_for(DiagnosticClass::Melanoma);
        assert_eq!(record.severity, "Very High (dangerous)");
        assert!(record.consultation.contains("Urgent"));
        assert_eq!(record.precautions.len(), 3);
        assert_eq!(
            record.precautions[2],
            "Monitor ABCDE(Asymmetry, Border irregularity, Color variation, Diameter(>6 mm), Evolving) signs."
        );
        assert_eq!(record.food_precautions.len(), 5);
    }

    #[test]
    fn test_lookup_by_id() {
        assert_eq!(
            advisory_for_id(1),
            Some(advisory_for(DiagnosticClass::BasalCellCarcinoma))
        );
        assert_eq!(advisory_for_id(7), None);
    }
}
