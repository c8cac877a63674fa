//! The seven skin-lesion categories the classifier can output.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of classes the lesion classifier distinguishes.
pub const NUM_CLASSES: usize = 7;

/// A diagnostic category, identified by the classifier's output index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticClass {
    /// Actinic keratoses (solar keratoses) and Bowen's disease
    ActinicKeratoses,
    /// Basal cell carcinoma
    BasalCellCarcinoma,
    /// Benign keratosis-like lesions
    BenignKeratosis,
    /// Dermatofibroma
    Dermatofibroma,
    /// Melanoma
    Melanoma,
    /// Melanocytic nevi
    MelanocyticNevi,
    /// Vascular lesions
    VascularLesion,
}

impl DiagnosticClass {
    /// All classes in identifier order.
    pub const ALL: [DiagnosticClass; NUM_CLASSES] = [
        DiagnosticClass::ActinicKeratoses,
        DiagnosticClass::BasalCellCarcinoma,
        DiagnosticClass::BenignKeratosis,
        DiagnosticClass::Dermatofibroma,
        DiagnosticClass::Melanoma,
        DiagnosticClass::MelanocyticNevi,
        DiagnosticClass::VascularLesion,
    ];

    /// Looks up a class by its output index.
    pub fn from_id(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    /// The classifier output index of this class (0–6).
    pub fn id(self) -> usize {
        self as usize
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            DiagnosticClass::ActinicKeratoses => {
                "Actinic Keratoses (Solar Keratoses) / Bowen's disease"
            }
            DiagnosticClass::BasalCellCarcinoma => "Basal Cell Carcinoma",
            DiagnosticClass::BenignKeratosis => "Benign Keratosis",
            DiagnosticClass::Dermatofibroma => "Dermatofibroma",
            DiagnosticClass::Melanoma => "Melanoma",
            DiagnosticClass::MelanocyticNevi => "Melanocytic Nevi",
            DiagnosticClass::VascularLesion => "Vascular skin lesion",
        }
    }
}

impl fmt::Display for DiagnosticClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
