//! Glossary of medical, dataset and machine learning terms

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlossaryEntry {
    pub term: &'static str,
    pub definition: &'static str,
    pub related: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GlossaryCategory {
    pub name: &'static str,
    pub entries: &'static [GlossaryEntry],
}

/// A category with the entries that matched a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMatches {
    pub category: &'static str,
    pub terms: Vec<&'static GlossaryEntry>,
}

const fn entry(
    term: &'static str,
    definition: &'static str,
    related: &'static [&'static str],
) -> GlossaryEntry {
    GlossaryEntry {
        term,
        definition,
        related,
    }
}

static CATEGORIES: &[GlossaryCategory] = &[
    GlossaryCategory {
        name: "Medical Terms",
        entries: &[
            entry(
                "Benign",
                "A non-cancerous growth that does not spread to other parts of the body. Benign tumors are generally not life-threatening and can often be removed.",
                &["Malignant", "Tumor"],
            ),
            entry(
                "Malignant",
                "A cancerous growth that can invade nearby tissues and spread to other parts of the body through the blood and lymph systems. Malignant tumors require prompt treatment.",
                &["Benign", "Metastasis"],
            ),
            entry(
                "Mammogram",
                "An X-ray image of the breast used to detect and diagnose breast diseases, including cancer. Regular mammograms are recommended for breast cancer screening.",
                &["Screening", "Breast Cancer"],
            ),
            entry(
                "Biopsy",
                "A medical procedure that involves taking a small sample of tissue for examination under a microscope to determine if cancer or other abnormal cells are present.",
                &["Diagnosis", "Pathology"],
            ),
            entry(
                "Metastasis",
                "The spread of cancer cells from the primary site to other parts of the body. Cancer cells can travel through the bloodstream or lymphatic system.",
                &["Malignant", "Stage"],
            ),
            entry(
                "Tumor",
                "An abnormal mass of tissue that forms when cells divide more than they should or do not die when they should. Tumors can be benign or malignant.",
                &["Benign", "Malignant"],
            ),
        ],
    },
    GlossaryCategory {
        name: "Dataset Features",
        entries: &[
            entry(
                "Radius",
                "The mean distance from the center to points on the perimeter of the cell nucleus. Larger radius values may indicate abnormal cell growth.",
                &["Perimeter", "Area"],
            ),
            entry(
                "Texture",
                "The standard deviation of gray-scale values in the cell image. Indicates the variation in cell surface texture.",
                &["Smoothness"],
            ),
            entry(
                "Perimeter",
                "The total length of the cell nucleus boundary. Related to the size and shape of the cell.",
                &["Radius", "Area"],
            ),
            entry(
                "Area",
                "The total area enclosed by the cell nucleus perimeter. Abnormally large areas may suggest cancerous cells.",
                &["Radius", "Perimeter"],
            ),
            entry(
                "Smoothness",
                "Local variation in radius lengths. Measures how uniform the cell boundary is.",
                &["Texture", "Compactness"],
            ),
            entry(
                "Compactness",
                "Calculated as (perimeter² / area - 1.0). Measures how compact or spread out the cell is.",
                &["Smoothness", "Concavity"],
            ),
            entry(
                "Concavity",
                "The severity of concave portions of the cell contour. Higher values indicate more irregular cell shapes.",
                &["Concave Points", "Compactness"],
            ),
            entry(
                "Concave Points",
                "The number of concave portions of the cell contour. More concave points suggest irregular cell boundaries.",
                &["Concavity"],
            ),
            entry(
                "Symmetry",
                "Measures how symmetric the cell is. Cancerous cells often show asymmetric features.",
                &["Fractal Dimension"],
            ),
            entry(
                "Fractal Dimension",
                "A measure of the complexity of the cell boundary using the \"coastline approximation\" - higher values indicate more complex, irregular boundaries.",
                &["Symmetry", "Concavity"],
            ),
        ],
    },
    GlossaryCategory {
        name: "Machine Learning Terms",
        entries: &[
            entry(
                "Accuracy",
                "The proportion of correct predictions (both true positives and true negatives) among the total number of cases examined.",
                &["Precision", "Recall", "F1 Score"],
            ),
            entry(
                "Precision",
                "The proportion of true positive predictions among all positive predictions. High precision means fewer false positives.",
                &["Recall", "F1 Score"],
            ),
            entry(
                "Recall (Sensitivity)",
                "The proportion of actual positive cases that were correctly identified. High recall means fewer false negatives.",
                &["Precision", "Specificity"],
            ),
            entry(
                "F1 Score",
                "The harmonic mean of precision and recall. Provides a balanced measure of model performance, especially useful for imbalanced datasets.",
                &["Precision", "Recall"],
            ),
            entry(
                "ROC Curve",
                "Receiver Operating Characteristic curve plots the true positive rate against the false positive rate at various threshold settings.",
                &["AUC", "Sensitivity", "Specificity"],
            ),
            entry(
                "AUC (Area Under Curve)",
                "The area under the ROC curve. Values closer to 1.0 indicate better model performance. A random classifier has an AUC of 0.5.",
                &["ROC Curve"],
            ),
            entry(
                "Confusion Matrix",
                "A table showing true positives, true negatives, false positives, and false negatives. Helps visualize model performance.",
                &["Accuracy", "Precision", "Recall"],
            ),
            entry(
                "SHAP Values",
                "SHapley Additive exPlanations - a method to explain the output of machine learning models by attributing importance to each feature.",
                &["Feature Importance", "Explainability"],
            ),
        ],
    },
    GlossaryCategory {
        name: "Deep Learning Models",
        entries: &[
            entry(
                "DenseNet",
                "Dense Convolutional Network - a CNN architecture where each layer receives feature maps from all preceding layers, improving gradient flow and feature reuse.",
                &["CNN", "ResNet"],
            ),
            entry(
                "Vision Transformer (ViT)",
                "A transformer architecture applied directly to sequences of image patches. Achieves excellent results on image classification tasks.",
                &["Transformer", "Attention"],
            ),
            entry(
                "Swin Transformer",
                "A hierarchical Vision Transformer using shifted windows for computing self-attention. More efficient than standard ViT for high-resolution images.",
                &["ViT", "Attention"],
            ),
            entry(
                "EfficientNet",
                "A CNN architecture that uses compound scaling to uniformly scale network depth, width, and resolution for optimal efficiency.",
                &["CNN", "Scaling"],
            ),
            entry(
                "Ensemble Learning",
                "A technique that combines predictions from multiple models to achieve better predictive performance than any single model.",
                &["Voting", "Bagging", "Boosting"],
            ),
            entry(
                "Grad-CAM",
                "Gradient-weighted Class Activation Mapping - a technique to produce visual explanations for CNN decisions by highlighting important regions.",
                &["Explainability", "CNN"],
            ),
            entry(
                "Transfer Learning",
                "Using a pre-trained model as a starting point for a new task. Especially useful when you have limited training data.",
                &["Pre-training", "Fine-tuning"],
            ),
            entry(
                "GRU (Gated Recurrent Unit)",
                "A type of recurrent neural network that can learn long-term dependencies in sequential data using gating mechanisms.",
                &["LSTM", "RNN"],
            ),
        ],
    },
];

/// Read-only view over the built-in glossary
pub struct Glossary;

impl Glossary {
    pub fn categories() -> &'static [GlossaryCategory] {
        CATEGORIES
    }

    pub fn len() -> usize {
        CATEGORIES.iter().map(|c| c.entries.len()).sum()
    }

    /// Case-insensitive substring match on term or definition.
    /// Categories without hits are dropped; a blank query matches everything.
    pub fn search(query: &str) -> Vec<CategoryMatches> {
        let needle = query.trim().to_lowercase();
        CATEGORIES
            .iter()
            .filter_map(|category| {
                let terms: Vec<&'static GlossaryEntry> = category
                    .entries
                    .iter()
                    .filter(|e| {
                        needle.is_empty()
                            || e.term.to_lowercase().contains(&needle)
                            || e.definition.to_lowercase().contains(&needle)
                    })
                    .collect();
                (!terms.is_empty()).then_some(CategoryMatches {
                    category: category.name,
                    terms,
                })
            })
            .collect()
    }

    /// Exact, case-insensitive term lookup
    pub fn lookup(term: &str) -> Option<&'static GlossaryEntry> {
        let term = term.trim();
        CATEGORIES
            .iter()
            .flat_map(|c| c.entries.iter())
            .find(|e| e.term.eq_ignore_ascii_case(term))
    }
}
