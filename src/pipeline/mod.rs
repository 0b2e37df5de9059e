//! Request-to-prediction pipelines
//!
//! - `image`: leaf photo → disease label + advisory text
//! - `tabular`: soil/climate measurements → recommended crop
//!
//! Neither pipeline knows about HTTP; both return typed errors that the
//! server maps onto status codes.

pub mod image;
pub mod tabular;

pub use self::image::{diagnose, preprocess, DiseaseDiagnosis, INPUT_SIZE};
pub use self::tabular::{recommend, CropRecommendation, FeatureVector, FEATURE_NAMES};
