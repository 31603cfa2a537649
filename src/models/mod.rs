pub mod dataset;
pub mod instance;
pub mod loaders;
pub mod results;
pub mod rule_base;

pub use dataset::{Attribute, AttributeKind, Dataset};
pub use instance::{DataConverter, Instance, UNKNOWN_LABEL};
pub use loaders::load_dataset;
pub use results::{ConfusionMatrix, ResultMatrix};
pub use rule_base::{
    decode_model, load_model, Classifier, FuzzyRule, FuzzyRuleBase, InferenceKind, ModelFamily,
    NO_PREDICTION,
};
