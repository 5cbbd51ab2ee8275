pub mod cleanup;
pub mod default_rules;
pub mod normalize;
pub mod parser;
pub mod rules;
pub mod validate;

pub use default_rules::default_rules;
pub use normalize::Normalizer;
pub use parser::FieldParser;
pub use rules::{CompiledRuleSet, ExtractionRule, PageRegion, RuleError, RulePattern};
pub use validate::{RequirementSpec, Validator};
