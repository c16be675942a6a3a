//! Sigma: the vendor-neutral YAML rule dialect.

pub mod consts;
pub mod mapping;
pub mod modifiers;
pub mod parser;
pub mod render;

pub use consts::sigma_rule_details;
pub use mapping::sigma_mappings;
pub use modifiers::ModifierEngine;
pub use parser::SigmaParser;
pub use render::SigmaRender;
