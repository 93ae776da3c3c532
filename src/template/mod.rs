//! Template System
//!
//! Compilation of TextFSM-style templates and the registry that holds them.

pub mod compiler;
pub mod error;
pub mod registry;
pub mod schema;

pub use compiler::compile;
pub use error::{TemplateResult, TemplateSyntaxError};
pub use registry::{LoadedTemplate, TemplatePriority, TemplateRegistry, SHOW_INTERFACES_TEMPLATE};
pub use schema::{LineOp, RecordOp, Rule, State, TemplateDefinition, Value, ValueOptions};
