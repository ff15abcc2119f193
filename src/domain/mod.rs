//! Declarative form description and the values it produces.

pub mod error;
pub mod field;
pub mod schema;
pub mod values;

pub use error::{FormError, FormResult, SchemaError};
pub use field::{ConditionalLogic, FieldOption, FieldType, FieldValidation, FormField, ShowWhen};
pub use schema::{FormGroup, FormSchema, FormStep};
pub use values::{ErrorState, FileHandle, FormValues};
