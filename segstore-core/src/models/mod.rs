pub mod field_value;
pub mod segment;

// re-export for cleaner imports
pub use self::field_value::FieldValue;
pub use self::segment::{Position, Segment};
