/// Magic bytes opening every `.segs` snapshot.
pub const SEGS_HEADER: &[u8; 4] = b"segs";

/// Current snapshot format version.
pub const SEGS_VERSION: u8 = 1;

/// Payload tag for [`FieldValue::Integer`](segstore_core::FieldValue).
pub const TAG_INTEGER: u8 = 0x01;
/// Payload tag for [`FieldValue::Text`](segstore_core::FieldValue).
pub const TAG_TEXT: u8 = 0x02;
/// Payload tag for [`FieldValue::IntegerArray`](segstore_core::FieldValue).
pub const TAG_INTEGER_ARRAY: u8 = 0x03;
/// Payload tag for [`FieldValue::Float`](segstore_core::FieldValue).
pub const TAG_FLOAT: u8 = 0x04;
