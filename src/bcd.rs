//! Binary-coded decimal packing for two-digit register values.

use crate::CodecError;

/// Packs `value` (0-99) into a BCD byte, tens in the high nibble.
///
/// # Errors
///
/// [`CodecError::OutOfRange`] when `value` is above 99.
pub fn decimal_to_bcd(value: u8) -> Result<u8, CodecError> {
    if value > 99 {
        return Err(CodecError::OutOfRange("bcd value"));
    }
    Ok(((value / 10) << 4) | (value % 10))
}

/// Unpacks a BCD byte.
///
/// Nibbles are not checked for being decimal digits: `0x1A` decodes to 20.
/// Callers that need validation must range-check the result.
#[must_use]
pub fn bcd_to_decimal(bcd: u8) -> u8 {
    (bcd >> 4) * 10 + (bcd & 0x0F)
}

/// [`decimal_to_bcd`] with a field-specific upper bound.
pub(crate) fn encode_field(value: u8, max: u8, field: &'static str) -> Result<u8, CodecError> {
    if value > max {
        error!("{} out of range: {} > {}", field, value, max);
        return Err(CodecError::OutOfRange(field));
    }
    decimal_to_bcd(value)
}

/// [`decimal_to_bcd`] for fields that start at 1.
pub(crate) fn encode_field_from_one(
    value: u8,
    max: u8,
    field: &'static str,
) -> Result<u8, CodecError> {
    if value == 0 {
        error!("{} out of range: 0", field);
        return Err(CodecError::OutOfRange(field));
    }
    encode_field(value, max, field)
}
