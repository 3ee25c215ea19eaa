//! Low-level helpers for reading fields out of characteristic values
//!
//! Every reader takes a byte offset and returns `None` when the buffer is too
//! short for the requested width. All multi-byte values are little-endian.

fn field<const N: usize>(data: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    data.get(offset..end)?.try_into().ok()
}

pub fn read_u8(data: &[u8], offset: usize) -> Option<u8> {
    data.get(offset).copied()
}

pub fn read_i8(data: &[u8], offset: usize) -> Option<i8> {
    field(data, offset).map(i8::from_le_bytes)
}

pub fn read_u16_le(data: &[u8], offset: usize) -> Option<u16> {
    field(data, offset).map(u16::from_le_bytes)
}

pub fn read_i16_le(data: &[u8], offset: usize) -> Option<i16> {
    field(data, offset).map(i16::from_le_bytes)
}

/// Read a 24-bit unsigned value, zero-extended to 32 bits
pub fn read_u24_le(data: &[u8], offset: usize) -> Option<u32> {
    let [b0, b1, b2] = field(data, offset)?;
    Some(u32::from_le_bytes([b0, b1, b2, 0]))
}

/// Read a 24-bit two's-complement value, sign-extended from bit 23
pub fn read_i24_le(data: &[u8], offset: usize) -> Option<i32> {
    let [b0, b1, b2] = field(data, offset)?;
    // Load into the top three bytes, then shift back arithmetically
    Some(i32::from_le_bytes([0, b0, b1, b2]) >> 8)
}

pub fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    field(data, offset).map(u32::from_le_bytes)
}

pub fn read_i32_le(data: &[u8], offset: usize) -> Option<i32> {
    field(data, offset).map(i32::from_le_bytes)
}

pub fn read_u64_le(data: &[u8], offset: usize) -> Option<u64> {
    field(data, offset).map(u64::from_le_bytes)
}

/// Decode the bytes up to the first NUL (or the whole buffer) as UTF-8
///
/// Returns `None` if those bytes are not valid UTF-8.
pub fn null_terminated_str(data: &[u8]) -> Option<String> {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    std::str::from_utf8(&data[..end]).ok().map(str::to_owned)
}

/// Describe the bytes of a characteristic value for diagnostic logging
///
/// Produces `"<count> bytes\n[0]: <value>, [1]: <value>, ..."` with decimal
/// byte values, or `"nil"` when there is no value at all.
pub fn value_debug_string(data: Option<&[u8]>) -> String {
    let Some(data) = data else {
        return "nil".to_string();
    };

    let bytes = data
        .iter()
        .enumerate()
        .map(|(i, b)| format!("[{}]: {}", i, b))
        .collect::<Vec<_>>()
        .join(", ");

    format!("{} bytes\n{}", data.len(), bytes)
}
