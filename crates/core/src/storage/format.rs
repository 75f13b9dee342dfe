use crate::errors::CoreError;

/// Magic bytes identifying a PTRK (Portfolio Tracker) ledger file.
pub const MAGIC: &[u8; 4] = b"PTRK";

/// Current file format version.
///
/// v1 stored dividends with a flat `amount` and no share count; v2 derives
/// the amount from a stored share count (see `migrations`).
pub const CURRENT_VERSION: u16 = 2;

/// Minimum header size in bytes:
/// magic(4) + version(2) + payload_len(8) = 14
pub const MIN_HEADER_SIZE: usize = 14;

/// Write a complete ledger file to bytes.
///
/// Layout:
/// ```text
/// [PTRK: 4B] [version: 2B LE] [payload_len: 8B LE] [payload: JSON, variable]
/// ```
pub fn write_file(version: u16, payload: &[u8]) -> Vec<u8> {
    let payload_len = payload.len() as u64;
    let mut buf = Vec::with_capacity(MIN_HEADER_SIZE + payload.len());

    // Magic
    buf.extend_from_slice(MAGIC);
    // Version
    buf.extend_from_slice(&version.to_le_bytes());
    // Payload length
    buf.extend_from_slice(&payload_len.to_le_bytes());
    // Payload
    buf.extend_from_slice(payload);

    buf
}

/// Parse the header from raw file bytes.
/// Returns the version and the payload slice.
pub fn read_file(data: &[u8]) -> Result<(u16, &[u8]), CoreError> {
    if data.len() < MIN_HEADER_SIZE {
        return Err(CoreError::InvalidFileFormat(
            "File too small to be a valid PTRK file".into(),
        ));
    }

    // Validate magic bytes
    if &data[0..4] != MAGIC {
        return Err(CoreError::InvalidFileFormat(
            "Invalid magic bytes — not a PTRK file".into(),
        ));
    }

    let mut offset = 4;

    // Version
    let version = u16::from_le_bytes([data[offset], data[offset + 1]]);
    offset += 2;

    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    // Payload length
    let payload_len = u64::from_le_bytes(
        data[offset..offset + 8]
            .try_into()
            .map_err(|_| CoreError::InvalidFileFormat("Failed to read payload length".into()))?,
    );
    offset += 8;

    let expected_end = offset + payload_len as usize;
    if data.len() < expected_end {
        return Err(CoreError::InvalidFileFormat(format!(
            "File truncated: expected {} bytes of payload, got {}",
            payload_len,
            data.len() - offset
        )));
    }

    Ok((version, &data[offset..expected_end]))
}
