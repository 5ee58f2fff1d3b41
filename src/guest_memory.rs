// Reads guest-side strings referenced by pointer registers.
//
// A pointer either lands in a locally backed region, in which case the bytes are
// copied straight out of the host buffer, or it points at memory only the real
// CPU side can see and every byte goes over the bus.

use std::path::PathBuf;

use crate::{error::StringFetchError, region::RegionTable};

/// Raw single-byte reads from the external CPU's address space.
///
/// Must not be called from inside the bridge's own bus service routine.
pub trait BusRead {
    fn read8(&mut self, address: u32) -> u8;
}

/// Copy a NUL-terminated string at `address` into `dest`.
///
/// At most `dest.len()` bytes are read, terminator included. Returns the length
/// without the terminator. On failure `dest` is zeroed.
pub fn grab_string(
    regions: &dyn RegionTable,
    bus: &mut dyn BusRead,
    address: u32,
    dest: &mut [u8],
) -> Result<usize, StringFetchError> {
    let max_len = dest.len();
    let result = match regions.find_by_address(address) {
        Some(region) => {
            tracing::debug!(
                "[GRAB-STRING] ${:08X} is in mapped range '{}', copying from host buffer",
                address,
                region.id
            );
            let src = region.slice_from(address).unwrap_or(&[]);
            copy_terminated(src.iter().copied(), dest).ok_or(if src.len() < max_len {
                StringFetchError::OutOfRegion { address }
            } else {
                StringFetchError::Unterminated { address, max_len }
            })
        }
        None => {
            tracing::debug!(
                "[GRAB-STRING] No mapped range found for ${:08X}, reading over the bus",
                address
            );
            let bytes = (0..max_len as u32).map(|index| bus.read8(address.wrapping_add(index)));
            copy_terminated(bytes, dest).ok_or(StringFetchError::Unterminated { address, max_len })
        }
    };

    if result.is_err() {
        dest.fill(0);
    }
    result
}

/// Fetch the raw bytes of a string of at most `max_len` bytes (terminator included).
pub fn fetch_bytes(
    regions: &dyn RegionTable,
    bus: &mut dyn BusRead,
    address: u32,
    max_len: usize,
) -> Result<Vec<u8>, StringFetchError> {
    let mut buffer = vec![0u8; max_len];
    let len = grab_string(regions, bus, address, &mut buffer)?;
    buffer.truncate(len);
    tracing::debug!(
        "[GRAB-STRING] Grabbed string: {}",
        String::from_utf8_lossy(&buffer)
    );
    Ok(buffer)
}

/// Fetch a string that must be valid UTF-8.
pub fn fetch_string(
    regions: &dyn RegionTable,
    bus: &mut dyn BusRead,
    address: u32,
    max_len: usize,
) -> Result<String, StringFetchError> {
    let bytes = fetch_bytes(regions, bus, address, max_len)?;
    String::from_utf8(bytes).map_err(|_| StringFetchError::InvalidUtf8 { address })
}

/// Fetch a host path. Guest names are taken byte for byte (AmigaOS uses Latin-1).
pub fn fetch_path(
    regions: &dyn RegionTable,
    bus: &mut dyn BusRead,
    address: u32,
    max_len: usize,
) -> Result<PathBuf, StringFetchError> {
    fetch_bytes(regions, bus, address, max_len).map(path_from_bytes)
}

#[cfg(unix)]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    use std::{ffi::OsString, os::unix::ffi::OsStringExt};

    PathBuf::from(OsString::from_vec(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    // Latin-1 maps one to one onto the first 256 code points.
    PathBuf::from(bytes.into_iter().map(char::from).collect::<String>())
}

fn copy_terminated(bytes: impl Iterator<Item = u8>, dest: &mut [u8]) -> Option<usize> {
    for (index, byte) in bytes.take(dest.len()).enumerate() {
        dest[index] = byte;
        if byte == 0 {
            return Some(index);
        }
    }
    None
}
