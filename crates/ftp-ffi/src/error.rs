//! Thread-local error handling for FFI.
//!
//! Each calling thread sees the message of its own most recent failure.

use std::cell::RefCell;
use std::ffi::CString;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Sets the last error message.
///
/// Interior NUL bytes are dropped so the message always survives.
pub fn set_last_error(msg: impl Into<String>) {
    let mut bytes = msg.into().into_bytes();
    bytes.retain(|b| *b != 0);
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = CString::new(bytes).ok();
    });
}

/// Copies the last error into `dest` as a NUL-terminated string.
///
/// Writes an empty string when no error is set. Returns `false` if `dest`
/// is empty or the message had to be truncated to fit.
pub fn copy_last_error(dest: &mut [u8]) -> bool {
    let Some(capacity) = dest.len().checked_sub(1) else {
        return false;
    };

    LAST_ERROR.with(|cell| {
        let message = cell.borrow();
        let bytes = message.as_ref().map_or(&[][..], |s| s.as_bytes());
        let copy_len = bytes.len().min(capacity);
        dest[..copy_len].copy_from_slice(&bytes[..copy_len]);
        dest[copy_len] = 0;
        copy_len == bytes.len()
    })
}

/// Clears the last error.
pub fn clear_error() {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = None;
    });
}
