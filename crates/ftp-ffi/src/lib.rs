//! # FTP FFI
//!
//! C-compatible Foreign Function Interface for the FTP engine.
//!
//! ## Lifecycle
//!
//! 1. `ftp_create` validates and copies the caller's buffers and returns a
//!    handle (0 on failure).
//! 2. `ftp_compute` runs the Stock (0) or Flux (1) method.
//! 3. `ftp_get_dims` reports the shared `rows x cols` shape of the outputs.
//! 4. `ftp_get_matrix` or a named getter copies one matrix row-major into a
//!    caller buffer of at least `rows * cols` doubles.
//! 5. `ftp_free` releases the handle. Releasing twice is a no-op.
//!
//! ## Error Handling
//!
//! Functions return `FTP_OK` (0) or `FTP_ERROR` (-1). The message of the most
//! recent failure on the calling thread is available through
//! `ftp_get_last_error`.

#![allow(clippy::missing_safety_doc)]

use std::slice;

use libc::{c_char, c_int};

use ftp_core::{ComputeMethod, Engine, FtpError, InputModel, OutputKind};

mod error;
pub mod registry;

use error::set_last_error;
pub use registry::{Handle, INVALID_HANDLE};

/// Result code for successful operations.
pub const FTP_OK: c_int = 0;

/// Result code for errors.
pub const FTP_ERROR: c_int = -1;

fn fail(err: &FtpError) -> c_int {
    set_last_error(err.to_string());
    FTP_ERROR
}

fn unknown_handle(handle: Handle) -> c_int {
    set_last_error(format!("invalid handle: {handle}"));
    FTP_ERROR
}

/// Converts a C dimension to `usize`, rejecting non-positive values.
fn dimension(value: c_int) -> Result<usize, FtpError> {
    usize::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| FtpError::invalid_input("dimensions must be positive"))
}

/// Borrows `len` doubles from a caller pointer.
unsafe fn input_slice<'a>(
    ptr: *const f64,
    len: usize,
    what: &str,
) -> Result<&'a [f64], FtpError> {
    if ptr.is_null() {
        return Err(FtpError::invalid_input(format!("{what}: null pointer")));
    }
    Ok(slice::from_raw_parts(ptr, len))
}

#[allow(clippy::too_many_arguments)]
unsafe fn build_engine(
    outstanding: *const f64,
    outs_rows: c_int,
    profiles: *const f64,
    prof_rows: c_int,
    prof_cols: c_int,
    rates: *const f64,
    rate_rows: c_int,
    rate_cols: c_int,
) -> Result<Engine, FtpError> {
    let outs_rows = dimension(outs_rows)?;
    let profile_shape = (dimension(prof_rows)?, dimension(prof_cols)?);
    let rate_shape = (dimension(rate_rows)?, dimension(rate_cols)?);

    let cells = |(rows, cols): (usize, usize), what: &str| {
        rows.checked_mul(cols)
            .ok_or_else(|| FtpError::invalid_input(format!("{what}: shape overflows")))
    };

    let outstanding = input_slice(outstanding, outs_rows, "outstanding")?;
    let profiles = input_slice(profiles, cells(profile_shape, "profiles")?, "profiles")?;
    let rates = input_slice(rates, cells(rate_shape, "rates")?, "rates")?;

    let input =
        InputModel::from_row_major(outstanding, profiles, profile_shape, rates, rate_shape)?;
    Ok(Engine::new(input))
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Creates an engine from row-major caller buffers.
///
/// - `outstanding`: `outs_rows` doubles
/// - `profiles`: `prof_rows * prof_cols` doubles
/// - `rates`: `rate_rows * rate_cols` doubles
///
/// The buffers are copied. Returns the new handle, or `INVALID_HANDLE` (0)
/// on failure.
///
/// # Safety
///
/// Each non-null pointer must reference at least the declared number of
/// readable doubles.
#[no_mangle]
pub unsafe extern "C" fn ftp_create(
    outstanding: *const f64,
    outs_rows: c_int,
    profiles: *const f64,
    prof_rows: c_int,
    prof_cols: c_int,
    rates: *const f64,
    rate_rows: c_int,
    rate_cols: c_int,
) -> Handle {
    match build_engine(
        outstanding,
        outs_rows,
        profiles,
        prof_rows,
        prof_cols,
        rates,
        rate_rows,
        rate_cols,
    ) {
        Ok(engine) => registry::register(engine),
        Err(e) => {
            fail(&e);
            INVALID_HANDLE
        }
    }
}

/// Releases an engine. Unknown or already released handles are ignored.
#[no_mangle]
pub extern "C" fn ftp_free(handle: Handle) {
    registry::release(handle);
}

// ============================================================================
// Compute
// ============================================================================

/// Runs the FTP computation.
///
/// - `method`: 0 = Stock, 1 = Flux
///
/// Returns `FTP_OK` on success. On failure returns `FTP_ERROR`; outputs of
/// an earlier successful compute stay readable.
#[no_mangle]
pub extern "C" fn ftp_compute(handle: Handle, method: c_int) -> c_int {
    let method = match ComputeMethod::try_from(method) {
        Ok(method) => method,
        Err(e) => return fail(&e),
    };

    match registry::with_engine(handle, |engine| engine.compute(method)) {
        Some(Ok(())) => FTP_OK,
        Some(Err(e)) => fail(&e),
        None => unknown_handle(handle),
    }
}

// ============================================================================
// Dimension query
// ============================================================================

/// Writes the output dimensions into `out_rows` and `out_cols`.
///
/// Fails if no compute has succeeded on this handle.
///
/// # Safety
///
/// `out_rows` and `out_cols` must be valid writable pointers or null.
#[no_mangle]
pub unsafe extern "C" fn ftp_get_dims(
    handle: Handle,
    out_rows: *mut c_int,
    out_cols: *mut c_int,
) -> c_int {
    if out_rows.is_null() || out_cols.is_null() {
        set_last_error("null pointer argument");
        return FTP_ERROR;
    }

    match registry::with_engine(handle, |engine| engine.dimensions()) {
        Some(Ok((rows, cols))) => match (c_int::try_from(rows), c_int::try_from(cols)) {
            (Ok(rows), Ok(cols)) => {
                *out_rows = rows;
                *out_cols = cols;
                FTP_OK
            }
            _ => {
                set_last_error("output dimensions exceed the C int range");
                FTP_ERROR
            }
        },
        Some(Err(e)) => fail(&e),
        None => unknown_handle(handle),
    }
}

// ============================================================================
// Matrix getters
// ============================================================================

unsafe fn copy_output(handle: Handle, kind: OutputKind, buf: *mut f64, buf_len: c_int) -> c_int {
    if buf.is_null() {
        set_last_error(format!("{kind}: null output buffer"));
        return FTP_ERROR;
    }
    let capacity = usize::try_from(buf_len).unwrap_or(0);

    let copied = registry::with_engine(handle, |engine| {
        let dest = slice::from_raw_parts_mut(buf, capacity);
        engine.copy_matrix(kind, dest)
    });

    match copied {
        Some(Ok(_)) => FTP_OK,
        Some(Err(e)) => fail(&e),
        None => unknown_handle(handle),
    }
}

/// Copies the output matrix identified by `which` into `buf`.
///
/// Codes: 0 stock_amort, 1 stock_instal, 2 varstock_amort,
/// 3 varstock_instal, 4 ftp_rate, 5 ftp_int, 6 market_rate.
///
/// # Safety
///
/// `buf` must be null or point to at least `buf_len` writable doubles.
#[no_mangle]
pub unsafe extern "C" fn ftp_get_matrix(
    handle: Handle,
    which: c_int,
    buf: *mut f64,
    buf_len: c_int,
) -> c_int {
    match OutputKind::try_from(which) {
        Ok(kind) => copy_output(handle, kind, buf, buf_len),
        Err(e) => fail(&e),
    }
}

/// Copies `stock_amort` into `buf`.
///
/// # Safety
///
/// `buf` must be null or point to at least `buf_len` writable doubles.
#[no_mangle]
pub unsafe extern "C" fn ftp_get_stock_amort(
    handle: Handle,
    buf: *mut f64,
    buf_len: c_int,
) -> c_int {
    copy_output(handle, OutputKind::StockAmort, buf, buf_len)
}

/// Copies `stock_instal` into `buf`.
///
/// # Safety
///
/// `buf` must be null or point to at least `buf_len` writable doubles.
#[no_mangle]
pub unsafe extern "C" fn ftp_get_stock_instal(
    handle: Handle,
    buf: *mut f64,
    buf_len: c_int,
) -> c_int {
    copy_output(handle, OutputKind::StockInstal, buf, buf_len)
}

/// Copies `varstock_amort` into `buf`.
///
/// # Safety
///
/// `buf` must be null or point to at least `buf_len` writable doubles.
#[no_mangle]
pub unsafe extern "C" fn ftp_get_varstock_amort(
    handle: Handle,
    buf: *mut f64,
    buf_len: c_int,
) -> c_int {
    copy_output(handle, OutputKind::VarstockAmort, buf, buf_len)
}

/// Copies `varstock_instal` into `buf`.
///
/// # Safety
///
/// `buf` must be null or point to at least `buf_len` writable doubles.
#[no_mangle]
pub unsafe extern "C" fn ftp_get_varstock_instal(
    handle: Handle,
    buf: *mut f64,
    buf_len: c_int,
) -> c_int {
    copy_output(handle, OutputKind::VarstockInstal, buf, buf_len)
}

/// Copies `ftp_rate` into `buf`.
///
/// # Safety
///
/// `buf` must be null or point to at least `buf_len` writable doubles.
#[no_mangle]
pub unsafe extern "C" fn ftp_get_ftp_rate(handle: Handle, buf: *mut f64, buf_len: c_int) -> c_int {
    copy_output(handle, OutputKind::FtpRate, buf, buf_len)
}

/// Copies `ftp_int` into `buf`.
///
/// # Safety
///
/// `buf` must be null or point to at least `buf_len` writable doubles.
#[no_mangle]
pub unsafe extern "C" fn ftp_get_ftp_int(handle: Handle, buf: *mut f64, buf_len: c_int) -> c_int {
    copy_output(handle, OutputKind::FtpInt, buf, buf_len)
}

/// Copies `market_rate` into `buf`.
///
/// # Safety
///
/// `buf` must be null or point to at least `buf_len` writable doubles.
#[no_mangle]
pub unsafe extern "C" fn ftp_get_market_rate(
    handle: Handle,
    buf: *mut f64,
    buf_len: c_int,
) -> c_int {
    copy_output(handle, OutputKind::MarketRate, buf, buf_len)
}

// ============================================================================
// Error Handling
// ============================================================================

/// Copies the calling thread's last error message into `buf`, NUL-terminated.
///
/// Returns `FTP_OK`, or `FTP_ERROR` if `buf` is null, `buf_len` is not
/// positive, or the message was truncated.
///
/// # Safety
///
/// `buf` must be null or point to at least `buf_len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn ftp_get_last_error(buf: *mut c_char, buf_len: c_int) -> c_int {
    if buf.is_null() {
        return FTP_ERROR;
    }
    let Ok(len) = usize::try_from(buf_len) else {
        return FTP_ERROR;
    };
    let dest = slice::from_raw_parts_mut(buf.cast::<u8>(), len);
    if error::copy_last_error(dest) {
        FTP_OK
    } else {
        FTP_ERROR
    }
}

/// Clears the calling thread's last error message.
#[no_mangle]
pub extern "C" fn ftp_clear_error() {
    error::clear_error();
}

// ============================================================================
// Version Information
// ============================================================================

/// Returns the library version string.
///
/// The returned string is statically allocated and must not be freed.
#[no_mangle]
pub extern "C" fn ftp_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr().cast::<c_char>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::ptr;

    fn last_error() -> String {
        let mut buf = [0 as c_char; 256];
        unsafe {
            ftp_get_last_error(buf.as_mut_ptr(), buf.len() as c_int);
            CStr::from_ptr(buf.as_ptr()).to_string_lossy().into_owned()
        }
    }

    fn create_sample() -> Handle {
        let outstanding = [1000.0, -500.0];
        let profiles = [0.5, 0.5, 0.0, 0.25, 0.25, 0.5];
        let rates = [0.05, 0.05, 0.02, 0.03];
        unsafe {
            ftp_create(
                outstanding.as_ptr(),
                2,
                profiles.as_ptr(),
                2,
                3,
                rates.as_ptr(),
                2,
                2,
            )
        }
    }

    #[test]
    fn test_full_lifecycle() {
        let handle = create_sample();
        assert_ne!(handle, INVALID_HANDLE);
        assert_eq!(ftp_compute(handle, 0), FTP_OK);

        let (mut rows, mut cols) = (0, 0);
        unsafe {
            assert_eq!(ftp_get_dims(handle, &mut rows, &mut cols), FTP_OK);
        }
        assert_eq!((rows, cols), (2, 3));

        let mut buf = vec![0.0; 6];
        unsafe {
            assert_eq!(ftp_get_stock_amort(handle, buf.as_mut_ptr(), 6), FTP_OK);
        }
        assert_eq!(&buf[..3], &[500.0, 500.0, 0.0]);

        unsafe {
            assert_eq!(ftp_get_matrix(handle, 6, buf.as_mut_ptr(), 6), FTP_OK);
        }
        assert_eq!(&buf[..3], &[0.0, 0.05, 0.05]);
        assert_eq!(&buf[3..], &[0.0, 0.02, 0.03]);

        ftp_free(handle);
        ftp_free(handle);
        assert_eq!(ftp_compute(handle, 0), FTP_ERROR);
    }

    #[test]
    fn test_named_getters_match_generic() {
        let handle = create_sample();
        assert_eq!(ftp_compute(handle, 1), FTP_OK);

        type Getter = unsafe extern "C" fn(Handle, *mut f64, c_int) -> c_int;
        let getters: [(c_int, Getter); 7] = [
            (0, ftp_get_stock_amort),
            (1, ftp_get_stock_instal),
            (2, ftp_get_varstock_amort),
            (3, ftp_get_varstock_instal),
            (4, ftp_get_ftp_rate),
            (5, ftp_get_ftp_int),
            (6, ftp_get_market_rate),
        ];
        for (code, getter) in getters {
            let mut named = vec![f64::NAN; 6];
            let mut generic = vec![f64::NAN; 6];
            unsafe {
                assert_eq!(getter(handle, named.as_mut_ptr(), 6), FTP_OK);
                assert_eq!(ftp_get_matrix(handle, code, generic.as_mut_ptr(), 6), FTP_OK);
            }
            assert_eq!(named, generic, "matrix code {code}");
        }
        ftp_free(handle);
    }

    #[test]
    fn test_create_rejects_zero_rows() {
        let data = [1.0];
        let handle = unsafe {
            ftp_create(data.as_ptr(), 0, data.as_ptr(), 1, 1, data.as_ptr(), 1, 1)
        };
        assert_eq!(handle, INVALID_HANDLE);
        assert!(last_error().contains("dimensions must be positive"));
    }

    #[test]
    fn test_create_rejects_row_mismatch() {
        let outstanding = [1000.0, 2000.0];
        let profiles = [1.0];
        let rates = [0.01, 0.02];
        let handle = unsafe {
            ftp_create(
                outstanding.as_ptr(),
                2,
                profiles.as_ptr(),
                1,
                1,
                rates.as_ptr(),
                2,
                1,
            )
        };
        assert_eq!(handle, INVALID_HANDLE);
        assert!(last_error().contains("profiles"));
    }

    #[test]
    fn test_create_rejects_null_pointer() {
        let data = [1.0];
        let handle =
            unsafe { ftp_create(ptr::null(), 1, data.as_ptr(), 1, 1, data.as_ptr(), 1, 1) };
        assert_eq!(handle, INVALID_HANDLE);
        assert!(last_error().contains("outstanding: null pointer"));
    }

    #[test]
    fn test_create_rejects_nan() {
        let data = [1.0];
        let nan = [f64::NAN];
        let handle =
            unsafe { ftp_create(data.as_ptr(), 1, nan.as_ptr(), 1, 1, data.as_ptr(), 1, 1) };
        assert_eq!(handle, INVALID_HANDLE);
        assert!(last_error().contains("Non-finite"));
    }

    #[test]
    fn test_dims_before_compute() {
        let handle = create_sample();
        let (mut rows, mut cols) = (-1, -1);
        unsafe {
            assert_eq!(ftp_get_dims(handle, &mut rows, &mut cols), FTP_ERROR);
        }
        assert_eq!((rows, cols), (-1, -1));
        assert!(last_error().contains("not yet computed"));
        ftp_free(handle);
    }

    #[test]
    fn test_unknown_method() {
        let handle = create_sample();
        assert_eq!(ftp_compute(handle, 2), FTP_ERROR);
        assert!(last_error().contains("unknown method code 2"));

        // The engine is still usable.
        assert_eq!(ftp_compute(handle, 0), FTP_OK);
        ftp_free(handle);
    }

    #[test]
    fn test_buffer_too_small_leaves_buffer() {
        let handle = create_sample();
        assert_eq!(ftp_compute(handle, 0), FTP_OK);

        let mut buf = vec![-7.0; 5];
        unsafe {
            assert_eq!(ftp_get_ftp_rate(handle, buf.as_mut_ptr(), 5), FTP_ERROR);
        }
        assert!(buf.iter().all(|v| *v == -7.0));
        assert_eq!(last_error(), "ftp_rate: buffer too small (5 < 6)");
        ftp_free(handle);
    }

    #[test]
    fn test_unknown_matrix_code() {
        let handle = create_sample();
        assert_eq!(ftp_compute(handle, 0), FTP_OK);
        let mut buf = vec![0.0; 6];
        unsafe {
            assert_eq!(ftp_get_matrix(handle, 9, buf.as_mut_ptr(), 6), FTP_ERROR);
        }
        ftp_free(handle);
    }

    #[test]
    fn test_compute_failure_reports_message() {
        let outstanding = [100.0];
        let profiles = [0.5, -0.5];
        let rates = [0.01];
        let handle = unsafe {
            ftp_create(
                outstanding.as_ptr(),
                1,
                profiles.as_ptr(),
                1,
                2,
                rates.as_ptr(),
                1,
                1,
            )
        };
        assert_ne!(handle, INVALID_HANDLE);
        assert_eq!(ftp_compute(handle, 0), FTP_ERROR);
        assert!(last_error().starts_with("Compute failure"));
        ftp_free(handle);
    }

    #[test]
    fn test_last_error_truncation() {
        set_last_error("0123456789");
        let mut small = [0 as c_char; 4];
        let mut exact = [0 as c_char; 11];
        unsafe {
            assert_eq!(ftp_get_last_error(small.as_mut_ptr(), 4), FTP_ERROR);
            assert_eq!(CStr::from_ptr(small.as_ptr()).to_str().unwrap(), "012");
            assert_eq!(ftp_get_last_error(exact.as_mut_ptr(), 11), FTP_OK);
            assert_eq!(ftp_get_last_error(ptr::null_mut(), 11), FTP_ERROR);
            assert_eq!(ftp_get_last_error(exact.as_mut_ptr(), 0), FTP_ERROR);
        }
    }

    #[test]
    fn test_clear_error() {
        set_last_error("stale");
        ftp_clear_error();
        assert_eq!(last_error(), "");
    }

    #[test]
    fn test_version() {
        let version = unsafe { CStr::from_ptr(ftp_version()) };
        assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }
}
