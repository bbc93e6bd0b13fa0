use std::ffi::{c_void, CStr, CString};
use std::os::raw::{c_char, c_int};

use highs_sys::*;

/// A value that can be given to a named HiGHS option
pub trait HighsOptionValue {
    /// Set `option` to this value on the given HiGHS instance
    ///
    /// # Safety
    ///
    /// `highs` must be a live HiGHS instance and `option` a valid C string.
    unsafe fn apply_to_highs(self, highs: *mut c_void, option: *const c_char) -> c_int;
}

impl HighsOptionValue for bool {
    unsafe fn apply_to_highs(self, highs: *mut c_void, option: *const c_char) -> c_int {
        Highs_setBoolOptionValue(highs, option, if self { 1 } else { 0 })
    }
}

impl HighsOptionValue for i32 {
    unsafe fn apply_to_highs(self, highs: *mut c_void, option: *const c_char) -> c_int {
        Highs_setIntOptionValue(highs, option, self)
    }
}

impl HighsOptionValue for f64 {
    unsafe fn apply_to_highs(self, highs: *mut c_void, option: *const c_char) -> c_int {
        Highs_setDoubleOptionValue(highs, option, self)
    }
}

impl<'a> HighsOptionValue for &'a CStr {
    unsafe fn apply_to_highs(self, highs: *mut c_void, option: *const c_char) -> c_int {
        Highs_setStringOptionValue(highs, option, self.as_ptr())
    }
}

impl<'a> HighsOptionValue for &'a str {
    unsafe fn apply_to_highs(self, highs: *mut c_void, option: *const c_char) -> c_int {
        match CString::new(self) {
            Ok(value) => value.as_c_str().apply_to_highs(highs, option),
            Err(_) => STATUS_ERROR,
        }
    }
}
