//! Process-wide properties
//!
//! Native bindings read the location of their library file from here, so the loader
//! sets the property right before calling into the native layer. Values are kept as
//! `OsString` so filesystem paths round-trip unchanged.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::ffi::OsString;
use std::sync::{PoisonError, RwLock};

static PROPERTIES: Lazy<RwLock<HashMap<String, OsString>>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Set a property, returning the previous value
pub fn set(key: impl Into<String>, value: impl Into<OsString>) -> Option<OsString> {
    PROPERTIES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key.into(), value.into())
}

#[must_use]
pub fn get(key: &str) -> Option<OsString> {
    PROPERTIES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(key)
        .cloned()
}

pub fn remove(key: &str) -> Option<OsString> {
    PROPERTIES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_set_get_remove() {
        let key = "nativeboot.test.properties";
        assert_eq!(set(key, "/tmp/a.so"), None);
        assert_eq!(set(key, "/tmp/b.so").as_deref(), Some(OsStr::new("/tmp/a.so")));
        assert_eq!(get(key).as_deref(), Some(OsStr::new("/tmp/b.so")));
        assert_eq!(remove(key).as_deref(), Some(OsStr::new("/tmp/b.so")));
        assert_eq!(get(key), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_value_round_trips() {
        use std::os::unix::ffi::OsStrExt;

        let key = "nativeboot.test.properties.raw";
        let raw = OsStr::from_bytes(b"/tmp/d\xff/libfoo.so");
        set(key, raw);
        assert_eq!(get(key).as_deref(), Some(raw));
    }
}
