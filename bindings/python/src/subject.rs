use std::borrow::Cow;

use linre::Haystack;
use pyo3::{
    exceptions::PyTypeError,
    prelude::*,
    types::{PyBytes, PyString},
};

use crate::LinreException;

/// A `str` or `bytes` value copied out of Python.
///
/// Copies are taken so scanning can run without the interpreter lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OwnedSubject {
    Text(String),
    Bytes(Vec<u8>),
}

impl OwnedSubject {
    pub(crate) fn extract(obj: &Bound<'_, PyAny>) -> PyResult<Self> {
        if obj.is_instance_of::<PyString>() {
            return Ok(Self::Text(obj.extract::<String>()?));
        }
        match obj.extract::<Cow<'_, [u8]>>() {
            Ok(bytes) => Ok(Self::Bytes(bytes.into_owned())),
            Err(_) => Err(PyTypeError::new_err(format!(
                "expected string or bytes-like object, got '{}'",
                obj.get_type().name()?
            ))),
        }
    }

    /// Extract, requiring the same kind as a pattern.
    pub(crate) fn extract_like(
        obj: &Bound<'_, PyAny>,
        text: bool,
    ) -> PyResult<Self> {
        let value = Self::extract(obj)?;
        if value.is_text() != text {
            return Err(PyTypeError::new_err(if text {
                "cannot use a string pattern on a bytes-like object"
            } else {
                "cannot use a bytes pattern on a string-like object"
            }));
        }
        Ok(value)
    }

    pub(crate) fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.into_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }

    pub(crate) fn haystack(&self) -> Haystack<'_> {
        match self {
            Self::Text(text) => Haystack::Text(text),
            Self::Bytes(bytes) => Haystack::Bytes(bytes),
        }
    }
}

/// Convert engine output back to `str` (for text patterns) or `bytes`.
pub(crate) fn to_python<'py>(
    py: Python<'py>,
    text: bool,
    bytes: &[u8],
) -> PyResult<Bound<'py, PyAny>> {
    if text {
        let text = core::str::from_utf8(bytes)
            .map_err(|e| LinreException::new_err(format!("result is not valid text: {e}")))?;
        Ok(PyString::new(py, text).into_any())
    } else {
        Ok(PyBytes::new(py, bytes).into_any())
    }
}

/// As [`to_python`]; with `None` for a missing value.
pub(crate) fn to_python_opt<'py>(
    py: Python<'py>,
    text: bool,
    bytes: Option<&[u8]>,
    default: Option<&Bound<'py, PyAny>>,
) -> PyResult<Bound<'py, PyAny>> {
    match bytes {
        Some(bytes) => to_python(py, text, bytes),
        None => Ok(match default {
            Some(default) => default.clone(),
            None => py.None().into_bound(py),
        }),
    }
}
