use std::{ffi::CString, sync::Arc};

use linre::{
    CompileOptions,
    FallbackMode,
    FallbackPolicy,
    FlagSet,
    LinreError,
    PatternCompiler,
    fallback::{RecordingNotifier, global_policy},
};
use pyo3::{
    exceptions::{PyException, PyIndexError, PyUserWarning, PyValueError},
    prelude::*,
};

mod match_object;
mod pattern;
mod subject;

use match_object::{PyMatch, PyMatchIter};
use pattern::PyPattern;
use subject::{OwnedSubject, to_python};

pyo3::create_exception!(
    linre,
    LinreException,
    PyException,
    "Raised for invalid patterns, templates, and failed matches."
);

pub(crate) fn to_pyerr(err: LinreError) -> PyErr {
    match err {
        LinreError::NoSuchGroup(group) => PyIndexError::new_err(format!("no such group: {group}")),
        other => LinreException::new_err(other.to_string()),
    }
}

/// Compile `pattern`, turning fallback notifications into `UserWarning`s.
fn compile_pattern(
    py: Python<'_>,
    pattern: &Bound<'_, PyAny>,
    flags: u32,
    max_mem: Option<usize>,
) -> PyResult<PyPattern> {
    let source = OwnedSubject::extract(pattern)?;
    let text = source.is_text();

    let mut flags = FlagSet::from_bits(flags).map_err(to_pyerr)?;
    if text {
        flags |= FlagSet::UNICODE;
    }

    let mut options = CompileOptions::default();
    if let Some(max_mem) = max_mem {
        options = options.with_max_memory(max_mem);
    }

    let notifier = Arc::new(RecordingNotifier::default());
    let policy = FallbackPolicy::new(global_policy().mode()).with_notifier(notifier.clone());

    let compiled = py
        .detach(|| PatternCompiler::new(&policy).compile(source.as_bytes(), flags, &options))
        .map_err(to_pyerr)?;

    for event in notifier.events() {
        let msg = CString::new(format!(
            "pattern {:?} uses the backtracking engine: {}",
            event.pattern, event.reason
        ))
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
        PyErr::warn(py, py.get_type::<PyUserWarning>().as_any(), &msg, 2)?;
    }

    Ok(PyPattern::new(compiled, text, pattern.clone().unbind()))
}

/// Resolve a `Pattern` or a pattern source.
fn resolve<'py>(
    py: Python<'py>,
    pattern: &Bound<'py, PyAny>,
    flags: u32,
) -> PyResult<Bound<'py, PyPattern>> {
    resolve_with(py, pattern, flags, None)
}

fn resolve_with<'py>(
    py: Python<'py>,
    pattern: &Bound<'py, PyAny>,
    flags: u32,
    max_mem: Option<usize>,
) -> PyResult<Bound<'py, PyPattern>> {
    if let Ok(compiled) = pattern.cast::<PyPattern>() {
        if flags != 0 {
            return Err(PyValueError::new_err(
                "cannot process flags argument with a compiled pattern",
            ));
        }
        return Ok(compiled.clone());
    }
    Bound::new(py, compile_pattern(py, pattern, flags, max_mem)?)
}

#[pyfunction]
#[pyo3(signature = (pattern, flags=0, max_mem=None))]
fn compile<'py>(
    py: Python<'py>,
    pattern: &Bound<'py, PyAny>,
    flags: u32,
    max_mem: Option<usize>,
) -> PyResult<Bound<'py, PyPattern>> {
    resolve_with(py, pattern, flags, max_mem)
}

#[pyfunction]
#[pyo3(signature = (pattern, string, flags=0))]
fn search<'py>(
    py: Python<'py>,
    pattern: &Bound<'py, PyAny>,
    string: &Bound<'py, PyAny>,
    flags: u32,
) -> PyResult<Option<PyMatch>> {
    PyPattern::search(&resolve(py, pattern, flags)?, string, 0, None)
}

#[pyfunction(name = "match")]
#[pyo3(signature = (pattern, string, flags=0))]
fn match_<'py>(
    py: Python<'py>,
    pattern: &Bound<'py, PyAny>,
    string: &Bound<'py, PyAny>,
    flags: u32,
) -> PyResult<Option<PyMatch>> {
    PyPattern::match_(&resolve(py, pattern, flags)?, string, 0, None)
}

#[pyfunction]
#[pyo3(signature = (pattern, string, flags=0))]
fn fullmatch<'py>(
    py: Python<'py>,
    pattern: &Bound<'py, PyAny>,
    string: &Bound<'py, PyAny>,
    flags: u32,
) -> PyResult<Option<PyMatch>> {
    PyPattern::fullmatch(&resolve(py, pattern, flags)?, string, 0, None)
}

#[pyfunction]
#[pyo3(signature = (pattern, string, flags=0))]
fn findall<'py>(
    py: Python<'py>,
    pattern: &Bound<'py, PyAny>,
    string: &Bound<'py, PyAny>,
    flags: u32,
) -> PyResult<Vec<Bound<'py, PyAny>>> {
    resolve(py, pattern, flags)?.get().findall(py, string, 0, None)
}

#[pyfunction]
#[pyo3(signature = (pattern, string, flags=0))]
fn finditer<'py>(
    py: Python<'py>,
    pattern: &Bound<'py, PyAny>,
    string: &Bound<'py, PyAny>,
    flags: u32,
) -> PyResult<PyMatchIter> {
    PyPattern::finditer(&resolve(py, pattern, flags)?, string, 0, None)
}

#[pyfunction]
#[pyo3(signature = (pattern, string, maxsplit=0, flags=0))]
fn split<'py>(
    py: Python<'py>,
    pattern: &Bound<'py, PyAny>,
    string: &Bound<'py, PyAny>,
    maxsplit: usize,
    flags: u32,
) -> PyResult<Vec<Bound<'py, PyAny>>> {
    resolve(py, pattern, flags)?.get().split(py, string, maxsplit)
}

#[pyfunction]
#[pyo3(signature = (pattern, repl, string, count=0, flags=0))]
fn sub<'py>(
    py: Python<'py>,
    pattern: &Bound<'py, PyAny>,
    repl: &Bound<'py, PyAny>,
    string: &Bound<'py, PyAny>,
    count: usize,
    flags: u32,
) -> PyResult<Bound<'py, PyAny>> {
    PyPattern::sub(&resolve(py, pattern, flags)?, repl, string, count)
}

#[pyfunction]
#[pyo3(signature = (pattern, repl, string, count=0, flags=0))]
fn subn<'py>(
    py: Python<'py>,
    pattern: &Bound<'py, PyAny>,
    repl: &Bound<'py, PyAny>,
    string: &Bound<'py, PyAny>,
    count: usize,
    flags: u32,
) -> PyResult<(Bound<'py, PyAny>, usize)> {
    PyPattern::subn(&resolve(py, pattern, flags)?, repl, string, count)
}

/// Escape every special character of `pattern`.
#[pyfunction]
fn escape<'py>(
    py: Python<'py>,
    pattern: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyAny>> {
    let literal = OwnedSubject::extract(pattern)?;
    to_python(py, literal.is_text(), &linre::escape(literal.as_bytes()))
}

/// Set the process-wide fallback mode; one of the `FALLBACK_*` constants.
#[pyfunction]
fn set_fallback_notification(mode: u8) -> PyResult<()> {
    let mode = FallbackMode::from_code(mode)
        .ok_or_else(|| PyValueError::new_err(format!("unknown fallback mode: {mode}")))?;
    linre::set_fallback_notification(mode);
    Ok(())
}

fn add_flag(
    m: &Bound<'_, PyModule>,
    names: &[&str],
    flag: FlagSet,
) -> PyResult<()> {
    for name in names {
        m.add(*name, flag.bits())?;
    }
    Ok(())
}

#[pymodule]
fn _linre(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = m.py();

    m.add_class::<PyPattern>()?;
    m.add_class::<PyMatch>()?;
    m.add_class::<PyMatchIter>()?;
    m.add("error", py.get_type::<LinreException>())?;

    m.add_function(wrap_pyfunction!(compile, m)?)?;
    m.add_function(wrap_pyfunction!(search, m)?)?;
    m.add_function(wrap_pyfunction!(match_, m)?)?;
    m.add_function(wrap_pyfunction!(fullmatch, m)?)?;
    m.add_function(wrap_pyfunction!(findall, m)?)?;
    m.add_function(wrap_pyfunction!(finditer, m)?)?;
    m.add_function(wrap_pyfunction!(split, m)?)?;
    m.add_function(wrap_pyfunction!(sub, m)?)?;
    m.add_function(wrap_pyfunction!(subn, m)?)?;
    m.add_function(wrap_pyfunction!(escape, m)?)?;
    m.add_function(wrap_pyfunction!(set_fallback_notification, m)?)?;

    add_flag(m, &["IGNORECASE", "I"], FlagSet::IGNORECASE)?;
    add_flag(m, &["MULTILINE", "M"], FlagSet::MULTILINE)?;
    add_flag(m, &["DOTALL", "S"], FlagSet::DOTALL)?;
    add_flag(m, &["UNICODE", "U"], FlagSet::UNICODE)?;
    add_flag(m, &["VERBOSE", "X"], FlagSet::VERBOSE)?;

    m.add("FALLBACK_QUIETLY", FallbackMode::Silent.code())?;
    m.add("FALLBACK_WARNING", FallbackMode::Notify.code())?;
    m.add("FALLBACK_EXCEPTION", FallbackMode::Raise.code())?;
    Ok(())
}
