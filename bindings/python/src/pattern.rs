use std::{cell::RefCell, sync::Arc};

use linre::{CompiledPattern, Found, LRResult, LinreError, MatchResult};
use pyo3::{
    prelude::*,
    types::{PyDict, PyTuple},
};

use crate::{
    match_object::{PyMatch, PyMatchIter},
    subject::{OwnedSubject, to_python, to_python_opt},
    to_pyerr,
};

fn clamp(pos: isize) -> usize {
    pos.max(0) as usize
}

/// Python `Pattern`.
#[pyclass(name = "Pattern", module = "linre", frozen)]
pub(crate) struct PyPattern {
    pub(crate) inner: CompiledPattern,

    /// Was the pattern a `str`?
    pub(crate) text: bool,

    source: Py<PyAny>,
}

impl PyPattern {
    pub(crate) fn new(
        inner: CompiledPattern,
        text: bool,
        source: Py<PyAny>,
    ) -> Self {
        Self {
            inner,
            text,
            source,
        }
    }

    fn subject(
        &self,
        string: &Bound<'_, PyAny>,
    ) -> PyResult<Arc<OwnedSubject>> {
        OwnedSubject::extract_like(string, self.text).map(Arc::new)
    }

    fn single<'py, F>(
        slf: &Bound<'py, Self>,
        string: &Bound<'py, PyAny>,
        search: F,
    ) -> PyResult<Option<PyMatch>>
    where
        F: for<'h> FnOnce(&CompiledPattern, &'h OwnedSubject) -> LRResult<Option<MatchResult<'h>>>
            + Send,
    {
        let py = slf.py();
        let this = slf.get();
        let subject = this.subject(string)?;

        let found = py
            .detach(|| search(&this.inner, &*subject))
            .map_err(to_pyerr)?;

        Ok(found.map(|m| {
            PyMatch::new(
                slf.clone().unbind(),
                string.clone().unbind(),
                subject.clone(),
                &m,
            )
        }))
    }

    fn substitute<'py>(
        slf: &Bound<'py, Self>,
        repl: &Bound<'py, PyAny>,
        string: &Bound<'py, PyAny>,
        count: usize,
    ) -> PyResult<(Bound<'py, PyAny>, usize)> {
        let py = slf.py();
        let this = slf.get();
        let subject = this.subject(string)?;

        let (out, n) = if repl.is_callable() {
            // The callable runs under the interpreter lock; its error is
            // carried out of the substitution and raised as-is.
            let raised: RefCell<Option<PyErr>> = RefCell::new(None);
            let call = |m: &MatchResult<'_>| -> LRResult<Vec<u8>> {
                let result = Bound::new(
                    py,
                    PyMatch::new(
                        slf.clone().unbind(),
                        string.clone().unbind(),
                        subject.clone(),
                        m,
                    ),
                )
                .and_then(|obj| repl.call1((obj,)))
                .and_then(|value| OwnedSubject::extract_like(&value, this.text));
                match result {
                    Ok(value) => Ok(value.into_bytes()),
                    Err(err) => {
                        raised.replace(Some(err));
                        Err(LinreError::Replacement("replacement callable raised".to_string()))
                    }
                }
            };
            let result = this.inner.subn(call, subject.haystack(), count);
            if let Some(err) = raised.take() {
                return Err(err);
            }
            result.map_err(to_pyerr)?
        } else {
            let template = OwnedSubject::extract_like(repl, this.text)?;
            py.detach(|| {
                this.inner
                    .subn(template.as_bytes(), subject.haystack(), count)
            })
            .map_err(to_pyerr)?
        };

        Ok((to_python(py, this.text, &out)?, n))
    }
}

#[pymethods]
impl PyPattern {
    #[pyo3(signature = (string, pos=0, endpos=None))]
    pub(crate) fn search<'py>(
        slf: &Bound<'py, Self>,
        string: &Bound<'py, PyAny>,
        pos: isize,
        endpos: Option<isize>,
    ) -> PyResult<Option<PyMatch>> {
        Self::single(slf, string, move |p, s| {
            p.search(s.haystack(), clamp(pos), endpos.map(clamp))
        })
    }

    #[pyo3(name = "match", signature = (string, pos=0, endpos=None))]
    pub(crate) fn match_<'py>(
        slf: &Bound<'py, Self>,
        string: &Bound<'py, PyAny>,
        pos: isize,
        endpos: Option<isize>,
    ) -> PyResult<Option<PyMatch>> {
        Self::single(slf, string, move |p, s| {
            p.match_at(s.haystack(), clamp(pos), endpos.map(clamp))
        })
    }

    #[pyo3(signature = (string, pos=0, endpos=None))]
    pub(crate) fn fullmatch<'py>(
        slf: &Bound<'py, Self>,
        string: &Bound<'py, PyAny>,
        pos: isize,
        endpos: Option<isize>,
    ) -> PyResult<Option<PyMatch>> {
        Self::single(slf, string, move |p, s| {
            p.fullmatch(s.haystack(), clamp(pos), endpos.map(clamp))
        })
    }

    #[pyo3(signature = (string, pos=0, endpos=None))]
    pub(crate) fn findall<'py>(
        &self,
        py: Python<'py>,
        string: &Bound<'py, PyAny>,
        pos: isize,
        endpos: Option<isize>,
    ) -> PyResult<Vec<Bound<'py, PyAny>>> {
        let subject = self.subject(string)?;
        let found = py
            .detach(|| {
                self.inner
                    .findall_range(subject.haystack(), clamp(pos), endpos.map(clamp))?
                    .collect::<LRResult<Vec<_>>>()
            })
            .map_err(to_pyerr)?;

        found
            .into_iter()
            .map(|item| match item {
                Found::Single(text) => to_python(py, self.text, text),
                Found::Tuple(texts) => {
                    let items = texts
                        .into_iter()
                        .map(|text| to_python(py, self.text, text))
                        .collect::<PyResult<Vec<_>>>()?;
                    Ok(PyTuple::new(py, items)?.into_any())
                }
            })
            .collect()
    }

    #[pyo3(signature = (string, pos=0, endpos=None))]
    pub(crate) fn finditer<'py>(
        slf: &Bound<'py, Self>,
        string: &Bound<'py, PyAny>,
        pos: isize,
        endpos: Option<isize>,
    ) -> PyResult<PyMatchIter> {
        let this = slf.get();
        let subject = this.subject(string)?;
        let cursor = this
            .inner
            .finditer_range(subject.haystack(), clamp(pos), endpos.map(clamp))
            .map_err(to_pyerr)?
            .cursor();
        Ok(PyMatchIter::new(
            slf.clone().unbind(),
            string.clone().unbind(),
            subject,
            cursor,
        ))
    }

    #[pyo3(signature = (string, maxsplit=0))]
    pub(crate) fn split<'py>(
        &self,
        py: Python<'py>,
        string: &Bound<'py, PyAny>,
        maxsplit: usize,
    ) -> PyResult<Vec<Bound<'py, PyAny>>> {
        let subject = self.subject(string)?;
        let pieces = py
            .detach(|| self.inner.split(subject.haystack(), maxsplit))
            .map_err(to_pyerr)?;
        pieces
            .into_iter()
            .map(|piece| to_python_opt(py, self.text, piece, None))
            .collect()
    }

    #[pyo3(signature = (repl, string, count=0))]
    pub(crate) fn sub<'py>(
        slf: &Bound<'py, Self>,
        repl: &Bound<'py, PyAny>,
        string: &Bound<'py, PyAny>,
        count: usize,
    ) -> PyResult<Bound<'py, PyAny>> {
        Ok(Self::substitute(slf, repl, string, count)?.0)
    }

    #[pyo3(signature = (repl, string, count=0))]
    pub(crate) fn subn<'py>(
        slf: &Bound<'py, Self>,
        repl: &Bound<'py, PyAny>,
        string: &Bound<'py, PyAny>,
        count: usize,
    ) -> PyResult<(Bound<'py, PyAny>, usize)> {
        Self::substitute(slf, repl, string, count)
    }

    #[getter]
    fn pattern(
        &self,
        py: Python<'_>,
    ) -> Py<PyAny> {
        self.source.clone_ref(py)
    }

    #[getter]
    fn flags(&self) -> u32 {
        self.inner.flags().bits()
    }

    #[getter]
    fn groups(&self) -> usize {
        self.inner.group_count()
    }

    #[getter]
    fn groupindex<'py>(
        &self,
        py: Python<'py>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        for (name, idx) in self.inner.group_names().iter() {
            dict.set_item(name, idx)?;
        }
        Ok(dict)
    }

    /// Does this pattern run on the backtracking engine?
    #[getter]
    fn is_fallback(&self) -> bool {
        self.inner.is_fallback()
    }

    fn __repr__(
        &self,
        py: Python<'_>,
    ) -> PyResult<String> {
        Ok(format!(
            "linre.compile({}, {:#x})",
            self.source.bind(py).repr()?,
            self.flags()
        ))
    }
}
