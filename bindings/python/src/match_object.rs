use std::sync::Arc;

use linre::{LRResult, LinreError, MatchResult, compiler::Spans, matching::MatchCursor};
use pyo3::{
    prelude::*,
    types::{PyDict, PyTuple},
};

use crate::{
    pattern::PyPattern,
    subject::{OwnedSubject, to_python, to_python_opt},
    to_pyerr,
};

/// A group argument; an index or a name.
#[derive(Debug, FromPyObject)]
pub(crate) enum GroupArg {
    Index(isize),
    Name(String),
}

impl GroupArg {
    fn resolve(
        &self,
        m: &MatchResult<'_>,
    ) -> LRResult<usize> {
        match self {
            Self::Index(idx) => match usize::try_from(*idx) {
                Ok(idx) => m.group_index(idx),
                Err(_) => Err(LinreError::NoSuchGroup(idx.to_string())),
            },
            Self::Name(name) => m.group_index(name.as_str()),
        }
    }
}

/// Python `Match`; owns a copy of the subject.
#[pyclass(name = "Match", module = "linre", frozen)]
pub(crate) struct PyMatch {
    re: Py<PyPattern>,
    string: Py<PyAny>,
    subject: Arc<OwnedSubject>,
    spans: Spans,
    pos: usize,
    endpos: usize,
    origin: (usize, usize),
}

impl PyMatch {
    pub(crate) fn new(
        re: Py<PyPattern>,
        string: Py<PyAny>,
        subject: Arc<OwnedSubject>,
        m: &MatchResult<'_>,
    ) -> Self {
        Self {
            re,
            string,
            subject,
            spans: m.spans().clone(),
            pos: m.pos(),
            endpos: m.endpos(),
            origin: m.origin(),
        }
    }

    fn result(&self) -> MatchResult<'_> {
        MatchResult::from_spans(
            self.subject.haystack(),
            self.spans.clone(),
            self.re.get().inner.group_names().clone(),
            self.pos,
            self.endpos,
        )
        .with_origin(self.origin)
    }

    fn text(&self) -> bool {
        self.subject.is_text()
    }

    fn group_value<'py>(
        &self,
        py: Python<'py>,
        m: &MatchResult<'_>,
        group: &GroupArg,
    ) -> PyResult<Bound<'py, PyAny>> {
        let idx = group.resolve(m).map_err(to_pyerr)?;
        let text = m.group(idx).map_err(to_pyerr)?;
        to_python_opt(py, self.text(), text, None)
    }

    fn span_of(
        &self,
        group: Option<GroupArg>,
    ) -> PyResult<(isize, isize)> {
        let m = self.result();
        let idx = group
            .unwrap_or(GroupArg::Index(0))
            .resolve(&m)
            .map_err(to_pyerr)?;
        match m.span(idx).map_err(to_pyerr)? {
            Some((start, end)) => Ok((start as isize, end as isize)),
            None => Ok((-1, -1)),
        }
    }
}

#[pymethods]
impl PyMatch {
    #[pyo3(signature = (*groups))]
    fn group<'py>(
        &self,
        py: Python<'py>,
        groups: &Bound<'py, PyTuple>,
    ) -> PyResult<Bound<'py, PyAny>> {
        let m = self.result();
        match groups.len() {
            0 => self.group_value(py, &m, &GroupArg::Index(0)),
            1 => self.group_value(py, &m, &groups.get_item(0)?.extract::<GroupArg>()?),
            _ => {
                let items = groups
                    .iter()
                    .map(|g| self.group_value(py, &m, &g.extract::<GroupArg>()?))
                    .collect::<PyResult<Vec<_>>>()?;
                Ok(PyTuple::new(py, items)?.into_any())
            }
        }
    }

    fn __getitem__<'py>(
        &self,
        py: Python<'py>,
        group: GroupArg,
    ) -> PyResult<Bound<'py, PyAny>> {
        self.group_value(py, &self.result(), &group)
    }

    #[pyo3(signature = (default=None))]
    fn groups<'py>(
        &self,
        py: Python<'py>,
        default: Option<Bound<'py, PyAny>>,
    ) -> PyResult<Bound<'py, PyTuple>> {
        let items = self
            .result()
            .groups()
            .into_iter()
            .map(|g| to_python_opt(py, self.text(), g, default.as_ref()))
            .collect::<PyResult<Vec<_>>>()?;
        PyTuple::new(py, items)
    }

    #[pyo3(signature = (default=None))]
    fn groupdict<'py>(
        &self,
        py: Python<'py>,
        default: Option<Bound<'py, PyAny>>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        for (name, text) in self.result().groupdict() {
            dict.set_item(name, to_python_opt(py, self.text(), text, default.as_ref())?)?;
        }
        Ok(dict)
    }

    #[pyo3(signature = (group=None))]
    fn start(
        &self,
        group: Option<GroupArg>,
    ) -> PyResult<isize> {
        Ok(self.span_of(group)?.0)
    }

    #[pyo3(signature = (group=None))]
    fn end(
        &self,
        group: Option<GroupArg>,
    ) -> PyResult<isize> {
        Ok(self.span_of(group)?.1)
    }

    #[pyo3(signature = (group=None))]
    pub(crate) fn span(
        &self,
        group: Option<GroupArg>,
    ) -> PyResult<(isize, isize)> {
        self.span_of(group)
    }

    fn expand<'py>(
        &self,
        py: Python<'py>,
        template: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyAny>> {
        let template = OwnedSubject::extract_like(template, self.text())?;
        let out = self
            .result()
            .expand(template.as_bytes())
            .map_err(to_pyerr)?;
        to_python(py, self.text(), &out)
    }

    #[getter]
    fn string(
        &self,
        py: Python<'_>,
    ) -> Py<PyAny> {
        self.string.clone_ref(py)
    }

    #[getter]
    fn re(
        &self,
        py: Python<'_>,
    ) -> Py<PyPattern> {
        self.re.clone_ref(py)
    }

    #[getter]
    fn pos(&self) -> usize {
        self.pos
    }

    #[getter]
    fn endpos(&self) -> usize {
        self.endpos
    }

    #[getter]
    fn lastindex(&self) -> Option<usize> {
        self.result().lastindex()
    }

    #[getter]
    fn lastgroup(&self) -> Option<String> {
        self.result().lastgroup().map(str::to_string)
    }

    fn __repr__(
        &self,
        py: Python<'_>,
    ) -> PyResult<String> {
        let (start, end) = self.span_of(None)?;
        let text = self.group_value(py, &self.result(), &GroupArg::Index(0))?;
        Ok(format!(
            "<linre.Match object; span=({start}, {end}), match={}>",
            text.repr()?
        ))
    }
}

/// Python iterator over successive matches.
///
/// Keeps only the resumable cursor between calls.
#[pyclass(name = "MatchIterator", module = "linre")]
pub(crate) struct PyMatchIter {
    re: Py<PyPattern>,
    string: Py<PyAny>,
    subject: Arc<OwnedSubject>,
    cursor: MatchCursor,
}

impl PyMatchIter {
    pub(crate) fn new(
        re: Py<PyPattern>,
        string: Py<PyAny>,
        subject: Arc<OwnedSubject>,
        cursor: MatchCursor,
    ) -> Self {
        Self {
            re,
            string,
            subject,
            cursor,
        }
    }
}

#[pymethods]
impl PyMatchIter {
    fn __iter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    pub(crate) fn __next__(
        &mut self,
        py: Python<'_>,
    ) -> PyResult<Option<PyMatch>> {
        if self.cursor.is_done() {
            return Ok(None);
        }
        let re = self.re.clone_ref(py);
        let subject = self.subject.clone();
        let pattern = &re.get().inner;
        let cursor = self.cursor;

        let (next, cursor) = py.detach(|| {
            let mut matches = pattern.resume(subject.haystack(), cursor);
            (matches.pull_next(), matches.cursor())
        });
        self.cursor = cursor;

        Ok(next.map_err(to_pyerr)?.map(|m| {
            PyMatch::new(
                re.clone_ref(py),
                self.string.clone_ref(py),
                subject.clone(),
                &m,
            )
        }))
    }
}
