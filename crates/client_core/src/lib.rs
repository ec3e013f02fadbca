use chrono::{DateTime, Utc};
use shared::{
    domain::{StudentId, StudentRecord},
    error::{ErrorCode, ValidationError},
    form::RegistrationForm,
};
use storage::{KeyValueStore, StudentStore};
use thiserror::Error;
use tracing::{debug, error, info};

pub mod render;
pub mod status;
pub mod view;

pub use render::{escape_html, render_students};
pub use status::{StatusKind, StatusLine, StatusMessage, STATUS_TTL};
pub use view::{HtmlView, RegistryView};

pub const CLEAR_PROMPT: &str = "Clear all registered students from this browser?";

const REGISTERED: &str = "Student registered successfully ✅";
const REMOVED: &str = "Student removed.";
const CLEARED: &str = "All records cleared.";
const SAVE_FAILED: &str = "Could not save student record.";
const REMOVE_FAILED: &str = "Could not remove student record.";
const CLEAR_FAILED: &str = "Could not clear student records.";

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("storage failure: {0:#}")]
    Storage(anyhow::Error),
}

impl ControllerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(err) => err.code(),
            Self::Storage(_) => ErrorCode::Storage,
        }
    }
}

/// Drives the load, mutate, save, render cycle for every user action.
///
/// Nothing is cached between actions: each operation starts from a fresh
/// `load()` so the view always reflects what storage currently holds.
pub struct RegistrationController<S, V, C = SystemClock> {
    store: StudentStore<S>,
    view: V,
    clock: C,
}

impl<S: KeyValueStore, V: RegistryView> RegistrationController<S, V, SystemClock> {
    pub fn new(store: StudentStore<S>, view: V) -> Self {
        Self::with_clock(store, view, SystemClock)
    }
}

impl<S: KeyValueStore, V: RegistryView, C: Clock> RegistrationController<S, V, C> {
    pub fn with_clock(store: StudentStore<S>, view: V, clock: C) -> Self {
        Self { store, view, clock }
    }

    pub fn store(&self) -> &StudentStore<S> {
        &self.store
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_parts(self) -> (StudentStore<S>, V) {
        (self.store, self.view)
    }

    pub fn students(&self) -> Vec<StudentRecord> {
        self.store.load()
    }

    pub fn refresh(&mut self) {
        let students = self.store.load();
        self.render(&students);
    }

    pub fn submit(&mut self, form: &RegistrationForm) -> Result<StudentRecord, ControllerError> {
        let student = match form.validate() {
            Ok(student) => student,
            Err(err) => {
                debug!(field = err.field(), "rejected registration");
                self.view.show_status(StatusMessage::error(err.to_string()));
                return Err(err.into());
            }
        };

        let mut students = self.store.load();
        let record = student.into_record(self.clock.now());
        students.push(record.clone());
        self.persist(&students, SAVE_FAILED)?;

        info!(id = %record.id, count = students.len(), "registered student");
        self.view.reset_form();
        self.view.show_status(StatusMessage::success(REGISTERED));
        self.render(&students);
        Ok(record)
    }

    /// Removes the record with `id`. An id that is no longer present is a
    /// silent no-op.
    pub fn remove(&mut self, id: StudentId) -> Result<Option<StudentRecord>, ControllerError> {
        let students = self.store.load();
        match students.iter().position(|student| student.id == id) {
            Some(position) => self.remove_loaded(students, position),
            None => {
                debug!(%id, "remove ignored, no such student");
                Ok(None)
            }
        }
    }

    /// Removes by render position, checked against the current load. Negative
    /// or out-of-range positions are a silent no-op.
    pub fn remove_at(&mut self, position: i64) -> Result<Option<StudentRecord>, ControllerError> {
        let students = self.store.load();
        match usize::try_from(position)
            .ok()
            .filter(|position| *position < students.len())
        {
            Some(position) => self.remove_loaded(students, position),
            None => {
                debug!(
                    position,
                    count = students.len(),
                    "remove ignored, position out of range"
                );
                Ok(None)
            }
        }
    }

    /// Returns `Ok(false)` when the user declines the confirmation.
    pub fn clear_all(&mut self) -> Result<bool, ControllerError> {
        if !self.view.confirm(CLEAR_PROMPT) {
            debug!("clear declined");
            return Ok(false);
        }

        if let Err(err) = self.store.clear() {
            error!("failed to clear student registry: {err:#}");
            self.view.show_status(StatusMessage::error(CLEAR_FAILED));
            return Err(ControllerError::Storage(err));
        }

        self.render(&[]);
        self.view.show_status(StatusMessage::success(CLEARED));
        Ok(true)
    }

    fn remove_loaded(
        &mut self,
        mut students: Vec<StudentRecord>,
        position: usize,
    ) -> Result<Option<StudentRecord>, ControllerError> {
        let removed = students.remove(position);
        self.persist(&students, REMOVE_FAILED)?;

        info!(id = %removed.id, count = students.len(), "removed student");
        self.render(&students);
        self.view.show_status(StatusMessage::success(REMOVED));
        Ok(Some(removed))
    }

    fn persist(
        &mut self,
        students: &[StudentRecord],
        failure: &str,
    ) -> Result<(), ControllerError> {
        self.store.save(students).map_err(|err| {
            error!("failed to persist student registry: {err:#}");
            self.view.show_status(StatusMessage::error(failure));
            ControllerError::Storage(err)
        })
    }

    fn render(&mut self, students: &[StudentRecord]) {
        debug!(count = students.len(), "rendering student list");
        self.view.render_list(&render_students(students));
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
