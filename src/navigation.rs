//! Shared navigation handle.
//!
//! Pages and effect handlers push locations here instead of driving a view
//! layer directly; whatever front end is attached reads `current()`.

use parking_lot::Mutex;
use tracing::debug;

pub mod routes {
    pub const HOME: &str = "/";
    pub const LOGIN: &str = "/login";

    pub fn student_edit(id: i64) -> String {
        format!("/student/{}/edit", id)
    }
}

#[derive(Debug)]
pub struct Navigator {
    history: Mutex<Vec<String>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            history: Mutex::new(vec![routes::HOME.to_string()]),
        }
    }

    pub fn push(&self, location: impl Into<String>) {
        let location = location.into();
        debug!(%location, "Navigating");
        self.history.lock().push(location);
    }

    pub fn current(&self) -> String {
        self.history
            .lock()
            .last()
            .cloned()
            .unwrap_or_else(|| routes::HOME.to_string())
    }

    pub fn len(&self) -> usize {
        self.history.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_home() {
        let nav = Navigator::new();
        assert_eq!(nav.current(), "/");
        assert_eq!(nav.len(), 1);
    }

    #[test]
    fn test_push_keeps_history() {
        let nav = Navigator::new();
        nav.push(routes::LOGIN);
        nav.push(routes::student_edit(3));
        assert_eq!(nav.current(), "/student/3/edit");
        assert_eq!(nav.len(), 3);
        assert!(!nav.is_empty());
    }
}
