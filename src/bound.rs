//! Values a widget edits in place: editbox text, slider numbers, checkboxes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Parse/format/compare capability of an editable value.
pub trait BoundValue: Send + 'static {
    fn format(&self) -> String;

    /// Parses `text` into `self`. Returns false and leaves `self` untouched
    /// when the text is not a valid value.
    fn parse_from(&mut self, text: &str) -> bool;

    /// `text` would parse to the current value.
    fn matches(&self, text: &str) -> bool {
        self.format() == text.trim()
    }
}

impl BoundValue for String {
    fn format(&self) -> String {
        self.clone()
    }

    fn parse_from(&mut self, text: &str) -> bool {
        text.clone_into(self);
        true
    }

    fn matches(&self, text: &str) -> bool {
        self == text
    }
}

impl BoundValue for i64 {
    fn format(&self) -> String {
        self.to_string()
    }

    fn parse_from(&mut self, text: &str) -> bool {
        match text.trim().parse() {
            Ok(v) => {
                *self = v;
                true
            }
            Err(_) => false,
        }
    }
}

impl BoundValue for f64 {
    fn format(&self) -> String {
        // Shortest form that reads back to the same value.
        let s = format!("{self}");
        if s.contains('.') || s.contains('e') || !self.is_finite() {
            s
        } else {
            format!("{s}.0")
        }
    }

    fn parse_from(&mut self, text: &str) -> bool {
        match text.trim().replace(',', ".").parse::<f64>() {
            Ok(v) if v.is_finite() => {
                *self = v;
                true
            }
            _ => false,
        }
    }

    fn matches(&self, text: &str) -> bool {
        let mut candidate = *self;
        candidate.parse_from(text) && candidate == *self
    }
}

impl BoundValue for bool {
    fn format(&self) -> String {
        self.to_string()
    }

    fn parse_from(&mut self, text: &str) -> bool {
        match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => *self = true,
            "false" | "0" | "no" | "off" => *self = false,
            _ => return false,
        }
        true
    }
}

/// Shared handle to an application value. Jobs may hold clones and update
/// the value from their own thread.
#[derive(Debug, Default)]
pub struct Bound<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for Bound<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: BoundValue> Bound<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, value: T) {
        *self.lock() = value;
    }

    pub fn format(&self) -> String {
        self.lock().format()
    }

    pub fn parse_from(&self, text: &str) -> bool {
        self.lock().parse_from(text)
    }

    pub fn matches(&self, text: &str) -> bool {
        self.lock().matches(text)
    }
}

impl<T: BoundValue + Clone> Bound<T> {
    pub fn get(&self) -> T {
        self.lock().clone()
    }
}

/// Type-erased editbox binding.
pub type DynBound = Arc<Mutex<dyn BoundValue>>;

/// Erases the value type so one editbox implementation serves every kind.
pub fn erase<T: BoundValue>(bound: &Bound<T>) -> DynBound {
    bound.inner.clone()
}

pub fn format_dyn(bound: &DynBound) -> String {
    bound.lock().unwrap_or_else(PoisonError::into_inner).format()
}

pub fn parse_dyn(bound: &DynBound, text: &str) -> bool {
    bound.lock().unwrap_or_else(PoisonError::into_inner).parse_from(text)
}
