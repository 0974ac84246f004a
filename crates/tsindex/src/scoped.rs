//! Scoped ownership with a custom release action.

use std::fmt;
use std::ops::Deref;

/// Owns a value and runs `release` on it when dropped, on every exit path
/// (normal return, `?` early return, panic unwinding).
///
/// [`dismiss`](Scoped::dismiss) hands the value back without running the
/// release action, which is how a caller "commits" a resource it no longer
/// wants cleaned up.
///
/// ```
/// use tsindex::Scoped;
/// use std::cell::Cell;
///
/// let released = Cell::new(false);
/// {
///     let _guard = Scoped::new(7, |_| released.set(true));
/// }
/// assert!(released.get());
/// ```
pub struct Scoped<T, F: FnOnce(T)> {
    inner: Option<(T, F)>,
}

impl<T, F: FnOnce(T)> Scoped<T, F> {
    pub fn new(value: T, release: F) -> Self {
        Self {
            inner: Some((value, release)),
        }
    }

    /// Returns the value without releasing it.
    pub fn dismiss(mut self) -> T {
        match self.inner.take() {
            Some((value, _release)) => value,
            None => unreachable!("Scoped value is only taken by dismiss or drop"),
        }
    }

    pub fn get(&self) -> &T {
        match &self.inner {
            Some((value, _)) => value,
            None => unreachable!("Scoped value is only taken by dismiss or drop"),
        }
    }

    pub fn get_mut(&mut self) -> &mut T {
        match &mut self.inner {
            Some((value, _)) => value,
            None => unreachable!("Scoped value is only taken by dismiss or drop"),
        }
    }
}

impl<T, F: FnOnce(T)> Deref for Scoped<T, F> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T, F: FnOnce(T)> Drop for Scoped<T, F> {
    fn drop(&mut self) {
        if let Some((value, release)) = self.inner.take() {
            release(value);
        }
    }
}

impl<T: fmt::Debug, F: FnOnce(T)> fmt::Debug for Scoped<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Scoped").field(self.get()).finish()
    }
}
