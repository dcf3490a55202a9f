//! Driven port for navigation side effects issued by route guards.

use std::sync::Mutex;

use crate::domain::Route;

/// Performs a navigation to a route.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// Navigate to `route`, replacing the current view.
    fn navigate(&self, route: Route);
}

/// Navigator that records every requested route in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes navigated to so far.
    pub fn visited(&self) -> Vec<Route> {
        self.visited
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Most recent navigation, if any.
    pub fn last(&self) -> Option<Route> {
        self.visited().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.visited
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(route);
    }
}

impl<N: Navigator + ?Sized> Navigator for std::sync::Arc<N> {
    fn navigate(&self, route: Route) {
        (**self).navigate(route);
    }
}

impl<N: Navigator + ?Sized> Navigator for &N {
    fn navigate(&self, route: Route) {
        (**self).navigate(route);
    }
}
