//! Hosting shell ports: page navigation and status rendering

use std::time::Duration;

use crate::domain::{Page, StatusMessage};

/// Page switching, owned by whatever hosts the pages
pub trait Navigator: Send + Sync {
    /// Go to `page` once `delay` has passed (zero means now)
    fn navigate(&self, page: Page, delay: Duration);
}

/// The region of a page that displays status messages
pub trait StatusView: Send + Sync {
    fn render(&self, message: &StatusMessage);

    fn clear(&self);
}
