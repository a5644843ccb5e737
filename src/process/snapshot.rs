use chrono::{DateTime, Utc};

/// Lifecycle metadata captured eagerly at start and at observed exit.
///
/// Stored as plain owned values, never read through the live child handle,
/// so the snapshot remains valid after the proxy disposes of the handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSnapshot {
    pub start_time: Option<DateTime<Utc>>,
    pub exit_time: Option<DateTime<Utc>>,
    pub exit_code: Option<i32>,
    pub has_exited: bool,
}

impl ProcessSnapshot {
    pub(crate) fn mark_started(&mut self, at: DateTime<Utc>) {
        self.start_time = Some(at);
    }

    pub(crate) fn mark_exited(&mut self, at: DateTime<Utc>, exit_code: Option<i32>) {
        self.exit_time = Some(at);
        self.exit_code = exit_code;
        self.has_exited = true;
    }
}
