use crate::messages::Progress;

/// Destination for operator-facing progress lines.
///
/// Called from the session loop once per notification, so implementations
/// must return promptly.
pub trait Reporter: Send {
    fn report(&mut self, event: Progress);
}

/// Prints each progress line to stdout
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: Progress) {
        tracing::debug!(?event, "progress");
        println!("{}", event);
    }
}

/// Collects events in memory, in the order they were reported
impl Reporter for Vec<Progress> {
    fn report(&mut self, event: Progress) {
        self.push(event);
    }
}
