use crate::{JobId, StatusCode};

/// Working set of job ids whose last known status is non-terminal.
///
/// Ids are inserted once, when the job list is first loaded, and afterwards
/// only removed. Iteration follows seeding order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobRegistry {
    in_flight: Vec<JobId>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every non-terminal job and returns the ids of the terminal ones,
    /// which need a single status/log refresh instead of polling.
    pub fn seed<'a, I>(&mut self, jobs: I) -> Vec<JobId>
    where
        I: IntoIterator<Item = (&'a str, &'a StatusCode)>,
    {
        let mut backfill = Vec::new();
        for (job_id, status) in jobs {
            if status.is_terminal() {
                backfill.push(job_id.to_string());
            } else if !self.contains(job_id) {
                self.in_flight.push(job_id.to_string());
            }
        }
        backfill
    }

    /// Removes `job_id`; returns whether it was present.
    pub fn mark_terminal(&mut self, job_id: &str) -> bool {
        let before = self.in_flight.len();
        self.in_flight.retain(|id| id != job_id);
        before != self.in_flight.len()
    }

    pub fn snapshot(&self) -> Vec<JobId> {
        self.in_flight.clone()
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.in_flight.iter().any(|id| id == job_id)
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}
