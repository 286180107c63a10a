//! Worker registry: tracks live workers and their core counts. Independent
//! of the run engine's lock — registry reads/writes never block on a run's
//! condition variable.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use scheduler_core::ScheduleError;

#[derive(Debug, Clone)]
struct WorkerEntry {
    cores: u32,
    last_seen: Instant,
}

pub struct WorkerRegistry {
    timeout: Duration,
    workers: Mutex<HashMap<String, WorkerEntry>>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct WorkerSummary {
    pub worker_id: String,
    pub cores: u32,
}

impl WorkerRegistry {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            workers: Mutex::new(HashMap::new()),
        }
    }

    /// Upsert — unknown workers are onboarded implicitly.
    pub fn register(&self, worker_id: &str, cores: u32) {
        let mut workers = self.workers.lock().unwrap();
        workers.insert(
            worker_id.to_string(),
            WorkerEntry {
                cores,
                last_seen: Instant::now(),
            },
        );
    }

    /// Refreshes `last_seen` only if the worker is already known. Returns
    /// whether it was recognized.
    pub fn heartbeat(&self, worker_id: &str) -> bool {
        let mut workers = self.workers.lock().unwrap();
        match workers.get_mut(worker_id) {
            Some(entry) => {
                entry.last_seen = Instant::now();
                true
            }
            None => false,
        }
    }

    /// `(worker, core)` is valid iff the worker is alive and the core index
    /// is in range.
    pub fn is_alive(&self, worker_id: &str, core_id: u32) -> bool {
        let workers = self.workers.lock().unwrap();
        match workers.get(worker_id) {
            Some(entry) => entry.last_seen.elapsed() <= self.timeout && core_id < entry.cores,
            None => false,
        }
    }

    /// Authorizes a per-core request, distinguishing *why* it was rejected
    /// so handlers can surface the right client error (`spec.md` §7): a
    /// worker that was never registered, or whose heartbeat has lapsed past
    /// `WORKER_TIMEOUT_SEC`, is `UnknownWorker`; a worker that's alive but
    /// whose `core_id` is out of range for its registered core count is
    /// `InvalidCore`.
    pub fn check_alive(&self, worker_id: &str, core_id: u32) -> Result<(), ScheduleError> {
        let workers = self.workers.lock().unwrap();
        match workers.get(worker_id) {
            None => Err(ScheduleError::UnknownWorker(worker_id.to_string())),
            Some(entry) if entry.last_seen.elapsed() > self.timeout => {
                Err(ScheduleError::UnknownWorker(worker_id.to_string()))
            }
            Some(entry) if core_id >= entry.cores => Err(ScheduleError::InvalidCore {
                worker_id: worker_id.to_string(),
                core_id,
            }),
            Some(_) => Ok(()),
        }
    }

    pub fn total_alive_slots(&self) -> u32 {
        let workers = self.workers.lock().unwrap();
        workers
            .values()
            .filter(|e| e.last_seen.elapsed() <= self.timeout)
            .map(|e| e.cores)
            .sum()
    }

    pub fn list_alive(&self) -> Vec<WorkerSummary> {
        let workers = self.workers.lock().unwrap();
        let mut alive: Vec<WorkerSummary> = workers
            .iter()
            .filter(|(_, e)| e.last_seen.elapsed() <= self.timeout)
            .map(|(id, e)| WorkerSummary {
                worker_id: id.clone(),
                cores: e.cores,
            })
            .collect();
        alive.sort_by(|a, b| a.worker_id.cmp(&b.worker_id));
        alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_alive() {
        let reg = WorkerRegistry::new(Duration::from_secs(10));
        reg.register("w1", 4);
        assert!(reg.is_alive("w1", 0));
        assert!(reg.is_alive("w1", 3));
        assert!(!reg.is_alive("w1", 4));
        assert_eq!(reg.total_alive_slots(), 4);
    }

    #[test]
    fn unknown_worker_is_not_alive_and_heartbeat_rejected() {
        let reg = WorkerRegistry::new(Duration::from_secs(10));
        assert!(!reg.is_alive("ghost", 0));
        assert!(!reg.heartbeat("ghost"));
    }

    #[test]
    fn dead_worker_excluded_from_totals_and_listing() {
        let reg = WorkerRegistry::new(Duration::from_millis(1));
        reg.register("w1", 2);
        std::thread::sleep(Duration::from_millis(5));
        assert!(!reg.is_alive("w1", 0));
        assert_eq!(reg.total_alive_slots(), 0);
        assert!(reg.list_alive().is_empty());
    }

    #[test]
    fn heartbeat_refreshes_liveness() {
        let reg = WorkerRegistry::new(Duration::from_millis(20));
        reg.register("w1", 1);
        std::thread::sleep(Duration::from_millis(10));
        assert!(reg.heartbeat("w1"));
        std::thread::sleep(Duration::from_millis(15));
        // still within 20ms of the heartbeat refresh
        assert!(reg.is_alive("w1", 0));
    }

    #[test]
    fn check_alive_reports_unknown_worker_for_never_registered() {
        let reg = WorkerRegistry::new(Duration::from_secs(10));
        let err = reg.check_alive("ghost", 0).unwrap_err();
        assert!(matches!(err, ScheduleError::UnknownWorker(id) if id == "ghost"));
    }

    #[test]
    fn check_alive_reports_unknown_worker_once_timed_out() {
        let reg = WorkerRegistry::new(Duration::from_millis(1));
        reg.register("w1", 2);
        std::thread::sleep(Duration::from_millis(5));
        let err = reg.check_alive("w1", 0).unwrap_err();
        assert!(matches!(err, ScheduleError::UnknownWorker(id) if id == "w1"));
    }

    #[test]
    fn check_alive_reports_invalid_core_for_alive_worker_out_of_range() {
        let reg = WorkerRegistry::new(Duration::from_secs(10));
        reg.register("w1", 2);
        assert!(reg.check_alive("w1", 1).is_ok());
        let err = reg.check_alive("w1", 2).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InvalidCore { worker_id, core_id } if worker_id == "w1" && core_id == 2
        ));
    }
}
