//! The run engine: owns the current run, the single `run_lock`/`run_cv`
//! pair the whole dispatch protocol serializes through (`spec.md` §5).
//!
//! `std::sync::{Mutex, Condvar}` rather than an async primitive — `/next`'s
//! wait is a genuine "sleep until woken or timeout" over shared mutable
//! state, the textbook condvar use case. Callers that might block
//! (`/next`) run on a blocking thread via `tokio::task::spawn_blocking`,
//! the same way the teacher moves blocking work off the async executor.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use scheduler_core::csv_output::{self, Artifacts};
use scheduler_core::dataset;
use scheduler_core::discipline::Discipline;
use scheduler_core::job::Job;
use scheduler_core::metrics::{self, Summary};
use scheduler_core::policy::{Policy, ReadyKey};
use scheduler_core::time::{sim_ms, wall_ms_until};
use scheduler_core::{Clock, ScheduleError};

use crate::registry::WorkerRegistry;

pub struct StartRequest {
    pub dataset_file: String,
    pub speedup: f64,
    pub min_slots: u32,
    pub quantum_ms: Option<u64>,
    pub discipline: Discipline,
}

pub struct DispatchInfo {
    pub job_id: String,
    pub execution_ms: Option<u64>,
    pub slice_ms: Option<u64>,
    /// RR only: the job's remaining work *before* this slice, so the worker
    /// can self-report `remaining_after_ms = remaining_ms - ran_ms` on
    /// `/done` without the engine having to trust a value it never handed
    /// out (mirrors `remaining_before_ms` in the original dispatch payload).
    pub remaining_ms: Option<u64>,
    pub priority: Option<i64>,
    pub arrival_ms: u64,
}

pub enum NextOutcome {
    Ok(DispatchInfo),
    Wait,
    NoRun,
    Done,
}

pub struct DoneReport {
    pub worker_id: String,
    pub core_id: u32,
    pub job_id: String,
    pub started_wall_ms: i64,
    pub finished_wall_ms: i64,
    pub remaining_after_ms: Option<u64>,
    pub cpu_percent: Option<f64>,
    pub memory_mb: Option<f64>,
}

pub enum DoneOutcome {
    Ok,
    NoRun,
    Done,
}

pub enum StatusOutcome {
    NoRun,
    Running {
        completed: usize,
        total: usize,
        ready_len: usize,
        pending_len: usize,
    },
    Done {
        run_id: String,
        summary: Summary,
        jobs_csv: Option<PathBuf>,
        run_csv: Option<PathBuf>,
    },
}

/// One in-flight dispatch, tracked so a job can be recovered if the
/// (worker, core) that holds it dies before `/done` (`spec.md` §9, recovery
/// strategy (a)).
struct InFlight {
    job_id: String,
}

struct RunInner {
    run_id: String,
    dataset_file: String,
    speedup: f64,
    start_wall_ms: i64,
    discipline: Discipline,
    quantum_ms: Option<u64>,

    jobs: HashMap<String, Job>,
    ready: Box<dyn Policy>,
    /// Sorted ascending by (arrival_ms, sequence); front is the next to
    /// promote.
    pending: VecDeque<String>,
    current_sim_ms: u64,

    total_jobs: usize,
    completed: usize,
    done: bool,
    summary: Option<Summary>,
    artifacts: Option<Artifacts>,

    in_flight: HashMap<(String, u32), InFlight>,
}

impl RunInner {
    fn promote_ready(&mut self, now_sim: u64) -> usize {
        let mut promoted = 0;
        while let Some(job_id) = self.pending.front() {
            let arrival = self.jobs.get(job_id).map(|j| j.arrival_ms).unwrap_or(0);
            if arrival > now_sim {
                break;
            }
            let job_id = self.pending.pop_front().unwrap();
            if let Some(job) = self.jobs.get(&job_id) {
                self.ready.push(ReadyKey::from(job));
            }
            promoted += 1;
        }
        promoted
    }

    fn next_pending_arrival(&self) -> Option<u64> {
        self.pending
            .front()
            .and_then(|id| self.jobs.get(id))
            .map(|j| j.arrival_ms)
    }
}

pub struct RunEngine {
    data_dir: PathBuf,
    results_dir: PathBuf,
    clock: Arc<dyn Clock>,
    state: Mutex<Option<RunInner>>,
    cv: Condvar,
}

impl RunEngine {
    pub fn new(data_dir: PathBuf, results_dir: PathBuf, clock: Arc<dyn Clock>) -> Self {
        Self {
            data_dir,
            results_dir,
            clock,
            state: Mutex::new(None),
            cv: Condvar::new(),
        }
    }

    /// The active (or most recently finalized) run's simulated-time anchor.
    /// Diagnostic accessor — also lets tests compute exact wall timestamps
    /// for a given simulated instant without guessing at real elapsed time.
    pub fn start_wall_ms(&self) -> Option<i64> {
        self.state.lock().unwrap().as_ref().map(|i| i.start_wall_ms)
    }

    /// Admits a new run, replacing any previous one (`spec.md` §3: "a new
    /// `/start` while a run is in progress... replace previous run").
    pub fn start(&self, req: StartRequest, total_alive_slots: u32) -> Result<String, ScheduleError> {
        if total_alive_slots < req.min_slots {
            return Err(ScheduleError::InsufficientSlots {
                needed: req.min_slots,
                available: total_alive_slots,
            });
        }

        let dataset_path = self.data_dir.join(&req.dataset_file);
        let jobs_vec = dataset::load_jobs(&dataset_path, req.discipline)?;

        let run_id = new_run_id();
        let start_wall_ms = self.clock.now_ms();

        let mut ready = req.discipline.build_policy(req.quantum_ms);
        let mut jobs = HashMap::new();
        let mut pending_ids: Vec<String> = Vec::new();

        for job in jobs_vec {
            if job.arrival_ms == 0 {
                ready.push(ReadyKey::from(&job));
            } else {
                pending_ids.push(job.job_id.clone());
            }
            jobs.insert(job.job_id.clone(), job);
        }
        pending_ids.sort_by_key(|id| {
            let j = &jobs[id];
            (j.arrival_ms, j.sequence)
        });

        let total_jobs = jobs.len();
        let inner = RunInner {
            run_id: run_id.clone(),
            dataset_file: req.dataset_file,
            speedup: req.speedup,
            start_wall_ms,
            discipline: req.discipline,
            quantum_ms: req.quantum_ms,
            jobs,
            ready,
            pending: pending_ids.into(),
            current_sim_ms: 0,
            total_jobs,
            completed: 0,
            done: false,
            summary: None,
            artifacts: None,
            in_flight: HashMap::new(),
        };

        let mut state = self.state.lock().unwrap();
        *state = Some(inner);
        drop(state);
        self.cv.notify_all();

        Ok(run_id)
    }

    /// Blocking long-poll. Must be called off the async executor
    /// (`tokio::task::spawn_blocking`).
    pub fn next(&self, worker_id: &str, core_id: u32, timeout_ms: u64) -> NextOutcome {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        let mut state = self.state.lock().unwrap();

        loop {
            let inner = match state.as_mut() {
                None => return NextOutcome::NoRun,
                Some(inner) => inner,
            };
            if inner.done || inner.completed >= inner.total_jobs {
                return NextOutcome::Done;
            }

            let now_sim = sim_ms(self.clock.now_ms(), inner.start_wall_ms, inner.speedup);
            if now_sim > inner.current_sim_ms {
                inner.current_sim_ms = now_sim;
            }
            inner.promote_ready(inner.current_sim_ms);

            if !inner.ready.is_empty() {
                let key = inner.ready.pop_one().expect("checked non-empty above");
                let job = inner
                    .jobs
                    .get(&key.job_id)
                    .expect("ready key must reference a known job");

                let (execution_ms, slice_ms, remaining_ms) = match inner.ready.quantum_ms() {
                    Some(quantum) => (None, Some(quantum.min(job.remaining_ms)), Some(job.remaining_ms)),
                    None => (Some(job.service_ms), None, None),
                };
                let info = DispatchInfo {
                    job_id: key.job_id.clone(),
                    execution_ms,
                    slice_ms,
                    remaining_ms,
                    priority: Some(job.priority),
                    arrival_ms: job.arrival_ms,
                };
                inner.in_flight.insert(
                    (worker_id.to_string(), core_id),
                    InFlight {
                        job_id: key.job_id,
                    },
                );
                return NextOutcome::Ok(info);
            }

            let now = Instant::now();
            if now >= deadline {
                return NextOutcome::Wait;
            }
            let remaining_caller = deadline - now;
            let remaining_arrival = inner
                .next_pending_arrival()
                .map(|arrival| {
                    Duration::from_millis(wall_ms_until(
                        arrival,
                        inner.current_sim_ms,
                        inner.speedup,
                    ))
                })
                .unwrap_or(remaining_caller);
            let wait_for = remaining_caller.min(remaining_arrival);

            let (guard, timeout_result) = self.cv.wait_timeout(state, wait_for).unwrap();
            state = guard;
            let _ = timeout_result;
            // loop back around: re-check deadline/state regardless of
            // whether we woke due to signal or timeout.
        }
    }

    pub fn done(
        &self,
        report: DoneReport,
        total_alive_slots: u32,
        results_dir_override: Option<&Path>,
    ) -> Result<DoneOutcome, ScheduleError> {
        let mut state = self.state.lock().unwrap();
        let inner = match state.as_mut() {
            None => return Ok(DoneOutcome::NoRun),
            Some(inner) => inner,
        };
        if inner.done {
            return Ok(DoneOutcome::Done);
        }

        inner
            .in_flight
            .remove(&(report.worker_id.clone(), report.core_id));

        let round_robin = inner.discipline.is_round_robin();
        let start_wall_ms = inner.start_wall_ms;
        let speedup = inner.speedup;

        let job = match inner.jobs.get_mut(&report.job_id) {
            Some(job) => job,
            None => return Err(ScheduleError::UnknownJob(report.job_id)),
        };

        if job.is_complete() {
            // Replay of an already-finished job/slice: tolerate rather than
            // double-count completion, per the dispatch protocol's
            // undefined-but-must-not-crash replay note (`spec.md` §4.3).
            return Ok(DoneOutcome::Ok);
        }

        let start_sim = sim_ms(report.started_wall_ms, start_wall_ms, speedup);
        if job.start_ms.is_none() {
            job.start_ms = Some(start_sim);
        }
        job.cpu_percent = report.cpu_percent.or(job.cpu_percent);
        job.memory_mb = report.memory_mb.or(job.memory_mb);

        let mut just_finished = false;
        let new_current_sim;

        if round_robin {
            let finish_sim = sim_ms(report.finished_wall_ms, start_wall_ms, speedup);
            let remaining_after = report.remaining_after_ms.unwrap_or(0);
            job.remaining_ms = remaining_after;
            job.slices += 1;
            if job.remaining_ms == 0 {
                job.finish_ms = Some(finish_sim);
                just_finished = true;
            } else {
                job.preemptions += 1;
                let key = ReadyKey::from(&*job);
                inner.ready.push(key);
            }
            new_current_sim = finish_sim;
        } else {
            let finish_sim = job.start_ms.unwrap() + job.service_ms;
            job.finish_ms = Some(finish_sim);
            just_finished = true;
            new_current_sim = finish_sim;
        }

        if new_current_sim > inner.current_sim_ms {
            inner.current_sim_ms = new_current_sim;
        }

        if just_finished {
            inner.completed += 1;
        }

        if inner.completed >= inner.total_jobs {
            self.finalize(
                inner,
                results_dir_override.unwrap_or(&self.results_dir),
                total_alive_slots,
            );
            drop(state);
            self.cv.notify_all();
        } else {
            // A single new ready slot (RR re-queue) — at most one waiter
            // can consume it.
            drop(state);
            self.cv.notify_one();
        }

        Ok(DoneOutcome::Ok)
    }

    fn finalize(&self, inner: &mut RunInner, results_dir: &Path, total_alive_slots: u32) {
        inner.done = true;
        let jobs: Vec<Job> = inner.jobs.values().cloned().collect();
        let summary = metrics::summarize(&jobs, inner.discipline.is_round_robin());

        match csv_output::write_artifacts(
            results_dir,
            &inner.run_id,
            &inner.dataset_file,
            inner.speedup,
            inner.discipline,
            inner.quantum_ms,
            &jobs,
            &summary,
            total_alive_slots,
        ) {
            Ok(artifacts) => inner.artifacts = Some(artifacts),
            Err(e) => {
                tracing::error!(run_id = %inner.run_id, error = %e, "failed to write result CSVs");
            }
        }
        inner.summary = Some(summary);
    }

    /// A snapshot of every job's current timing state, keyed by nothing in
    /// particular — callers sort as needed. Used by tests asserting the
    /// per-job invariants in `spec.md` §8, and available generally as a
    /// debugging aid alongside `/status`'s aggregate view.
    pub fn jobs_snapshot(&self) -> Vec<Job> {
        match self.state.lock().unwrap().as_ref() {
            Some(inner) => inner.jobs.values().cloned().collect(),
            None => Vec::new(),
        }
    }

    pub fn status(&self) -> StatusOutcome {
        let state = self.state.lock().unwrap();
        match state.as_ref() {
            None => StatusOutcome::NoRun,
            Some(inner) if inner.done => StatusOutcome::Done {
                run_id: inner.run_id.clone(),
                summary: inner.summary.clone().expect("done implies summary"),
                jobs_csv: inner.artifacts.as_ref().map(|a| a.jobs_csv.clone()),
                run_csv: inner.artifacts.as_ref().map(|a| a.run_csv.clone()),
            },
            Some(inner) => StatusOutcome::Running {
                completed: inner.completed,
                total: inner.total_jobs,
                ready_len: inner.ready.len(),
                pending_len: inner.pending.len(),
            },
        }
    }

    /// Promotes any arrivals whose simulated time has come. Called by the
    /// background promotion task (~every 10ms) and opportunistically by
    /// `/next`/`/done` so arrival latency stays bounded even if the
    /// background task is descheduled (`spec.md` §4.2.2).
    pub fn promote_arrivals(&self) -> usize {
        let mut state = self.state.lock().unwrap();
        let inner = match state.as_mut() {
            Some(inner) if !inner.done => inner,
            _ => return 0,
        };
        let now_sim = sim_ms(self.clock.now_ms(), inner.start_wall_ms, inner.speedup);
        if now_sim > inner.current_sim_ms {
            inner.current_sim_ms = now_sim;
        }
        let promoted = inner.promote_ready(inner.current_sim_ms);
        drop(state);
        if promoted > 0 {
            self.cv.notify_all();
        }
        promoted
    }

    /// Returns any in-flight job whose (worker, core) is no longer alive to
    /// the ready set (`spec.md` §9, recovery strategy (a)).
    pub fn reclaim_lost(&self, registry: &WorkerRegistry) -> usize {
        let mut state = self.state.lock().unwrap();
        let inner = match state.as_mut() {
            Some(inner) if !inner.done => inner,
            _ => return 0,
        };

        let dead: Vec<(String, u32)> = inner
            .in_flight
            .keys()
            .filter(|(worker_id, core_id)| !registry.is_alive(worker_id, *core_id))
            .cloned()
            .collect();

        let mut reclaimed = 0;
        for key in dead {
            if let Some(flight) = inner.in_flight.remove(&key) {
                if let Some(job) = inner.jobs.get(&flight.job_id) {
                    if !job.is_complete() {
                        inner.ready.push(ReadyKey::from(job));
                        reclaimed += 1;
                        tracing::warn!(
                            worker_id = %key.0,
                            core_id = key.1,
                            job_id = %flight.job_id,
                            "reclaiming job from dead worker"
                        );
                    }
                }
            }
        }
        drop(state);
        if reclaimed > 0 {
            self.cv.notify_all();
        }
        reclaimed
    }
}

fn new_run_id() -> String {
    // 10 hex characters, per spec.md §3.
    let bytes: [u8; 5] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

