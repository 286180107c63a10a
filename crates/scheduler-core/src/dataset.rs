//! Dataset CSV loading. Columns: `job_id`, `service_time_ms`,
//! `arrival_time_ms` (optional, default 0), `priority` (optional unless the
//! active discipline is priority, default 1). Extra columns are ignored.

use std::path::Path;

use crate::discipline::Discipline;
use crate::error::ScheduleError;
use crate::job::{Job, JobRecord};

/// Parses the dataset and assigns admission sequence numbers in row order.
/// Does not partition into ready/pending — that's the run engine's job,
/// since it depends on the run's current simulated time (always 0 at
/// admission, but kept separate so this function stays policy-agnostic).
pub fn load_jobs(path: &Path, discipline: Discipline) -> Result<Vec<Job>, ScheduleError> {
    let file = std::fs::File::open(path)
        .map_err(|_| ScheduleError::DatasetNotFound(path.display().to_string()))?;

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| ScheduleError::DatasetInvalid(format!("malformed header row: {e}")))?
        .clone();

    if !headers.iter().any(|h| h == "job_id") || !headers.iter().any(|h| h == "service_time_ms") {
        return Err(ScheduleError::DatasetInvalid(
            "dataset must contain job_id and service_time_ms columns".into(),
        ));
    }
    if discipline == Discipline::Priority && !headers.iter().any(|h| h == "priority") {
        return Err(ScheduleError::DatasetInvalid(
            "priority discipline requires a priority column".into(),
        ));
    }

    let mut jobs = Vec::new();
    let mut seen_ids = std::collections::HashSet::new();
    for (sequence, result) in reader.deserialize::<JobRecord>().enumerate() {
        let record =
            result.map_err(|e| ScheduleError::DatasetInvalid(format!("row {sequence}: {e}")))?;
        if !seen_ids.insert(record.job_id.clone()) {
            return Err(ScheduleError::DatasetInvalid(format!(
                "duplicate job_id: {}",
                record.job_id
            )));
        }
        if record.service_time_ms == 0 {
            return Err(ScheduleError::DatasetInvalid(format!(
                "job {} has non-positive service_time_ms",
                record.job_id
            )));
        }
        jobs.push(Job::new(record, sequence as u64));
    }

    if jobs.is_empty() {
        return Err(ScheduleError::DatasetInvalid("dataset has no rows".into()));
    }

    Ok(jobs)
}
