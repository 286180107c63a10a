//! The production `Clock` — real wall-clock milliseconds via `chrono`, the
//! teacher's time-handling crate throughout `sem_os_core`/`sem_os_server`.

use scheduler_core::Clock;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
