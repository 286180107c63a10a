//! The sole bridge between wall-clock and simulated time.

/// Source of wall-clock milliseconds, abstracted so the run engine's timing
/// math can be driven by a deterministic fake in tests instead of the real
/// system clock (the `AtomicU64`-backed clock idiom used elsewhere in this
/// pack for deterministic ordering, e.g. a Lamport clock, adapted here to
/// wall-clock milliseconds rather than logical ticks).
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// `sim_ms(wall_ms) = round((wall_ms - start_wall_ms) * speedup)`.
///
/// `speedup > 1` compresses wall into sim: one wall-millisecond becomes
/// `speedup` simulated milliseconds.
pub fn sim_ms(wall_ms: i64, start_wall_ms: i64, speedup: f64) -> u64 {
    let elapsed_wall = (wall_ms - start_wall_ms) as f64;
    let sim = (elapsed_wall * speedup).round();
    if sim <= 0.0 {
        0
    } else {
        sim as u64
    }
}

/// Inverse mapping, used to compute a bounded wait: how many wall
/// milliseconds until a simulated instant arrives. Floored at 1ms so callers
/// never compute a zero-length (busy) wait.
pub fn wall_ms_until(target_sim_ms: u64, current_sim_ms: u64, speedup: f64) -> u64 {
    if target_sim_ms <= current_sim_ms {
        return 1;
    }
    let delta_sim = (target_sim_ms - current_sim_ms) as f64;
    let wall = (delta_sim / speedup).ceil();
    if wall < 1.0 {
        1
    } else {
        wall as u64
    }
}
