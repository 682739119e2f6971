// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CPU pinning for the benchmark thread.
//!
//! Keeping every run on one core removes migrations from the measurements.

use nix::sched::{sched_setaffinity, CpuSet};
use nix::unistd::Pid;

/// Pin the calling thread to `cpu`.
pub fn pin_current_thread(cpu: usize) -> Result<(), nix::Error> {
    let num_cpus = num_cpus::get();
    if cpu >= num_cpus {
        tracing::error!(cpu = cpu, num_cpus = num_cpus, "CPU index out of range");
        return Err(nix::Error::EINVAL);
    }

    let mut cpuset = CpuSet::new();
    cpuset.set(cpu)?;
    // Pid 0 is the calling thread
    sched_setaffinity(Pid::from_raw(0), &cpuset)?;

    tracing::info!(cpu = cpu, "Benchmark thread pinned to CPU");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sched::sched_getaffinity;

    /// CPUs the calling thread may currently run on.
    fn current_affinity() -> Result<Vec<usize>, nix::Error> {
        let cpuset = sched_getaffinity(Pid::from_raw(0))?;
        Ok((0..CpuSet::count())
            .filter(|&cpu| cpuset.is_set(cpu).unwrap_or(false))
            .collect())
    }

    #[test]
    fn test_out_of_range_cpu_rejected() {
        let result = pin_current_thread(num_cpus::get() + 1);
        assert_eq!(result, Err(nix::Error::EINVAL));
    }

    #[test]
    fn test_pin_on_separate_thread() {
        // Pin a scratch thread so the test runner's threads are untouched
        std::thread::spawn(|| {
            let allowed = current_affinity().unwrap();
            let cpu = allowed[0];

            // May fail in restricted environments, but shouldn't panic
            match pin_current_thread(cpu) {
                Ok(()) => assert_eq!(current_affinity().unwrap(), vec![cpu]),
                Err(e) => println!("Pin failed (expected in restricted environments): {}", e),
            }
        })
        .join()
        .unwrap();
    }
}
