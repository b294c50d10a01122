//! File descriptor limit detection for capping concurrent digest workers (Unix).

/// Descriptors a digest worker may hold at once (the open file plus slack for mmap and stdio).
pub const FDS_PER_WORKER: usize = 2;

/// Fraction of the process FD limit to use (leave headroom for other code).
const FD_LIMIT_FRACTION: f64 = 0.8;

/// Returns the soft limit for max open file descriptors, or `None` if unavailable (e.g. Windows).
#[cfg(unix)]
pub fn max_open_fds() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut rlim = MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return None;
    }
    let rlim = unsafe { rlim.assume_init() };
    let cur = rlim.rlim_cur;
    // RLIM_INFINITY is typically !0 or u64::MAX; treat as "no practical limit"
    if cur == libc::RLIM_INFINITY || cur > i64::MAX as u64 {
        return None;
    }
    Some(cur)
}

#[cfg(not(unix))]
pub fn max_open_fds() -> Option<u64> {
    None
}

/// Largest worker count that stays under ~80% of `limit`.
pub fn workers_for_fd_limit(limit: u64) -> usize {
    let usable = (limit as f64 * FD_LIMIT_FRACTION) as usize;
    (usable / FDS_PER_WORKER).max(1)
}

/// Cap `wanted` by the process FD limit, if there is one.
pub fn cap_workers_by_fd_limit(wanted: usize) -> usize {
    match max_open_fds().map(workers_for_fd_limit) {
        Some(cap) if cap < wanted => {
            log::debug!("Capping digest workers {} -> {} (FD limit ~80%)", wanted, cap);
            cap
        }
        _ => wanted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workers_for_fd_limit() {
        assert_eq!(workers_for_fd_limit(1024), 409);
        assert_eq!(workers_for_fd_limit(3), 1);
        assert_eq!(workers_for_fd_limit(0), 1);
    }

    #[test]
    fn test_cap_never_raises() {
        assert!(cap_workers_by_fd_limit(4) <= 4);
        assert!(cap_workers_by_fd_limit(1) >= 1);
    }
}
