//! Process-group helpers for reliable child process cleanup.
//!
//! Every command spawned by this crate becomes the leader of a fresh process
//! group, so its group id equals its pid. That lets the supervisor address
//! the command and everything it forked with a single `killpg`:
//! - `is_process_running` checks one pid with signal 0.
//! - `is_process_group_running` reports whether any non-zombie member of a
//!   group is left.
//! - `kill_process_group` sends one signal to a group.
//! - `terminate_process_group` sends SIGTERM to the group, waits for every
//!   member to exit, then SIGKILLs the group if any member is still alive.
//!
//! The group outlives its leader: a command that backgrounds work and exits
//! leaves the rest of its group running.
//!
//! On non-Unix platforms these helpers are no-ops that report "not running".

use std::io;
use std::time::{Duration, Instant};

/// Default grace period for graceful termination (milliseconds).
pub const DEFAULT_GRACEFUL_TIMEOUT_MS: u64 = 500;

/// Signal to send when killing process groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KillSignal {
    /// SIGINT - interrupt (Ctrl+C equivalent)
    Int,
    /// SIGTERM - allows graceful shutdown
    Term,
    /// SIGKILL - immediate termination
    #[default]
    Kill,
}

#[cfg(unix)]
impl KillSignal {
    fn as_libc_signal(self) -> libc::c_int {
        match self {
            KillSignal::Int => libc::SIGINT,
            KillSignal::Term => libc::SIGTERM,
            KillSignal::Kill => libc::SIGKILL,
        }
    }
}

/// Result of a graceful termination attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationOutcome {
    /// Group exited after SIGTERM within the grace period.
    GracefulExit,
    /// Group had to be forcefully killed with SIGKILL.
    ForcefulKill,
    /// Nothing in the group was running when termination started.
    AlreadyExited,
}

/// Check if a process (by PID) is still running.
#[cfg(unix)]
pub fn is_process_running(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    // kill with signal 0 checks if process exists without sending a signal
    let result = unsafe { libc::kill(pid, 0) };
    if result == 0 {
        return true;
    }
    // ESRCH = no such process, EPERM = exists but no permission (still running)
    io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
pub fn is_process_running(_pid: u32) -> bool {
    false
}

/// Check if any live member of the process group `pgid` remains.
///
/// Zombies do not count: an exited member that nobody reaped yet still
/// answers `killpg(pgid, 0)`, so on Linux the group is read from `/proc`.
#[cfg(unix)]
pub fn is_process_group_running(pgid: u32) -> bool {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return false;
    };
    if pgid <= 1 {
        return false;
    }

    if let Some(live) = scan_group_members(pgid) {
        return live;
    }

    let result = unsafe { libc::killpg(pgid, 0) };
    if result == 0 {
        return true;
    }
    io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(target_os = "linux")]
fn scan_group_members(pgid: libc::pid_t) -> Option<bool> {
    linux::group_has_live_member(pgid)
}

#[cfg(all(unix, not(target_os = "linux")))]
fn scan_group_members(_pgid: libc::pid_t) -> Option<bool> {
    None
}

#[cfg(target_os = "linux")]
mod linux {
    use std::fs;

    /// `None` when `/proc` cannot be listed.
    pub(super) fn group_has_live_member(pgid: libc::pid_t) -> Option<bool> {
        let entries = fs::read_dir("/proc").ok()?;
        for entry in entries.flatten() {
            let is_pid = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.bytes().all(|b| b.is_ascii_digit()));
            if !is_pid {
                continue;
            }
            // The process may exit between listing and reading.
            let Ok(stat) = fs::read_to_string(entry.path().join("stat")) else {
                continue;
            };
            if let Some((state, pgrp)) = parse_stat(&stat)
                && pgrp == pgid
                && !matches!(state, 'Z' | 'X' | 'x')
            {
                return Some(true);
            }
        }
        Some(false)
    }

    /// State and process group from `/proc/<pid>/stat`:
    /// `pid (comm) state ppid pgrp ...`. `comm` may contain spaces and
    /// parentheses, so fields are read after the last `)`.
    pub(super) fn parse_stat(stat: &str) -> Option<(char, libc::pid_t)> {
        let rest = &stat[stat.rfind(')')? + 1..];
        let mut fields = rest.split_whitespace();
        let state = fields.next()?.chars().next()?;
        let _ppid = fields.next()?;
        let pgrp = fields.next()?.parse().ok()?;
        Some((state, pgrp))
    }
}

#[cfg(not(unix))]
pub fn is_process_group_running(_pgid: u32) -> bool {
    false
}

/// Send `signal` to every process in group `pgid`.
///
/// Returns `Ok(false)` when the group no longer exists.
#[cfg(unix)]
pub fn kill_process_group(pgid: u32, signal: KillSignal) -> io::Result<bool> {
    let pgid = libc::pid_t::try_from(pgid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "process group id out of range"))?;
    // killpg(0) and killpg(1) would hit our own group or init's; never valid here.
    if pgid <= 1 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to signal process group {pgid}"),
        ));
    }

    let result = unsafe { libc::killpg(pgid, signal.as_libc_signal()) };
    if result == -1 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ESRCH) {
            return Ok(false);
        }
        return Err(err);
    }

    Ok(true)
}

#[cfg(not(unix))]
pub fn kill_process_group(_pgid: u32, _signal: KillSignal) -> io::Result<bool> {
    Ok(false)
}

/// Gracefully terminate the process group `pgid`.
///
/// 1. Send SIGTERM to the whole group.
/// 2. Poll the group until no live member is left or `grace_period` elapses.
/// 3. If anything is still running, send SIGKILL to the group. A delivered
///    SIGKILL counts as the end of the group.
///
/// The leader may already be gone; members it left behind are still
/// signalled. Blocks the calling thread for up to `grace_period`; call it
/// from a blocking context.
pub fn terminate_process_group(pgid: u32, grace_period: Duration) -> io::Result<TerminationOutcome> {
    if !is_process_group_running(pgid) {
        return Ok(TerminationOutcome::AlreadyExited);
    }

    if !kill_process_group(pgid, KillSignal::Term)? {
        return Ok(TerminationOutcome::AlreadyExited);
    }

    let deadline = Instant::now() + grace_period;
    let poll_interval = Duration::from_millis(10);

    while Instant::now() < deadline {
        if !is_process_group_running(pgid) {
            return Ok(TerminationOutcome::GracefulExit);
        }
        std::thread::sleep(poll_interval);
    }

    if kill_process_group(pgid, KillSignal::Kill)? {
        Ok(TerminationOutcome::ForcefulKill)
    } else {
        // Exited between the last poll and the kill
        Ok(TerminationOutcome::GracefulExit)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_kill_signal_default() {
        assert_eq!(KillSignal::default(), KillSignal::Kill);
        assert_ne!(KillSignal::Int, KillSignal::Term);
    }

    #[test]
    fn test_is_process_running_self() {
        assert!(is_process_running(std::process::id()));
    }

    #[test]
    fn test_is_process_running_nonexistent() {
        assert!(!is_process_running(2_000_000_000));
    }

    #[test]
    fn test_kill_nonexistent_group_reports_gone() {
        let delivered = kill_process_group(2_000_000_000, KillSignal::Term);
        assert!(matches!(delivered, Ok(false) | Err(_)));
    }

    #[test]
    fn test_refuses_reserved_groups() {
        assert!(kill_process_group(0, KillSignal::Term).is_err());
        assert!(kill_process_group(1, KillSignal::Term).is_err());
        assert!(!is_process_group_running(1));
    }

    #[test]
    fn test_terminate_nonexistent_group() {
        let outcome = terminate_process_group(2_000_000_000, Duration::from_millis(50))
            .expect("group check should not fail");
        assert_eq!(outcome, TerminationOutcome::AlreadyExited);
    }

    fn wait_for_group_exit(pgid: u32) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if !is_process_group_running(pgid) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        false
    }

    fn spawn_group(script: &str) -> std::process::Child {
        use std::os::unix::process::CommandExt;

        std::process::Command::new("sh")
            .arg("-c")
            .arg(script)
            .process_group(0)
            .spawn()
            .expect("spawn group")
    }

    #[test]
    fn test_terminate_running_group() {
        use std::os::unix::process::CommandExt;

        let mut child = std::process::Command::new("sleep")
            .arg("30")
            .process_group(0)
            .spawn()
            .expect("spawn sleeper");
        let pgid = child.id();

        let outcome = terminate_process_group(pgid, Duration::from_millis(DEFAULT_GRACEFUL_TIMEOUT_MS))
            .expect("terminate group");
        child.wait().expect("reap sleeper");

        assert_ne!(outcome, TerminationOutcome::AlreadyExited);
        assert!(!is_process_running(pgid));
    }

    #[test]
    fn test_terminate_escalates_when_members_ignore_term() {
        let mut child = spawn_group("trap '' TERM; echo armed; sleep 30");
        let pgid = child.id();
        // Give the shell time to install the trap before signalling.
        std::thread::sleep(Duration::from_millis(300));

        let outcome = terminate_process_group(pgid, Duration::from_millis(200)).expect("terminate group");
        child.wait().expect("reap shell");

        assert_eq!(outcome, TerminationOutcome::ForcefulKill);
        assert!(wait_for_group_exit(pgid));
    }

    #[test]
    fn test_terminate_reaches_members_after_leader_exit() {
        let mut child = spawn_group("sleep 30 &");
        let pgid = child.id();
        child.wait().expect("reap shell");

        assert!(!is_process_running(pgid));
        assert!(is_process_group_running(pgid), "backgrounded sleep keeps the group alive");

        let outcome = terminate_process_group(pgid, Duration::from_millis(DEFAULT_GRACEFUL_TIMEOUT_MS))
            .expect("terminate group");
        assert_ne!(outcome, TerminationOutcome::AlreadyExited);
        assert!(wait_for_group_exit(pgid));
        assert_eq!(
            terminate_process_group(pgid, Duration::from_millis(50)).expect("second terminate"),
            TerminationOutcome::AlreadyExited
        );
    }

    #[test]
    fn test_zombie_members_do_not_count() {
        let mut child = spawn_group("exit 0");
        let pgid = child.id();
        // Exited but not reaped yet.
        std::thread::sleep(Duration::from_millis(200));

        if cfg!(target_os = "linux") {
            assert!(!is_process_group_running(pgid));
        }

        child.wait().expect("reap shell");
        assert!(!is_process_group_running(pgid));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_parse_stat_handles_odd_comm() {
        assert_eq!(
            linux::parse_stat("4242 (my (odd) cmd) S 1 4240 4240 0 -1"),
            Some(('S', 4240))
        );
        assert_eq!(linux::parse_stat("garbage"), None);
    }
}
