//! OS process control for the encoder: signalling, liveness, detaching

use std::io;

use tokio::process::Command;

/// Send SIGTERM to `pid`.
///
/// Returns `Ok(false)` when no such process exists, or when the id now
/// belongs to a process we may not signal.
#[cfg(unix)]
pub fn terminate(pid: u32) -> io::Result<bool> {
    signal(pid, libc::SIGTERM)
}

/// Whether a process with this id exists
#[cfg(unix)]
pub fn is_alive(pid: u32) -> bool {
    // Signal 0 performs the permission and existence checks only
    signal(pid, 0).unwrap_or(false)
}

#[cfg(unix)]
fn signal(pid: u32, sig: libc::c_int) -> io::Result<bool> {
    let pid = libc::pid_t::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;

    // SAFETY: kill(2) takes plain integers and touches no memory we own
    if unsafe { libc::kill(pid, sig) } == 0 {
        return Ok(true);
    }

    not_ours(io::Error::last_os_error())
}

/// ESRCH: the process is gone. EPERM: its id was reused by another user.
#[cfg(unix)]
fn not_ours(err: io::Error) -> io::Result<bool> {
    match err.raw_os_error() {
        Some(libc::ESRCH) | Some(libc::EPERM) => Ok(false),
        _ => Err(err),
    }
}

/// Run the child in its own session so it outlives the terminal
#[cfg(unix)]
pub fn detach(cmd: &mut Command) {
    // SAFETY: setsid is async-signal-safe and the closure allocates nothing
    unsafe {
        cmd.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(not(unix))]
pub fn terminate(pid: u32) -> io::Result<bool> {
    if !is_alive(pid) {
        return Ok(false);
    }
    let status = std::process::Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/T", "/F"])
        .status()?;
    Ok(status.success())
}

#[cfg(not(unix))]
pub fn is_alive(pid: u32) -> bool {
    std::process::Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid), "/NH"])
        .output()
        .map(|out| String::from_utf8_lossy(&out.stdout).contains(&pid.to_string()))
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn detach(_cmd: &mut Command) {}
