//! Child processes with captured output and a hard timeout.
//!
//! Output goes to files rather than pipes, so a child that fills its output
//! or leaves grandchildren holding the descriptors can never block the wait.
//!
//! On unix the child leads its own process group. Whatever it forks is
//! killed with it, and a Ctrl+C at the terminal reaches only fprobe.

use std::fs::File;
use std::io;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

pub(crate) const STDOUT_FILE: &str = ".fprobe-stdout";
pub(crate) const STDERR_FILE: &str = ".fprobe-stderr";

#[derive(Debug)]
pub(crate) struct Captured {
    pub status: ExitStatus,
    pub timed_out: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Spawn `cmd`, wait up to `timeout`, then kill and reap it.
///
/// Leftover members of the child's process group are killed either way.
/// Errors only when the child cannot be spawned or waited on.
pub(crate) fn run_captured(
    cmd: &mut Command,
    capture_dir: &Path,
    timeout: Duration,
) -> io::Result<Captured> {
    let stdout_path = capture_dir.join(STDOUT_FILE);
    let stderr_path = capture_dir.join(STDERR_FILE);

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(File::create(&stdout_path)?)
        .stderr(File::create(&stderr_path)?)
        .spawn()?;

    let started = Instant::now();
    let (status, timed_out) = loop {
        if let Some(status) = child.try_wait()? {
            // the group id stays reserved while any member is alive
            kill_group(&mut child);
            break (status, false);
        }
        if started.elapsed() >= timeout {
            kill_group(&mut child);
            break (child.wait()?, true);
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(Captured {
        status,
        timed_out,
        stdout: read_lossy(&stdout_path)?,
        stderr: read_lossy(&stderr_path)?,
    })
}

/// SIGKILL the child's whole process group.
///
/// An empty group or an already-exited child is not an error.
#[cfg(unix)]
fn kill_group(child: &mut Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let _ = killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL);
}

#[cfg(not(unix))]
fn kill_group(child: &mut Child) {
    let _ = child.kill();
}

fn read_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Last non-empty line of `text`, trimmed.
pub(crate) fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).last()
}
