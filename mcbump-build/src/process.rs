use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const POLL: Duration = Duration::from_millis(50);

/// How long to wait for the output readers once the process is gone. Gradle daemons can
/// inherit the pipes and keep them open.
const DRAIN_GRACE: Duration = Duration::from_secs(5);

/// Reader wait after a timeout kill. The whole group is dead, so the pipes close quickly.
const KILL_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was killed or ended by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Spawn `cmd`, capture both streams in full, and kill it once `timeout` has passed.
///
/// On unix the process leads its own process group and the whole group is killed at the
/// deadline, so nothing it started outlives the call. Output read before the kill is kept.
pub fn run_with_timeout(mut cmd: Command, timeout: Duration) -> io::Result<ProcessOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd.spawn()?;
    let stdout = child.stdout.take().map(Drain::start);
    let stderr = child.stderr.take().map(Drain::start);

    let deadline = Instant::now() + timeout;
    let mut timed_out = false;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break Some(status);
        }
        if Instant::now() >= deadline {
            timed_out = true;
            kill_tree(&mut child);
            break None;
        }
        thread::sleep(POLL);
    };

    let grace = if timed_out { KILL_GRACE } else { DRAIN_GRACE };
    Ok(ProcessOutput {
        exit_code: status.and_then(|s| s.code()),
        stdout: Drain::finish(stdout, grace),
        stderr: Drain::finish(stderr, grace),
        timed_out,
    })
}

#[cfg(unix)]
fn kill_tree(child: &mut Child) {
    // The child was spawned with `process_group(0)`, so its pid is the group id.
    if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
        // SAFETY: kill(2) takes no pointers; a stale group id only yields ESRCH.
        unsafe {
            libc::kill(-pgid, libc::SIGKILL);
        }
    }
    // Already exited between the poll and the kill is fine.
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// A reader thread that appends to a shared buffer as bytes arrive.
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    done: Receiver<()>,
}

impl Drain {
    fn start<R: Read + Send + 'static>(mut stream: R) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buf);
        let (tx, done) = mpsc::channel();
        thread::spawn(move || {
            let mut chunk = [0u8; 8192];
            loop {
                match stream.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => match sink.lock() {
                        Ok(mut b) => b.extend_from_slice(&chunk[..n]),
                        Err(poisoned) => poisoned.into_inner().extend_from_slice(&chunk[..n]),
                    },
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
            let _ = tx.send(());
        });
        Self { buf, done }
    }

    /// Wait up to `grace` for end of stream, then take whatever was read.
    fn finish(drain: Option<Self>, grace: Duration) -> String {
        let Some(drain) = drain else {
            return String::new();
        };
        let _ = drain.done.recv_timeout(grace);
        let bytes = match drain.buf.lock() {
            Ok(b) => b.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn captures_both_streams_and_exit_code() {
        let out = run_with_timeout(sh("echo out; echo err >&2; exit 3"), Duration::from_secs(10))
            .unwrap();
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.timed_out);
        assert!(!out.success());
    }

    #[test]
    fn kills_after_timeout() {
        let started = Instant::now();
        let out = run_with_timeout(sh("echo started; exec sleep 30"), Duration::from_millis(300))
            .unwrap();
        assert!(out.timed_out);
        assert_eq!(out.exit_code, None);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn timeout_kills_grandchildren_and_keeps_partial_output() {
        let td = tempfile::TempDir::new().unwrap();
        let marker = td.path().join("late");
        let script = format!(
            "echo started; echo warming >&2; sh -c 'sleep 2; touch {}'; true",
            marker.display()
        );

        let started = Instant::now();
        let out = run_with_timeout(sh(&script), Duration::from_millis(300)).unwrap();
        assert!(out.timed_out);
        assert!(started.elapsed() < Duration::from_millis(1500));
        assert_eq!(out.stdout, "started\n");
        assert_eq!(out.stderr, "warming\n");

        thread::sleep(Duration::from_millis(2500));
        assert!(!marker.exists());
    }

    #[test]
    fn spawn_failure_is_an_error() {
        let err = run_with_timeout(
            Command::new("/definitely/not/a/real/program"),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
