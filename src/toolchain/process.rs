use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::HarnessError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured result of an external process that ran to completion.
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Run `command` to completion, killing it once `timeout` elapses.
///
/// Both output pipes are drained on reader threads so a chatty tool cannot
/// block on a full pipe while we poll for its exit.
pub fn run_bounded(mut command: Command, timeout: Duration) -> Result<ProcessOutput, HarnessError> {
    let program = command.get_program().to_string_lossy().into_owned();
    log::debug!("spawning {:?}", command);

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| HarnessError::ToolLaunch {
            program: program.clone(),
            reason: err.to_string(),
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let deadline = Instant::now() + timeout;

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                reap(&mut child);
                log::warn!("{} exceeded {} ms; killed", program, timeout.as_millis());
                return Err(HarnessError::ToolTimeout {
                    program,
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(err) => {
                reap(&mut child);
                return Err(HarnessError::ToolLaunch {
                    program,
                    reason: format!("waiting for process: {err}"),
                });
            }
        }
    };

    Ok(ProcessOutput {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

/// Kill `child` and wait for it so no zombie is left behind.
fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn drain<R>(pipe: Option<R>) -> Option<JoinHandle<String>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut command = Command::new("sh");
        command.args(["-c", script]);
        command
    }

    #[test]
    fn captures_both_streams_and_status() {
        let output = run_bounded(
            sh("echo out; echo err 1>&2; exit 3"),
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn kills_process_after_deadline() {
        let started = Instant::now();
        let err = run_bounded(sh("sleep 5"), Duration::from_millis(100)).unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(4));
        assert_eq!(
            err,
            HarnessError::ToolTimeout {
                program: "sh".to_string(),
                timeout_ms: 100,
            }
        );
    }

    #[test]
    fn reaped_child_has_exited() {
        let mut child = sh("sleep 5").spawn().unwrap();
        reap(&mut child);
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn missing_binary_is_a_launch_error() {
        let err = run_bounded(
            Command::new("fi-validate-no-such-tool"),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, HarnessError::ToolLaunch { .. }));
    }
}
