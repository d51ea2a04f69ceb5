use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process;

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::error::LaunchError;
use crate::utils::find_executable;

/// How a launched child finished, or that it was stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    Exited(i32),
    Signaled(i32),
    Stopped(i32),
}

impl ChildStatus {
    pub fn success(self) -> bool {
        self == ChildStatus::Exited(0)
    }
}

/// Runs `parts[0]` with the remaining parts as arguments and blocks until it
/// terminates or is stopped by a signal. The child inherits stdin, stdout
/// and stderr.
pub fn launch(parts: &[String]) -> Result<ChildStatus, LaunchError> {
    let Some((program, args)) = parts.split_first() else {
        return Err(LaunchError::NotFound(String::new()));
    };

    let path = resolve(program).ok_or_else(|| LaunchError::NotFound(program.clone()))?;
    log::debug!("launching {} as {}", program, path.display());

    let child = process::Command::new(&path)
        .arg0(program)
        .args(args)
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            program: program.clone(),
            source,
        })?;

    let status = wait_untraced(Pid::from_raw(child.id() as i32)).map_err(|errno| {
        LaunchError::Wait {
            program: program.clone(),
            source: errno.into(),
        }
    })?;
    log::debug!("{} finished: {:?}", program, status);
    Ok(status)
}

fn wait_untraced(pid: Pid) -> nix::Result<ChildStatus> {
    loop {
        match waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(ChildStatus::Exited(code)),
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                return Ok(ChildStatus::Signaled(signal as i32))
            }
            Ok(WaitStatus::Stopped(_, signal)) => return Ok(ChildStatus::Stopped(signal as i32)),
            Ok(other) => log::trace!("ignoring wait status {:?}", other),
            Err(Errno::EINTR) => {}
            Err(errno) => return Err(errno),
        }
    }
}

fn resolve(program: &str) -> Option<PathBuf> {
    if program.contains('/') {
        Some(PathBuf::from(program))
    } else {
        find_executable(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn parts(words: &[&str]) -> Vec<String> {
        words.iter().map(|word| word.to_string()).collect()
    }

    #[test]
    fn reports_exit_code() {
        let status = launch(&parts(&["/bin/sh", "-c", "exit 3"])).unwrap();
        assert_eq!(ChildStatus::Exited(3), status);
        assert!(!status.success());
    }

    #[test]
    fn resolves_through_path() {
        let status = launch(&parts(&["sh", "-c", "true"])).unwrap();
        assert!(status.success());
    }

    #[test]
    fn reports_terminating_signal() {
        let status = launch(&parts(&["/bin/sh", "-c", "kill -9 $$"])).unwrap();
        assert_eq!(ChildStatus::Signaled(9), status);
    }

    #[test]
    fn returns_when_child_is_stopped() {
        // the background job kills the stopped shell so it does not linger
        let script = "(sleep 1; kill -KILL $$) & kill -STOP $$";
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let _ = sender.send(launch(&parts(&["/bin/sh", "-c", script])));
        });

        let status = receiver
            .recv_timeout(Duration::from_secs(10))
            .expect("launch kept blocking on a stopped child")
            .unwrap();

        assert_eq!(ChildStatus::Stopped(Signal::SIGSTOP as i32), status);
        assert!(!status.success());
    }

    #[test]
    fn unknown_program_is_not_found() {
        let err = launch(&parts(&["meowsh-no-such-program"])).unwrap_err();
        assert!(matches!(err, LaunchError::NotFound(_)));
        assert_eq!(
            "launch: meowsh-no-such-program: command not found",
            err.to_string()
        );
    }

    #[test]
    fn missing_explicit_path_fails_to_spawn() {
        let err = launch(&parts(&["./meowsh-no-such-program"])).unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
        assert!(err.to_string().starts_with("launch: ./meowsh-no-such-program: "));
    }
}
