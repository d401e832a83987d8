use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Lines};
use std::io::{Error, ErrorKind};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};

use crate::cmd::command::CommandError::{ExecutionError, ExitStatusError, TimeoutError};

use itertools::Itertools;
use std::time::{Duration, Instant};
use timeout_readwrite::TimeoutReader;

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("Error while executing command")]
    ExecutionError(#[from] Error),

    #[error("Command terminated with a non success exit status code: {0}")]
    ExitStatusError(ExitStatus),

    #[error("Command killed due to timeout: {0}")]
    TimeoutError(String),
}

#[derive(Debug, Clone)]
pub enum AbortReason {
    Timeout(Duration),
}

pub struct CommandKiller<'a> {
    should_abort: Box<dyn Fn() -> Option<AbortReason> + 'a>,
}

impl<'a> CommandKiller<'a> {
    pub fn never() -> CommandKiller<'a> {
        CommandKiller {
            should_abort: Box::new(|| None),
        }
    }

    pub fn from_timeout(timeout: Duration) -> CommandKiller<'a> {
        let now = Instant::now();
        CommandKiller {
            should_abort: Box::new(move || {
                if now.elapsed() >= timeout {
                    return Some(AbortReason::Timeout(timeout));
                }

                None
            }),
        }
    }

    pub fn should_abort(&self) -> Option<AbortReason> {
        (self.should_abort)()
    }
}

enum StreamState {
    Open,
    Closed,
    Aborted,
}

/// ExecCommand: a child process whose stdout / stderr are streamed line by line
/// while its lifetime is bounded by a `CommandKiller`.
pub struct ExecCommand {
    command: Command,
}

impl ExecCommand {
    pub fn new<P: AsRef<Path>>(binary: P, args: &[&str], envs: &[(&str, &str)]) -> ExecCommand {
        let mut command = Command::new(binary.as_ref().as_os_str());
        command.args(args);

        envs.iter().for_each(|(k, v)| {
            command.env(k, v);
        });

        ExecCommand { command }
    }

    fn kill(cmd_handle: &mut Child) {
        let _ = cmd_handle
            .kill()
            .map(|_| cmd_handle.wait())
            .map_err(|err| error!("Cannot kill process {:?} {}", cmd_handle, err));
    }

    pub fn exec(&mut self) -> Result<(), CommandError> {
        self.exec_with_abort(
            &mut |line| info!("{}", line),
            &mut |line| warn!("{}", line),
            &CommandKiller::never(),
        )
    }

    pub fn exec_with_output<STDOUT, STDERR>(
        &mut self,
        stdout_output: &mut STDOUT,
        stderr_output: &mut STDERR,
    ) -> Result<(), CommandError>
    where
        STDOUT: FnMut(String),
        STDERR: FnMut(String),
    {
        self.exec_with_abort(stdout_output, stderr_output, &CommandKiller::never())
    }

    // Forward every line available right now, stop on reader timeout.
    fn drain<R: std::io::Read + std::os::fd::AsFd, F: FnMut(String)>(
        &self,
        reader: &mut Lines<BufReader<TimeoutReader<R>>>,
        output: &mut F,
        abort_notifier: &CommandKiller,
        stream_name: &str,
    ) -> StreamState {
        loop {
            let line = match reader.next() {
                Some(line) => line,
                None => return StreamState::Closed,
            };

            match line {
                Err(ref err) if err.kind() == ErrorKind::TimedOut => return StreamState::Open,
                Ok(line) => output(line),
                Err(err) => {
                    error!("Error on {} of cmd {:?}: {:?}", stream_name, self.command, err);
                    return StreamState::Closed;
                }
            }

            if abort_notifier.should_abort().is_some() {
                return StreamState::Aborted;
            }
        }
    }

    pub fn exec_with_abort<STDOUT, STDERR>(
        &mut self,
        stdout_output: &mut STDOUT,
        stderr_output: &mut STDERR,
        abort_notifier: &CommandKiller,
    ) -> Result<(), CommandError>
    where
        STDOUT: FnMut(String),
        STDERR: FnMut(String),
    {
        debug!("command: {:?}", self.command);
        let mut cmd_handle = self
            .command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(ExecutionError)?;

        let stdout = cmd_handle
            .stdout
            .take()
            .ok_or_else(|| ExecutionError(Error::new(ErrorKind::BrokenPipe, "Cannot get stdout for command")))?;
        let mut stdout_reader = BufReader::new(TimeoutReader::new(stdout, Duration::from_secs(1))).lines();

        let stderr = cmd_handle
            .stderr
            .take()
            .ok_or_else(|| ExecutionError(Error::new(ErrorKind::BrokenPipe, "Cannot get stderr for command")))?;
        // don't block on stderr
        let mut stderr_reader = BufReader::new(TimeoutReader::new(stderr, Duration::from_secs(0))).lines();

        let mut stdout_closed = false;
        let mut stderr_closed = false;
        while !stdout_closed || !stderr_closed {
            if abort_notifier.should_abort().is_some() {
                break;
            }

            if !stdout_closed {
                match self.drain(&mut stdout_reader, stdout_output, abort_notifier, "stdout") {
                    StreamState::Open => {}
                    StreamState::Closed => stdout_closed = true,
                    StreamState::Aborted => break,
                }
            }

            if !stderr_closed {
                match self.drain(&mut stderr_reader, stderr_output, abort_notifier, "stderr") {
                    StreamState::Open => {}
                    StreamState::Closed => stderr_closed = true,
                    StreamState::Aborted => break,
                }
            }
        }

        // Wait for the process to exit before reaching the timeout, kill it otherwise
        let exit_status = loop {
            match cmd_handle.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => match abort_notifier.should_abort() {
                    None => {}
                    Some(AbortReason::Timeout(timeout)) => {
                        let msg = format!(
                            "Killing process {:?} due to timeout {}s reached",
                            self.command,
                            timeout.as_secs()
                        );
                        warn!("{}", msg);
                        Self::kill(&mut cmd_handle);
                        return Err(TimeoutError(msg));
                    }
                },
                Err(err) => return Err(ExecutionError(err)),
            };

            std::thread::sleep(Duration::from_millis(100));
        };

        if !exit_status.success() {
            debug!(
                "command: {:?} terminated with error exit status {:?}",
                self.command, exit_status
            );
            return Err(ExitStatusError(exit_status));
        }

        Ok(())
    }
}

// return the output of "binary_name" version
pub fn run_version_command_for(binary_name: &str, version_arg: &str) -> String {
    let mut output_from_cmd = String::new();
    let mut cmd = ExecCommand::new(binary_name, &[version_arg], &[]);
    let _ = cmd.exec_with_output(&mut |r_out| output_from_cmd.push_str(&r_out), &mut |r_err| {
        error!("Error executing {}: {}", binary_name, r_err)
    });

    output_from_cmd
}

pub fn does_binary_exist<S>(binary: S) -> bool
where
    S: AsRef<OsStr>,
{
    Command::new(binary)
        .stdout(Stdio::null())
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|mut child| child.wait())
        .is_ok()
}

pub fn command_to_string<P>(binary: P, args: &[&str], envs: &[(&str, &str)]) -> String
where
    P: AsRef<Path>,
{
    let envs = envs.iter().map(|(k, _)| format!("{k}=xxx")).join(" ");
    format!("{} {:?} {}", envs, binary.as_ref().as_os_str(), args.join(" "))
        .trim()
        .to_string()
}
