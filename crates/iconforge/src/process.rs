//! Blocking execution of external tools.
//!
//! Child output is always captured. In verbose mode it is additionally echoed
//! to our own stdout/stderr while the child runs.
use crate::error::{Error, Result, ToolError};
use log::debug;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const NO_OUTPUT: &str = "<no output>";

/// A single external command, built up before being handed to a [`ProcessRunner`].
#[derive(Clone, Debug)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    env: Vec<(OsString, OsString)>,
    path_prefix: Vec<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            path_prefix: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.env
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    /// Puts `dir` in front of the inherited `PATH` for this invocation only.
    pub fn prepend_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.path_prefix.push(dir.into());
        self
    }

    /// Short command name used in error messages.
    pub fn name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner {
    verbose: bool,
    timeout: Option<Duration>,
}

#[derive(Clone, Copy)]
enum Echo {
    Stdout,
    Stderr,
}

impl ProcessRunner {
    pub fn new(verbose: bool, timeout: Option<Duration>) -> Self {
        Self { verbose, timeout }
    }

    /// Runs `invocation` to completion.
    ///
    /// A non-zero exit yields [`ToolError::Failed`] carrying stderr, or stdout
    /// if stderr is empty, or a `<no output>` marker.
    pub fn execute(&self, invocation: &Invocation) -> std::result::Result<ProcessOutput, ToolError> {
        let command = invocation.name();
        debug!("running {invocation}");

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &invocation.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }
        if !invocation.path_prefix.is_empty() {
            let path = search_path(&invocation.path_prefix).map_err(|source| ToolError::Spawn {
                command: command.clone(),
                source,
            })?;
            cmd.env("PATH", path);
        }

        let mut child = cmd.spawn().map_err(|source| ToolError::Spawn {
            command: command.clone(),
            source,
        })?;
        let deadline = self.timeout.map(|limit| Instant::now() + limit);
        let stdout = child
            .stdout
            .take()
            .map(|s| drain(s, self.verbose.then_some(Echo::Stdout)));
        let stderr = child
            .stderr
            .take()
            .map(|s| drain(s, self.verbose.then_some(Echo::Stderr)));

        // Readers finish once every holder of the pipes closes its end, which
        // can be a grandchild outliving the tool. They share the deadline with
        // the child and are left detached when it passes.
        let status = self.wait(&mut child, &command, deadline)?;
        let output = ProcessOutput {
            stdout: self.collect(stdout, &command, deadline)?,
            stderr: self.collect(stderr, &command, deadline)?,
        };

        if !status.success() {
            return Err(ToolError::Failed {
                command,
                code: status.code(),
                output: failure_text(&output),
            });
        }
        Ok(output)
    }

    /// Version query used to verify a required tool is installed.
    ///
    /// Returns the first line the tool printed.
    pub fn probe(&self, program: &str, guidance: &str) -> Result<String> {
        let invocation = Invocation::new(program).arg("--version");
        match self.execute(&invocation) {
            Ok(output) => {
                let text = if output.stdout.trim().is_empty() {
                    &output.stderr
                } else {
                    &output.stdout
                };
                Ok(text.lines().next().unwrap_or_default().trim().to_string())
            }
            Err(err) => Err(Error::Prerequisite {
                tool: program.to_string(),
                guidance: format!("{guidance} ({})", describe(&err)),
            }),
        }
    }

    fn wait(
        &self,
        child: &mut std::process::Child,
        command: &str,
        deadline: Option<Instant>,
    ) -> std::result::Result<ExitStatus, ToolError> {
        let spawn_err = |source| ToolError::Spawn {
            command: command.to_string(),
            source,
        };
        let Some(deadline) = deadline else {
            return child.wait().map_err(spawn_err);
        };
        loop {
            if let Some(status) = child.try_wait().map_err(spawn_err)? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.timed_out(command));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn collect(
        &self,
        reader: Option<Receiver<Vec<u8>>>,
        command: &str,
        deadline: Option<Instant>,
    ) -> std::result::Result<String, ToolError> {
        let Some(reader) = reader else {
            return Ok(String::new());
        };
        let bytes = match deadline {
            None => reader.recv().unwrap_or_default(),
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match reader.recv_timeout(remaining) {
                    Ok(bytes) => bytes,
                    Err(RecvTimeoutError::Timeout) => return Err(self.timed_out(command)),
                    Err(RecvTimeoutError::Disconnected) => Vec::new(),
                }
            }
        };
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn timed_out(&self, command: &str) -> ToolError {
        ToolError::Timeout {
            command: command.to_string(),
            secs: self.timeout.map_or(0, |limit| limit.as_secs()),
        }
    }
}

fn search_path(prefix: &[PathBuf]) -> io::Result<OsString> {
    let inherited = std::env::var_os("PATH").unwrap_or_default();
    let paths = prefix
        .iter()
        .cloned()
        .chain(std::env::split_paths(&inherited));
    std::env::join_paths(paths).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}

fn drain<R: Read + Send + 'static>(mut reader: R, echo: Option<Echo>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut collected = Vec::new();
        let mut buf = [0u8; 8192];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            };
            collected.extend_from_slice(&buf[..n]);
            match echo {
                Some(Echo::Stdout) => {
                    let mut out = io::stdout().lock();
                    let _ = out.write_all(&buf[..n]);
                    let _ = out.flush();
                }
                Some(Echo::Stderr) => {
                    let _ = io::stderr().lock().write_all(&buf[..n]);
                }
                None => {}
            }
        }
        let _ = tx.send(collected);
    });
    rx
}

/// `err` followed by its causes, on one line.
fn describe(err: &ToolError) -> String {
    let mut text = err.to_string();
    let mut cause = std::error::Error::source(err);
    while let Some(inner) = cause {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        cause = inner.source();
    }
    text
}

fn failure_text(output: &ProcessOutput) -> String {
    let stderr = output.stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    let stdout = output.stdout.trim();
    if !stdout.is_empty() {
        return stdout.to_string();
    }
    NO_OUTPUT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_text_prefers_stderr() {
        let out = ProcessOutput {
            stdout: "out\n".into(),
            stderr: "  err \n".into(),
        };
        assert_eq!(failure_text(&out), "err");
    }

    #[test]
    fn failure_text_falls_back_to_stdout_then_marker() {
        let out = ProcessOutput {
            stdout: "out\n".into(),
            stderr: "\n".into(),
        };
        assert_eq!(failure_text(&out), "out");
        assert_eq!(failure_text(&ProcessOutput::default()), NO_OUTPUT);
    }

    #[test]
    fn describe_includes_causes() {
        let err = ToolError::Spawn {
            command: "npm".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(describe(&err), "failed to start `npm`: no such file");
    }

    #[test]
    fn invocation_name_is_file_name() {
        let inv = Invocation::new("/opt/venv/bin/nanoemoji").arg("--help");
        assert_eq!(inv.name(), "nanoemoji");
        assert_eq!(inv.to_string(), "/opt/venv/bin/nanoemoji --help");
    }
}
