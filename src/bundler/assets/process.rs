//! Subprocess execution.
//!
//! Command, arguments and working directory in; exit code, stdout and stderr
//! out. Nothing here knows which tool is being run.

use std::{
    ffi::OsString,
    fmt, io,
    path::PathBuf,
};

/// A fully described external command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProcessInvocation {
    /// Program to execute.
    pub program: PathBuf,
    /// Arguments in order.
    pub args: Vec<OsString>,
    /// Working directory; inherits the current one when `None`.
    pub working_dir: Option<PathBuf>,
}

impl fmt::Display for ProcessInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProcessOutput {
    /// Exit code; `None` if the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ProcessOutput {
    /// Whether the process exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs the invocation to completion, capturing its output.
///
/// Blocks the calling task until the process exits; no timeout is applied.
pub async fn run_process(invocation: &ProcessInvocation) -> io::Result<ProcessOutput> {
    let mut command = tokio::process::Command::new(&invocation.program);
    command.args(&invocation.args);
    if let Some(dir) = &invocation.working_dir {
        command.current_dir(dir);
    }

    log::debug!("Running: {}", invocation);
    let output = command.output().await?;

    Ok(ProcessOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
