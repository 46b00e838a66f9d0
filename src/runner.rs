use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread;

/// Captured result of a finished child process
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub success: bool,
    pub code: Option<i32>,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

impl CommandOutput {
    /// Get stderr as a trimmed string
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }

    /// Best short description of a failure: stderr, else the exit status
    pub fn failure_detail(&self) -> String {
        let stderr = self.stderr_str();
        if !stderr.is_empty() {
            return stderr;
        }
        match self.code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Run a command, feed `input` on stdin, and capture stdout and stderr
///
/// Stdin is written from a separate thread so a child that produces output
/// before reading all of its input cannot deadlock us.
pub fn run_with_input(program: &Path, args: &[&str], input: Vec<u8>) -> io::Result<CommandOutput> {
    log::trace!("Running {} {}", program.display(), args.join(" "));

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let writer = child.stdin.take().map(|mut stdin| {
        thread::spawn(move || {
            // A child that exits without reading closes the pipe; that is its answer
            match stdin.write_all(&input) {
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        })
    });

    let output = child.wait_with_output()?;

    if let Some(writer) = writer {
        match writer.join() {
            Ok(result) => result?,
            Err(_) => return Err(io::Error::other("stdin writer thread panicked")),
        }
    }

    Ok(output.into())
}
