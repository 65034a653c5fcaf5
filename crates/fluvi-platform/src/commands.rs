use log::{debug, trace};

use fluvi_backend::InstallError;

#[cfg(windows)]
use std::os::windows::process::CommandExt;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

pub trait HideWindow {
    fn hide_window(&mut self) -> &mut Self;
}

impl HideWindow for tokio::process::Command {
    #[cfg(windows)]
    fn hide_window(&mut self) -> &mut Self {
        self.creation_flags(CREATE_NO_WINDOW)
    }

    #[cfg(not(windows))]
    fn hide_window(&mut self) -> &mut Self {
        self
    }
}

/// A fully described external command. Every strategy builds its
/// invocations through this single primitive; nothing else in the
/// workspace touches raw process APIs.
#[derive(Debug, Clone)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
    envs: Vec<(&'static str, String)>,
}

impl CommandLine {
    pub fn new<P, I, S>(program: P, args: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            envs: Vec::new(),
        }
    }

    /// Mark the child as non-interactive for tools that prompt otherwise.
    #[must_use]
    pub fn ci(mut self) -> Self {
        self.envs.push(("CI", "true".to_string()));
        self
    }

    #[must_use]
    pub fn printable(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }

    /// Run to completion and return the trimmed, combined stdout+stderr.
    ///
    /// # Errors
    /// Returns [`InstallError::CommandFailed`] when the program cannot be
    /// spawned or exits non-zero; the error carries the combined output so
    /// the tool's own diagnostics are never lost.
    pub async fn run_trimmed_combined(&self) -> Result<String, InstallError> {
        debug!("$ {}", self.printable());

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd.hide_window();

        let output = cmd
            .output()
            .await
            .map_err(|err| InstallError::command_failed(self.printable(), err.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = format!("{stdout}\n{stderr}").trim().to_string();

        trace!("{} exited with {:?}", self.program, output.status);

        if output.status.success() {
            Ok(combined)
        } else {
            debug!("{} failed: {combined}", self.printable());
            Err(InstallError::command_failed(self.printable(), combined))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_joins_program_and_args() {
        let cmd = CommandLine::new("fvm", ["install", "3.19.0", "--setup"]);
        assert_eq!(cmd.printable(), "fvm install 3.19.0 --setup");

        let bare = CommandLine::new("flutter", Vec::<String>::new());
        assert_eq!(bare.printable(), "flutter");
    }

    #[test]
    fn ci_marks_the_child_environment() {
        let cmd = CommandLine::new("fvm", ["install"]).ci();
        assert!(cmd.envs.iter().any(|(k, v)| *k == "CI" && v == "true"));
    }

    #[test]
    fn hide_window_is_chainable() {
        let mut cmd = tokio::process::Command::new("echo");
        let before = &mut cmd as *mut tokio::process::Command;
        let after = cmd.hide_window() as *mut tokio::process::Command;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn missing_program_reports_command_failed() {
        let cmd = CommandLine::new("fluvi-test-no-such-binary", ["--version"]);
        let result = cmd.run_trimmed_combined().await;
        assert!(matches!(result, Err(InstallError::CommandFailed { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn combined_output_is_trimmed() {
        let cmd = CommandLine::new("echo", ["hello world"]);
        let output = cmd.run_trimmed_combined().await.unwrap();
        assert_eq!(output, "hello world");
    }
}
