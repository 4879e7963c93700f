// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command specifications and captured results

use std::fmt;
use tokio::io::AsyncRead;

/// Standard input fed to a command.
pub enum CommandInput {
    Bytes(Vec<u8>),
    Reader(Box<dyn AsyncRead + Send + Unpin>),
}

impl fmt::Debug for CommandInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            Self::Reader(_) => write!(f, "Reader"),
        }
    }
}

/// A program invocation: program, arguments and optional standard input.
#[derive(Debug)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<CommandInput>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin_bytes(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(CommandInput::Bytes(content.into()));
        self
    }

    pub fn stdin_reader(mut self, reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        self.stdin = Some(CommandInput::Reader(Box::new(reader)));
        self
    }

    pub fn has_stdin(&self) -> bool {
        self.stdin.is_some()
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub command: String,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunResult {
    /// Combined stdout and stderr, as shown in error messages.
    pub fn output(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (true, _) => self.stderr.clone(),
            (false, true) => self.stdout.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }

    pub fn stdout_lines(&self) -> Vec<String> {
        self.stdout
            .lines()
            .map(|l| l.trim_end().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_renders_command_line() {
        let spec = CommandSpec::new("mkdir").args(["-p", "/etc/kubernetes"]);
        assert_eq!(spec.to_string(), "mkdir -p /etc/kubernetes");
        assert!(!spec.has_stdin());
    }

    #[test]
    fn test_stdout_lines() {
        let rr = RunResult {
            stdout: "172.17.0.2,\r\nfd00::2\n".to_string(),
            ..Default::default()
        };
        assert_eq!(rr.stdout_lines(), vec!["172.17.0.2,", "fd00::2"]);
        assert!(RunResult::default().stdout_lines().is_empty());

        let blank_tail = RunResult {
            stdout: "172.17.0.2,fd00::2\n\n".to_string(),
            ..Default::default()
        };
        assert_eq!(blank_tail.stdout_lines(), vec!["172.17.0.2,fd00::2", ""]);
    }

    #[test]
    fn test_output_combines_streams() {
        let rr = RunResult {
            stdout: "out".to_string(),
            stderr: "err".to_string(),
            ..Default::default()
        };
        assert_eq!(rr.output(), "out\nerr");
    }
}
