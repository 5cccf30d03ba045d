//! Produces the raw audit report by running the package manager.
//!
//! This is the only place auditgate starts a subprocess. The analysis core
//! only ever sees the captured JSON text.

use crate::config::Config;
use anyhow::{bail, Context, Result};
use std::process::Command;

pub struct AuditRunner {
    program: String,
    extra_args: Vec<String>,
}

impl AuditRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.npm_command.clone()).with_args(config.audit_args.clone())
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Full argument list passed to the package manager.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["audit".to_string(), "--json".to_string()];
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Runs the audit and returns its JSON output.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started or prints nothing.
    pub fn run(&self) -> Result<String> {
        let program = resolve_program(&self.program);

        let mut command = Command::new(&program);
        command.args(self.args());

        let output = command
            .output()
            .with_context(|| format!("Failed to execute {}. Is it installed?", program))?;

        // npm audit exits non-zero whenever it finds vulnerabilities but still
        // writes a complete report, so only empty output is a failure.
        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} audit produced no output (exit status: {}): {}",
                program,
                output.status,
                stderr.trim()
            );
        }

        String::from_utf8(output.stdout).context("Audit output is not valid UTF-8")
    }
}

fn resolve_program(program: &str) -> String {
    if cfg!(target_os = "windows") && program == "npm" {
        "npm.cmd".to_string()
    } else {
        program.to_string()
    }
}
