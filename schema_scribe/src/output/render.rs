//! Diagram rendering through an external layout tool

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::config::DiagramConfig;
use crate::error::{Error, Result};

/// Turns a diagram description into an image at `output`
pub trait DiagramRenderer {
    fn render(&self, diagram: &str, output: &Path) -> Result<()>;
}

/// Runs a program with the diagram text on stdin
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    /// `{output}` in `args` is replaced with the image path
    pub fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
        }
    }

    pub fn from_config(config: &DiagramConfig) -> Self {
        Self::new(&config.program, config.args.clone())
    }

    fn expand_args(&self, output: &Path) -> Vec<String> {
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{output}", &output))
            .collect()
    }
}

impl DiagramRenderer for CommandRenderer {
    fn render(&self, diagram: &str, output: &Path) -> Result<()> {
        let args = self.expand_args(output);
        tracing::debug!(program = %self.program, ?args, "Running diagram renderer");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::RenderError(format!("Failed to start {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(diagram.as_bytes())?;
        }

        let result = child.wait_with_output()?;
        if !result.status.success() {
            return Err(Error::RenderError(format!(
                "{} exited with {}: {}",
                self.program,
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        tracing::info!(path = %output.display(), "Rendered diagram image");
        Ok(())
    }
}
