//! Test-only scripted command runner for probe chain tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::io::process::CommandRunner;
use crate::probe::{ExecutionMode, ProbeOutcome};

/// One recorded `execute` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedExec {
    pub command: Vec<String>,
    pub envs: Vec<(String, String)>,
    pub description: String,
    pub mode: ExecutionMode,
}

/// Command runner that resolves tools from a fixed set and answers `execute`
/// from per-program scripts, recording every invocation.
///
/// Scripts are keyed by executable basename and consumed front to back; a
/// program with no remaining scripted result succeeds. Tools not named in
/// the resolvable set fail `resolve`.
#[derive(Default)]
pub struct ScriptedRunner {
    tools: Vec<String>,
    scripts: RefCell<HashMap<String, Vec<bool>>>,
    recorded: RefCell<Vec<RecordedExec>>,
}

impl ScriptedRunner {
    /// Runner with an empty resolvable-tool set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that resolves exactly `tools` (to `/usr/bin/<tool>`).
    pub fn with_tools(tools: &[&str]) -> Self {
        Self {
            tools: tools.iter().map(|tool| (*tool).to_string()).collect(),
            ..Self::default()
        }
    }

    /// Queue scripted results for `program` (matched by basename).
    pub fn script(&self, program: &str, results: &[bool]) {
        self.scripts
            .borrow_mut()
            .entry(program.to_string())
            .or_default()
            .extend_from_slice(results);
    }

    /// All `execute` calls seen so far, in order.
    pub fn recorded(&self) -> Vec<RecordedExec> {
        self.recorded.borrow().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn execute(
        &self,
        command: &[String],
        envs: &[(String, String)],
        description: &str,
        mode: ExecutionMode,
    ) -> ProbeOutcome {
        self.recorded.borrow_mut().push(RecordedExec {
            command: command.to_vec(),
            envs: envs.to_vec(),
            description: description.to_string(),
            mode,
        });
        let program = basename(command.first().map_or("", String::as_str));
        let succeeded = match self.scripts.borrow_mut().get_mut(&program) {
            Some(queue) if !queue.is_empty() => queue.remove(0),
            _ => true,
        };
        if succeeded {
            ProbeOutcome::success(format!("{description} succeeded"))
        } else {
            ProbeOutcome::failure(format!("{description} failed"))
        }
    }

    fn resolve(&self, tool: &str) -> Option<PathBuf> {
        self.tools
            .iter()
            .any(|known| known == tool)
            .then(|| Path::new("/usr/bin").join(tool))
    }
}

fn basename(argv0: &str) -> String {
    Path::new(argv0)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| argv0.to_string())
}
