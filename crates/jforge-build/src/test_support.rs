use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::process::{CommandOutput, CommandRunner, CommandSpec};

/// Records every spec and answers with a fixed exit code.
pub(crate) struct RecordingRunner {
    code: i32,
    specs: RefCell<Vec<CommandSpec>>,
}

impl RecordingRunner {
    pub(crate) fn exiting(code: i32) -> Self {
        Self {
            code,
            specs: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<CommandSpec> {
        self.specs.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput> {
        self.specs.borrow_mut().push(spec.clone());
        Ok(CommandOutput {
            code: Some(self.code),
            stdout: "stdout".to_string(),
            stderr: "stderr".to_string(),
        })
    }
}

/// Creates `<root>/<name>/bin/<binary>` and returns `<root>/<name>`.
pub(crate) fn fake_install(root: &Path, name: &str, binary: &str) -> PathBuf {
    let home = root.join(name);
    fs::create_dir_all(home.join("bin")).expect("create bin dir");
    fs::write(home.join("bin").join(binary), "#!/bin/sh\n").expect("write launcher");
    home
}
