//! Test doubles for external commands

use crate::command::{CommandError, CommandOutput, CommandRunner, Invocation};
use crate::config::Layout;
use std::cell::RefCell;
use std::fs;

type Handler = Box<dyn Fn(&Invocation) -> Result<CommandOutput, CommandError>>;

/// Records every invocation and answers through a handler closure.
pub struct FakeRunner {
    calls: RefCell<Vec<Invocation>>,
    handler: Handler,
}

impl FakeRunner {
    /// Every command succeeds with empty output.
    pub fn succeeding() -> Self {
        Self::with_handler(|_| Ok(CommandOutput::default()))
    }

    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&Invocation) -> Result<CommandOutput, CommandError> + 'static,
    {
        Self {
            calls: RefCell::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.program == program)
            .cloned()
            .collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        self.calls.borrow_mut().push(invocation.clone());
        (self.handler)(invocation)
    }
}

/// A non-zero exit for `invocation`.
pub fn failure(invocation: &Invocation) -> CommandError {
    CommandError::Failed {
        command: invocation.to_string(),
        code: Some(1),
        stdout: String::new(),
        stderr: "simulated failure".to_string(),
    }
}

/// Successful output with the given stdout.
pub fn stdout(text: &str) -> CommandOutput {
    CommandOutput {
        stdout: text.to_string(),
        stderr: String::new(),
    }
}

/// Handler that plays cargo: a `cargo build --target <triple>` leaves an
/// archive where the real build would.
pub fn write_cargo_output(layout: &Layout, invocation: &Invocation) {
    if invocation.program != "cargo" {
        return;
    }
    if let Some(triple) = invocation.arg_after("--target") {
        let built = layout.cargo_output(triple);
        fs::create_dir_all(built.parent().unwrap()).unwrap();
        fs::write(&built, format!("!<arch>\n{triple}\n")).unwrap();
    }
}

/// Handler that plays every external tool well enough for a full pipeline
/// run. Archives are text files listing the triples they were built from, so
/// `lipo -info` can report what `lipo -create` and `ar` put together.
pub fn simulate_toolchain(
    layout: &Layout,
    invocation: &Invocation,
) -> Result<CommandOutput, CommandError> {
    let first = invocation.args.first().map(String::as_str);
    match (invocation.program.as_str(), first) {
        ("cargo", _) => write_cargo_output(layout, invocation),
        ("lipo", Some("-create")) => {
            let inputs = &invocation.args[1..invocation.args.len() - 2];
            let merged: String = inputs
                .iter()
                .map(|input| fs::read_to_string(input).unwrap())
                .collect();
            fs::write(invocation.arg_after("-output").unwrap(), merged).unwrap();
        }
        ("lipo", Some("-info")) => {
            let library = invocation.args.last().unwrap();
            let content = fs::read_to_string(library).unwrap();
            let archs: Vec<&str> = content.lines().filter_map(arch_of_triple).collect();
            return Ok(stdout(&format!(
                "Architectures in the fat file: {library} are: {}",
                archs.join(" ")
            )));
        }
        ("ar", Some("x")) => {
            let library = invocation.args.last().unwrap();
            fs::copy(library, invocation.cwd.join("idevice.o")).unwrap();
        }
        ("ar", Some("rcs")) => {
            let merged: String = invocation.args[2..]
                .iter()
                .map(|object| fs::read_to_string(object).unwrap())
                .collect();
            fs::write(&invocation.args[1], merged).unwrap();
        }
        _ => {}
    }
    Ok(CommandOutput::default())
}

fn arch_of_triple(triple: &str) -> Option<&'static str> {
    match triple.split('-').next() {
        Some("aarch64") => Some("arm64"),
        Some("x86_64") => Some("x86_64"),
        _ => None,
    }
}
