use cartbasic::shell::{Config, Reply, Shell, Sinks};
use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::TempDir;

/// A shell whose sinks are captured and whose scripts directory is a
/// scratch directory removed when the harness drops.
pub struct Harness {
    pub shell: Shell,
    pub dir: TempDir,
    output: Arc<Mutex<String>>,
    errors: Arc<Mutex<Vec<String>>>,
    status: Arc<Mutex<Vec<bool>>>,
}

pub fn harness() -> Harness {
    harness_with(|_| {})
}

pub fn harness_with<F: FnOnce(&mut Config)>(configure: F) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.scripts_directory = dir.path().to_path_buf();
    configure(&mut config);

    let output = Arc::new(Mutex::new(String::new()));
    let errors = Arc::new(Mutex::new(Vec::new()));
    let status = Arc::new(Mutex::new(Vec::new()));
    let (o, e, s) = (output.clone(), errors.clone(), status.clone());
    let sinks = Sinks {
        output: Arc::new(move |text: &str| o.lock().push_str(text)),
        error: Arc::new(move |text: &str| e.lock().push(text.to_string())),
        status: Arc::new(move |running: bool| s.lock().push(running)),
    };
    Harness {
        shell: Shell::new(config).with_sinks(sinks),
        dir,
        output,
        errors,
        status,
    }
}

impl Harness {
    pub fn enter(&self, line: &str) -> Reply {
        self.shell.execute_line(line)
    }

    /// Enter every line, failing the test on the first unsuccessful one.
    pub fn enter_all(&self, lines: &[&str]) {
        for line in lines {
            let reply = self.enter(line);
            assert!(reply.success, "{:?} failed: {:?}", line, reply.error);
        }
    }

    /// Program output since the last call.
    pub fn output(&self) -> String {
        std::mem::take(&mut *self.output.lock())
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    pub fn status(&self) -> Vec<bool> {
        self.status.lock().clone()
    }
}
