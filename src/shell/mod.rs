/*!
## Rust Shell Module

The interactive front of cartbasic. A [`Shell`] takes one line at a time,
edits the stored program or runs a command, and reports back with a
[`Reply`] and three callback sinks. Nothing in here touches a terminal.

*/

mod auto;
mod cart;
mod classify;
mod command;
mod config;
mod storage;

pub use auto::AutoCursor;
pub use cart::{Asset, Cart, Manifest};
pub use classify::{classify, Input};
pub use command::{AssetKind, Command, Pass};
pub use config::Config;
pub use storage::{program_path, Disk, Entry, Storage};

use crate::error;
use crate::lang::{Error, Kind, LineNumber, MAX_LINE_NUMBER};
use crate::mach::{
    native, CompileError, Compiler, Controller, EngineFactory, Flags, Listing, Machine,
    NativeSet, Outcome, Output, Stage, Standard, StopHandle,
};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Receives `true` when a run starts and `false` once it is torn down.
pub type Status = Arc<dyn Fn(bool) + Send + Sync>;

/// The three independent channels a shell reports through.
#[derive(Clone)]
pub struct Sinks {
    pub output: Output,
    pub error: Output,
    pub status: Status,
}

impl Default for Sinks {
    fn default() -> Self {
        Sinks {
            output: Arc::new(|_: &str| {}),
            error: Arc::new(|_: &str| {}),
            status: Arc::new(|_: bool| {}),
        }
    }
}

/// Why a line failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    Command(Error),
    Compile(CompileError),
}

impl Failure {
    pub fn kind(&self) -> Kind {
        match self {
            Failure::Command(e) => e.kind(),
            Failure::Compile(_) => Kind::Compile,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            Failure::Command(_) => None,
            Failure::Compile(e) => Some(e.stage()),
        }
    }

    pub fn line_number(&self) -> Option<LineNumber> {
        match self {
            Failure::Command(e) => e.line_number(),
            Failure::Compile(e) => e.line_number(),
        }
    }

    pub fn error(&self) -> &Error {
        match self {
            Failure::Command(e) => e,
            Failure::Compile(e) => e.error(),
        }
    }
}

impl From<Error> for Failure {
    fn from(e: Error) -> Self {
        Failure::Command(e)
    }
}

impl From<CompileError> for Failure {
    fn from(e: CompileError) -> Self {
        Failure::Compile(e)
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Failure::Command(e) => write!(f, "{}", e),
            Failure::Compile(e) => write!(f, "{}", e),
        }
    }
}

/// Result of one `execute_line`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reply {
    pub success: bool,
    pub output: String,
    pub error: Option<Failure>,
}

impl Reply {
    pub fn ok(output: String) -> Reply {
        Reply {
            success: true,
            output,
            error: None,
        }
    }

    pub fn fail(failure: Failure) -> Reply {
        Reply {
            success: false,
            output: String::new(),
            error: Some(failure),
        }
    }
}

type Result<T> = std::result::Result<T, Failure>;

/// Everything an edit or command may change. Guarded by the session lock.
struct State {
    listing: Listing,
    auto: AutoCursor,
    scripts_directory: PathBuf,
    verbose: bool,
    flags: Flags,
    last_file: Option<PathBuf>,
    cart: Option<Cart>,
}

/// ## Shell
///
/// ```
/// use cartbasic::shell::{Config, Shell};
/// let shell = Shell::new(Config::default());
/// shell.execute_line("10 PRINT 1");
/// shell.execute_line("20 PRINT 2");
/// assert_eq!(shell.execute_line("LIST").output, "10 PRINT 1\n20 PRINT 2");
/// ```
pub struct Shell {
    config: Config,
    serial: Mutex<()>,
    state: Mutex<State>,
    compiler: Compiler,
    controller: Controller,
    natives: Vec<Arc<dyn NativeSet>>,
    storage: Arc<dyn Storage>,
    sinks: Sinks,
}

impl Shell {
    pub fn new(config: Config) -> Shell {
        let natives: Vec<Arc<dyn NativeSet>> = vec![Arc::new(Standard)];
        let state = State {
            listing: Listing::default(),
            auto: AutoCursor::default(),
            scripts_directory: config.scripts_directory.clone(),
            verbose: config.verbose,
            flags: config.flags(),
            last_file: None,
            cart: None,
        };
        Shell {
            serial: Mutex::new(()),
            state: Mutex::new(state),
            compiler: Compiler::new(Arc::new(native::registry(&natives))),
            controller: Controller::new(Machine::factory(config.poll_interval)),
            natives,
            storage: Arc::new(Disk),
            sinks: Sinks::default(),
            config,
        }
    }

    pub fn with_sinks(mut self, sinks: Sinks) -> Shell {
        self.sinks = sinks;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Shell {
        self.storage = storage;
        self
    }

    /// Add a native set. Its signatures are visible to the compiler and
    /// its bindings are installed in every engine.
    pub fn with_natives(mut self, set: Arc<dyn NativeSet>) -> Shell {
        self.natives.push(set);
        self.compiler = Compiler::new(Arc::new(native::registry(&self.natives)));
        self
    }

    pub fn with_engine(mut self, factory: EngineFactory) -> Shell {
        self.controller = Controller::new(factory);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot of the stored program.
    pub fn listing(&self) -> Listing {
        self.state.lock().listing.clone()
    }

    pub fn flags(&self) -> Flags {
        self.state.lock().flags
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.controller.stop_handle()
    }

    /// Line number AUTO would give the next bare line.
    pub fn auto_prompt(&self) -> Option<LineNumber> {
        self.state.lock().auto.peek()
    }

    /// Block until a background run has finished.
    pub fn wait(&self) -> Option<Outcome> {
        self.controller.wait()
    }

    pub fn execute_line(&self, text: &str) -> Reply {
        let _serial = self.serial.lock();
        match self.dispatch_line(text) {
            Ok(output) => Reply::ok(output),
            Err(failure) => {
                debug!(%failure, "line failed");
                Reply::fail(failure)
            }
        }
    }

    fn dispatch_line(&self, text: &str) -> Result<String> {
        match classify(text) {
            Input::Empty => {
                self.state.lock().auto.stop();
                Ok(String::new())
            }
            Input::Numbered { number, content } => {
                if number > MAX_LINE_NUMBER {
                    return Err(error!(Overflow; "LINE NUMBER").into());
                }
                let mut state = self.state.lock();
                state.listing.set_line(number, &content);
                state.auto.follow(number);
                Ok(String::new())
            }
            Input::Command { name, args } => {
                {
                    let mut state = self.state.lock();
                    if state.auto.is_active() {
                        if !Command::is_known(&name) {
                            if let Some(number) = state.auto.take() {
                                state.listing.set_line(number, text.trim());
                            }
                            return Ok(String::new());
                        }
                        state.auto.stop();
                    }
                }
                let command = Command::parse(&name, &args)?;
                debug!(?command, "dispatch");
                self.dispatch(command)
            }
        }
    }

    fn dispatch(&self, command: Command) -> Result<String> {
        match command {
            Command::List(from, to) => {
                let from = from.unwrap_or(0);
                let to = to.unwrap_or(LineNumber::max_value());
                let state = self.state.lock();
                Ok(state
                    .listing
                    .list(from..=to)
                    .map(|line| line.to_string())
                    .collect::<Vec<String>>()
                    .join("\n"))
            }
            Command::New => {
                let mut state = self.state.lock();
                state.listing.clear();
                state.last_file = None;
                Ok(String::new())
            }
            Command::Run => self.run(),
            Command::Stop => {
                self.controller.request_stop();
                Ok(String::new())
            }
            Command::Save(name) => self.save(name),
            Command::Load(name) => self.load(&name),
            Command::Auto(start, increment) => {
                if self.controller.is_running() {
                    return Err(error!(InvalidState; "PROGRAM IS RUNNING").into());
                }
                let increment = increment.unwrap_or(self.config.auto_increment);
                if increment == 0 {
                    return Err(error!(IllegalFunctionCall; "INCREMENT").into());
                }
                let start = start.unwrap_or(self.config.auto_start);
                if start > MAX_LINE_NUMBER {
                    return Err(error!(Overflow; "LINE NUMBER").into());
                }
                self.state.lock().auto.start(start, increment);
                Ok(String::new())
            }
            Command::Delete(from, to) => {
                self.state.lock().listing.remove_range(from..=to);
                Ok(String::new())
            }
            Command::Renum(start, increment, old_start) => {
                self.state.lock().listing.renum(
                    start.unwrap_or(10),
                    increment.unwrap_or(10),
                    old_start.unwrap_or(0),
                )?;
                Ok(String::new())
            }
            Command::Dir => {
                let dir = self.state.lock().scripts_directory.clone();
                let entries = self.storage.list(&dir)?;
                Ok(entries
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<String>>()
                    .join("\n"))
            }
            Command::CreateCart(path) => {
                let mut state = self.state.lock();
                let root = state.scripts_directory.join(path);
                let cart = Cart::create(self.storage.as_ref(), &root)?;
                state.cart = Some(cart);
                Ok(String::new())
            }
            Command::UseCart(path) => {
                let mut state = self.state.lock();
                let root = state.scripts_directory.join(path);
                let cart = Cart::open(self.storage.as_ref(), &root)?;
                if let Some(text) = cart.program(self.storage.as_ref())? {
                    state.listing = parse_program(&text)?;
                }
                let name = cart.manifest().name.clone();
                state.cart = Some(cart);
                Ok(format!("CART {}", name))
            }
            Command::SaveCart => {
                let mut state = self.state.lock();
                let program = state.listing.to_string();
                let cart = state.cart.as_mut().ok_or_else(|| error!(NoCart))?;
                cart.save(self.storage.as_ref(), &program)?;
                Ok(String::new())
            }
            Command::CloseCart => {
                let mut state = self.state.lock();
                state.cart.take().ok_or_else(|| error!(NoCart))?;
                Ok(String::new())
            }
            Command::Copy { kind, src, dest } => {
                let mut state = self.state.lock();
                let src = state.scripts_directory.join(src);
                let cart = state.cart.as_mut().ok_or_else(|| error!(NoCart))?;
                let asset = cart.copy(self.storage.as_ref(), kind, &src, &dest)?;
                Ok(format!("{}/{} {:08X}", kind.dir(), asset.name, asset.crc32))
            }
            Command::Verbose(on) => {
                let mut state = self.state.lock();
                if let Some(on) = on {
                    state.verbose = on;
                }
                Ok(format!("VERBOSE {}", on_off(state.verbose)))
            }
            Command::Optimize(pass) => {
                let mut state = self.state.lock();
                let flags = &mut state.flags;
                match pass {
                    None => Ok(format!(
                        "AST {}\nPEEPHOLE {}",
                        on_off(flags.ast),
                        on_off(flags.peephole)
                    )),
                    Some((Pass::Ast, on)) => {
                        flags.ast = on.unwrap_or(flags.ast);
                        Ok(format!("AST {}", on_off(flags.ast)))
                    }
                    Some((Pass::Peephole, on)) => {
                        flags.peephole = on.unwrap_or(flags.peephole);
                        Ok(format!("PEEPHOLE {}", on_off(flags.peephole)))
                    }
                }
            }
            Command::Unknown(name) => Err(error!(UnknownCommand; &name).into()),
        }
    }

    fn run(&self) -> Result<String> {
        // A stop requested from here on, even while compiling, breaks the
        // new run.
        self.controller.request_stop();
        self.controller.wait();
        self.controller.clear_stop();

        let (listing, flags, verbose) = {
            let state = self.state.lock();
            (state.listing.clone(), state.flags, state.verbose)
        };
        let script = self.compiler.compile(&listing.source(), flags)?;
        if verbose {
            (self.sinks.output)(script.as_str());
        }

        let background = self.config.background_run;
        let natives = &self.natives;
        let output = self.sinks.output.clone();
        let error_sink = self.sinks.error.clone();
        let status = self.sinks.status.clone();
        (self.sinks.status)(true);
        let started = self.controller.start(
            &script,
            |engine| {
                for set in natives {
                    set.bind(engine, &output);
                }
            },
            move |outcome| {
                if background {
                    if let Outcome::Failed(e) = outcome {
                        error_sink(&e.to_string());
                    }
                }
                status(false);
            },
        );
        if let Err(e) = started {
            warn!(error = %e, "run did not start");
            (self.sinks.status)(false);
            return Err(e.into());
        }
        if background {
            return Ok(String::new());
        }
        match self.controller.wait() {
            Some(Outcome::Failed(e)) => Err(e.into()),
            Some(Outcome::Stopped) => Ok(error!(Break).to_string()),
            _ => Ok(String::new()),
        }
    }

    fn save(&self, name: Option<String>) -> Result<String> {
        let mut state = self.state.lock();
        let path = match name {
            Some(name) => program_path(&state.scripts_directory, &name),
            None => match &state.last_file {
                Some(path) => path.clone(),
                None => return Err(error!(NothingToSave; "NO FILE NAME").into()),
            },
        };
        self.storage
            .write(&path, state.listing.to_string().as_bytes())?;
        info!(path = %path.display(), lines = state.listing.len(), "saved");
        state.last_file = Some(path);
        Ok(String::new())
    }

    fn load(&self, name: &str) -> Result<String> {
        let mut state = self.state.lock();
        let path = program_path(&state.scripts_directory, name);
        let listing = read_program(self.storage.as_ref(), &path)?;
        info!(path = %path.display(), lines = listing.len(), "loaded");
        state.listing = listing;
        state.last_file = Some(path);
        Ok(String::new())
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

fn read_program(storage: &dyn Storage, path: &Path) -> std::result::Result<Listing, Error> {
    let bytes = storage.read(path)?;
    let text = String::from_utf8(bytes).map_err(|_| error!(DiskIoError; "NOT A TEXT FILE"))?;
    parse_program(&text)
}

/// Build a listing from saved text. Errors carry the line of the file,
/// which is not the BASIC line number.
fn parse_program(text: &str) -> std::result::Result<Listing, Error> {
    let mut listing = Listing::default();
    for (index, line) in text.lines().enumerate() {
        if let Err(error) = listing.load_str(line) {
            return Err(error.message(&format!("LINE {} OF FILE", index + 1)));
        }
    }
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    fn run(shell: &Shell, lines: &[&str]) {
        for line in lines {
            let reply = shell.execute_line(line);
            assert!(reply.success, "{}: {:?}", line, reply.error);
        }
    }

    #[test]
    fn test_list_and_new() {
        let shell = Shell::new(Config::default());
        run(&shell, &["10 PRINT 1", "20 PRINT 2"]);
        assert_eq!(shell.execute_line("LIST").output, "10 PRINT 1\n20 PRINT 2");
        assert_eq!(shell.execute_line("list 15").output, "20 PRINT 2");
        run(&shell, &["NEW"]);
        assert_eq!(shell.execute_line("LIST").output, "");
    }

    #[test]
    fn test_auto_broken_by_command() {
        let shell = Shell::new(Config::default());
        run(&shell, &["AUTO 100 5", "PRINT 1", "PRINT 2"]);
        assert_eq!(shell.auto_prompt(), Some(110));
        run(&shell, &["LIST"]);
        assert_eq!(shell.auto_prompt(), None);
        let reply = shell.execute_line("PRINT 3");
        assert!(!reply.success);
        assert_eq!(
            reply.error.unwrap().to_string(),
            "Unknown command: PRINT"
        );
        assert_eq!(shell.listing().len(), 2);
    }

    #[test]
    fn test_optimize_and_verbose() {
        let shell = Shell::new(Config::default());
        assert_eq!(shell.execute_line("OPTIMIZE").output, "AST ON\nPEEPHOLE ON");
        assert_eq!(shell.execute_line("OPTIMIZE AST OFF").output, "AST OFF");
        assert!(!shell.flags().ast);
        assert_eq!(shell.execute_line("VERBOSE ON").output, "VERBOSE ON");
    }

    #[test]
    fn test_save_without_name() {
        let shell = Shell::new(Config::default());
        let reply = shell.execute_line("SAVE");
        let failure = reply.error.unwrap();
        assert_eq!(failure.kind(), Kind::State);
        assert!(failure.error().is(ErrorCode::NothingToSave));
    }

    #[test]
    fn test_parse_program() {
        let listing = parse_program("10 PRINT 1\n\n20 END\n").unwrap();
        assert_eq!(listing.len(), 2);
        let e = parse_program("10 PRINT 1\nPRINT 2\n").unwrap_err();
        assert!(e.is(ErrorCode::DirectStatementInFile));
        assert!(e.text().contains("LINE 2"));
    }
}
