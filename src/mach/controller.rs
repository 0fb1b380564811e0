use super::{Engine, EngineFactory, Script, ENTRY};
use crate::error;
use crate::lang::{Error, ErrorCode};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loaded,
    Running,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed,
    Stopped,
    Failed(Error),
}

/// Sets the stop flag of a controller from anywhere, including a signal
/// handler. Never blocks.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

struct Inner {
    phase: Phase,
    worker: Option<JoinHandle<Outcome>>,
}

/// ## Execution controller
///
/// Owns at most one engine. Each run gets a fresh engine from the
/// factory which lives on a worker thread and is dropped before the
/// controller goes back to idle.
pub struct Controller {
    factory: EngineFactory,
    stop: Arc<AtomicBool>,
    inner: Arc<Mutex<Inner>>,
}

impl Controller {
    pub fn new(factory: EngineFactory) -> Controller {
        Controller {
            factory,
            stop: Arc::default(),
            inner: Arc::new(Mutex::new(Inner {
                phase: Phase::Idle,
                worker: None,
            })),
        }
    }

    pub fn phase(&self) -> Phase {
        self.inner.lock().phase
    }

    pub fn is_running(&self) -> bool {
        self.phase() == Phase::Running
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.stop.clone())
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Forget a pending stop request. `start` keeps the flag as it is, so
    /// a request made between this call and the run breaks the run at its
    /// first poll. The flag is also cleared when a run ends.
    pub fn clear_stop(&self) {
        self.stop.store(false, Ordering::SeqCst);
    }

    /// Build an engine, bind natives with `bind`, load the script and run
    /// it from its entry label on a worker thread. `on_exit` is called on
    /// that thread once the engine is gone and the controller is idle,
    /// also when the engine panics.
    pub fn start<B, E>(&self, script: &Script, bind: B, on_exit: E) -> Result<()>
    where
        B: FnOnce(&mut dyn Engine),
        E: FnOnce(&Outcome) + Send + 'static,
    {
        let mut inner = self.inner.lock();
        if inner.phase == Phase::Running {
            return Err(error!(InvalidState; "PROGRAM IS RUNNING"));
        }
        if let Some(worker) = inner.worker.take() {
            let _ = worker.join();
        }

        let mut engine = match (self.factory)() {
            Ok(engine) => engine,
            Err(e) => {
                warn!(error = %e, "engine construction failed");
                return Err(error!(EngineFailure; e.text()));
            }
        };
        let stop = self.stop.clone();
        let consumed = self.stop.clone();
        engine.set_interrupt_hook(Some(Box::new(move || stop.load(Ordering::SeqCst))));
        bind(engine.as_mut());
        inner.phase = Phase::Loaded;
        if let Err(e) = engine.load(script.as_str()) {
            inner.phase = Phase::Idle;
            return Err(e);
        }
        debug!("engine loaded");

        inner.phase = Phase::Running;
        let shared = self.inner.clone();
        let spawned = std::thread::Builder::new()
            .name("cartbasic-run".to_string())
            .spawn(move || {
                let called = panic::catch_unwind(AssertUnwindSafe(|| engine.call(ENTRY)));
                let outcome = match called {
                    Ok(Ok(())) => Outcome::Completed,
                    Ok(Err(e)) if e.is(ErrorCode::Break) => Outcome::Stopped,
                    Ok(Err(e)) => Outcome::Failed(e),
                    Err(_) => {
                        warn!("engine panicked");
                        Outcome::Failed(error!(EngineFailure; "ENGINE PANICKED"))
                    }
                };
                drop(engine);
                consumed.store(false, Ordering::SeqCst);
                shared.lock().phase = Phase::Idle;
                info!(?outcome, "run finished");
                on_exit(&outcome);
                outcome
            });
        match spawned {
            Ok(worker) => {
                inner.worker = Some(worker);
                info!("run started");
                Ok(())
            }
            Err(e) => {
                inner.phase = Phase::Idle;
                Err(error!(EngineFailure; &e.to_string()))
            }
        }
    }

    /// Block until the current run, if any, has finished.
    pub fn wait(&self) -> Option<Outcome> {
        let worker = self.inner.lock().worker.take()?;
        match worker.join() {
            Ok(outcome) => Some(outcome),
            Err(_) => {
                self.inner.lock().phase = Phase::Idle;
                Some(Outcome::Failed(error!(EngineFailure; "ENGINE PANICKED")))
            }
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.request_stop();
        self.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mach::Machine;
    use std::sync::mpsc;
    use std::time::Duration;

    fn controller() -> Controller {
        Controller::new(Machine::factory(16))
    }

    fn script(text: &str) -> Script {
        Script::from(text.to_string())
    }

    #[test]
    fn test_completed() {
        let c = controller();
        c.start(&script("MAIN:\n END\n"), |_| {}, |_| {}).unwrap();
        assert_eq!(c.wait(), Some(Outcome::Completed));
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.wait(), None);
    }

    #[test]
    fn test_stop_infinite_loop() {
        let c = controller();
        let (tx, rx) = mpsc::channel();
        c.start(&script("MAIN:\nL10:\n JUMP L10\n"), |_| {}, move |o| {
            tx.send(o.clone()).unwrap();
        })
        .unwrap();
        assert!(c.is_running());
        assert!(c
            .start(&script("MAIN:\n END\n"), |_| {}, |_| {})
            .unwrap_err()
            .is(ErrorCode::InvalidState));
        c.stop_handle().request();
        let sent = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(sent, Outcome::Stopped);
        assert_eq!(c.wait(), Some(Outcome::Stopped));
        c.start(&script("MAIN:\n END\n"), |_| {}, |_| {}).unwrap();
        assert_eq!(c.wait(), Some(Outcome::Completed));
    }

    #[test]
    fn test_failed() {
        let c = controller();
        c.start(&script("MAIN:\n .LINE 20\n RETURN\n"), |_| {}, |_| {})
            .unwrap();
        match c.wait() {
            Some(Outcome::Failed(e)) => {
                assert!(e.is(ErrorCode::ReturnWithoutGosub));
                assert_eq!(e.line_number(), Some(20));
            }
            o => panic!("{:?}", o),
        }
    }

    #[test]
    fn test_stop_requested_before_start_is_kept() {
        let c = controller();
        c.request_stop();
        c.start(&script("MAIN:\nL10:\n JUMP L10\n"), |_| {}, |_| {})
            .unwrap();
        assert_eq!(c.wait(), Some(Outcome::Stopped));
        assert!(!c.stop_handle().is_requested());
        c.start(&script("MAIN:\n END\n"), |_| {}, |_| {}).unwrap();
        assert_eq!(c.wait(), Some(Outcome::Completed));
    }

    #[test]
    fn test_clear_stop() {
        let c = controller();
        c.stop_handle().request();
        c.clear_stop();
        c.start(&script("MAIN:\n END\n"), |_| {}, |_| {}).unwrap();
        assert_eq!(c.wait(), Some(Outcome::Completed));
    }

    struct Exploding;

    impl Engine for Exploding {
        fn load(&mut self, _: &str) -> Result<()> {
            Ok(())
        }
        fn call(&mut self, _: &str) -> Result<()> {
            panic!("engine bug")
        }
        fn register_native(&mut self, _: &str, _: crate::mach::Native) {}
        fn set_interrupt_hook(&mut self, _: Option<crate::mach::Hook>) {}
    }

    #[test]
    fn test_engine_panic_still_exits() {
        let c = Controller::new(Arc::new(|| -> Result<Box<dyn Engine>> {
            Ok(Box::new(Exploding))
        }));
        let (tx, rx) = mpsc::channel();
        c.start(&script("MAIN:\n"), |_| {}, move |o| {
            tx.send(o.clone()).unwrap();
        })
        .unwrap();
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            Outcome::Failed(e) => assert!(e.is(ErrorCode::EngineFailure)),
            o => panic!("{:?}", o),
        }
        assert_eq!(c.phase(), Phase::Idle);
        assert!(matches!(c.wait(), Some(Outcome::Failed(_))));
    }

    #[test]
    fn test_load_and_factory_failures() {
        let c = controller();
        assert!(c.start(&script("BOGUS\n"), |_| {}, |_| {}).is_err());
        assert_eq!(c.phase(), Phase::Idle);
        let c = Controller::new(Arc::new(|| -> Result<Box<dyn Engine>> {
            Err(error!(DiskIoError; "NO ENGINE"))
        }));
        let e = c.start(&script("MAIN:\n"), |_| {}, |_| {}).unwrap_err();
        assert!(e.is(ErrorCode::EngineFailure));
    }
}
