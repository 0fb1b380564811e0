use super::{codegen, flow, script, Script};
use crate::lang::{analyze, fold, lex, parse, peephole, Error, LineNumber, Registry};
use std::sync::Arc;
use tracing::{debug, info, info_span};

/// Optional optimizer passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    pub ast: bool,
    pub peephole: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Flags {
            ast: true,
            peephole: true,
        }
    }
}

/// The compiler stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Parse,
    Semantic,
    Codegen,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Stage::Lex => "lex",
            Stage::Parse => "parse",
            Stage::Semantic => "semantic",
            Stage::Codegen => "codegen",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    stage: Stage,
    error: Error,
}

impl CompileError {
    pub fn new(stage: Stage, error: Error) -> CompileError {
        CompileError { stage, error }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn error(&self) -> &Error {
        &self.error
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn line_number(&self) -> Option<LineNumber> {
        self.error.line_number()
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} error: {}", self.stage, self.error)
    }
}

impl std::error::Error for CompileError {}

fn at(stage: Stage) -> impl Fn(Error) -> CompileError {
    move |error| CompileError::new(stage, error)
}

/// ## Compile orchestrator
///
/// Runs every stage in order on a source snapshot and stops at the first
/// failure. Holds nothing but the native registry it was built with.
#[derive(Debug, Clone)]
pub struct Compiler {
    registry: Arc<Registry>,
}

impl Compiler {
    pub fn new(registry: Arc<Registry>) -> Compiler {
        Compiler { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn compile(&self, source: &str, flags: Flags) -> Result<Script, CompileError> {
        let span = info_span!("compile", ast = flags.ast, peephole = flags.peephole);
        let _enter = span.enter();

        let lexed = lex(source).map_err(at(Stage::Lex))?;
        debug!(lines = lexed.len(), "lexed");
        let program = parse(&lexed).map_err(at(Stage::Parse))?;
        debug!("parsed");
        let mut program = analyze(program, &self.registry).map_err(at(Stage::Semantic))?;
        debug!("analyzed");
        if flags.ast {
            program = fold(program);
            debug!("folded");
        }
        if flags.peephole {
            program = peephole(program);
            debug!("peephole");
        }
        let flow = flow::build(&program);
        let program = flow.prune(program);
        debug!(unreachable = flow.unreachable().count(), "control flow");
        let ir = codegen::codegen(&program).map_err(at(Stage::Codegen))?;
        debug!(ops = ir.len(), "intermediate code");
        let script = script::emit(&ir).map_err(at(Stage::Codegen))?;
        info!(bytes = script.len(), "compiled");
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;
    use crate::mach::{native, Standard};

    fn compiler() -> Compiler {
        Compiler::new(Arc::new(native::registry(&[Arc::new(Standard)])))
    }

    #[test]
    fn test_stage_attribution() {
        let c = compiler();
        let e = c.compile("10 PRINT \"OPEN", Flags::default()).unwrap_err();
        assert_eq!(e.stage(), Stage::Lex);
        let e = c.compile("10 PRINT (1", Flags::default()).unwrap_err();
        assert_eq!(e.stage(), Stage::Parse);
        let e = c.compile("10 PRINT 1\n20 GOTO 99", Flags::default()).unwrap_err();
        assert_eq!(e.stage(), Stage::Semantic);
        assert_eq!(e.line_number(), Some(20));
        assert!(e.error().is(ErrorCode::UndefinedLine));
    }

    #[test]
    fn test_flags_change_output() {
        let c = compiler();
        let src = "10 A=1+2: REM SUM";
        let plain = c
            .compile(src, Flags { ast: false, peephole: false })
            .unwrap();
        let opt = c.compile(src, Flags::default()).unwrap();
        assert!(plain.as_str().contains("ADD"));
        assert!(!opt.as_str().contains("ADD"));
        assert!(opt.as_str().contains("LIT 3"));
    }

    #[test]
    fn test_unreachable_lines_are_dropped() {
        let c = compiler();
        let script = c
            .compile("10 GOTO 30\n20 PRINT 2\n30 END", Flags::default())
            .unwrap();
        assert!(!script.as_str().contains("L20:"));
    }
}
