use cartbasic::lang::{ErrorCode, Registry, Signature, Type};
use cartbasic::mach::{native, Compiler, Flags, Opcode, Script, Stage, Standard};
use std::sync::Arc;

fn compiler() -> Compiler {
    Compiler::new(Arc::new(native::registry(&[Arc::new(Standard)])))
}

fn compile(source: &str) -> Script {
    compiler().compile(source, Flags::default()).unwrap()
}

#[test]
fn test_script_parses_back() {
    let script = compile("10 FOR I=1 TO 3: PRINT I: NEXT\n20 GOSUB 40\n30 END\n40 RETURN");
    let ops = Script::parse(script.as_str()).unwrap();
    assert_eq!(ops[0], Opcode::Label("MAIN".to_string()));
    assert!(ops.contains(&Opcode::Gosub("L40".to_string())));
    assert!(ops.contains(&Opcode::Exec("PRINT".to_string(), 2)));
}

#[test]
fn test_each_stage_reports() {
    let c = compiler();
    let cases = [
        ("10 PRINT \"OPEN", Stage::Lex, ErrorCode::SyntaxError),
        ("10 FOR", Stage::Parse, ErrorCode::SyntaxError),
        ("10 NEXT", Stage::Semantic, ErrorCode::NextWithoutFor),
        ("10 FOR I=1 TO 2", Stage::Semantic, ErrorCode::ForWithoutNext),
        ("10 A$=1", Stage::Semantic, ErrorCode::TypeMismatch),
        ("10 A=FOO(1)", Stage::Semantic, ErrorCode::UndefinedFunction),
        ("10 A=LEN(\"A\",\"B\")", Stage::Semantic, ErrorCode::IllegalFunctionCall),
    ];
    for (source, stage, code) in cases.iter() {
        let e = c.compile(source, Flags::default()).unwrap_err();
        assert_eq!(e.stage(), *stage, "{}", source);
        assert!(e.error().is(*code), "{}: {}", source, e);
        assert_eq!(e.line_number(), Some(10), "{}", source);
    }
}

#[test]
fn test_division_by_zero_is_left_for_runtime() {
    let script = compile("10 A=1/0");
    assert!(script.as_str().contains("DIV"));
}

#[test]
fn test_optimizers_accept_the_same_programs() {
    let c = compiler();
    let source = "10 A=1E300*1E300: B=1/0";
    for &ast in &[false, true] {
        for &peephole in &[false, true] {
            let script = c.compile(source, Flags { ast, peephole }).unwrap();
            assert!(script.as_str().contains("MUL"));
            assert!(script.as_str().contains("DIV"));
        }
    }
}

#[test]
fn test_registry_is_caller_owned() {
    let mut registry = Registry::new();
    registry.insert("PRINT", Signature::statement(0..=255, &[]));
    registry.insert("TWICE", Signature::function(1..=1, &[Type::Number], Type::Number));
    let c = Compiler::new(Arc::new(registry));
    assert!(c.compile("10 PRINT TWICE(2)", Flags::default()).is_ok());
    let e = c.compile("10 PRINT LEN(\"X\")", Flags::default()).unwrap_err();
    assert!(e.error().is(ErrorCode::UndefinedFunction));
}

#[test]
fn test_compile_does_not_need_optimizers() {
    let flags = Flags {
        ast: false,
        peephole: false,
    };
    let script = compiler().compile("10 REM\n20 A=A", flags).unwrap();
    assert!(script.as_str().contains("POP A"));
}
