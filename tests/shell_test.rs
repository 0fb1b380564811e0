mod common;
use cartbasic::lang::{ErrorCode, Kind};
use cartbasic::mach::Stage;
use common::*;

#[test]
fn test_list_then_new() {
    let h = harness();
    h.enter_all(&["10 PRINT 1", "20 PRINT 2"]);
    assert_eq!(h.enter("LIST").output, "10 PRINT 1\n20 PRINT 2");
    h.enter_all(&["NEW"]);
    assert_eq!(h.enter("LIST").output, "");
}

#[test]
fn test_lines_replace_and_delete() {
    let h = harness();
    h.enter_all(&["20 PRINT 2", "10 PRINT 1", "20 PRINT 3", "10"]);
    assert_eq!(h.enter("list").output, "20 PRINT 3");
    h.enter_all(&["# a comment", "   ", "999"]);
    assert_eq!(h.enter("LIST").output, "20 PRINT 3");
}

#[test]
fn test_list_range() {
    let h = harness();
    h.enter_all(&["10 A=1", "20 A=2", "30 A=3", "40 A=4"]);
    assert_eq!(h.enter("LIST 20 30").output, "20 A=2\n30 A=3");
    assert_eq!(h.enter("LIST 30").output, "30 A=3\n40 A=4");
    assert_eq!(h.enter("LIST 30 20").output, "");
}

#[test]
fn test_auto_numbering() {
    let h = harness();
    h.enter_all(&["AUTO 100 5", "PRINT 1", "PRINT 2", "PRINT 3"]);
    assert_eq!(
        h.enter("LIST").output,
        "100 PRINT 1\n105 PRINT 2\n110 PRINT 3"
    );
    let reply = h.enter("PRINT 4");
    assert!(!reply.success);
    assert_eq!(h.shell.listing().len(), 3);
}

#[test]
fn test_auto_follows_explicit_numbers_and_blank_line() {
    let h = harness();
    h.enter_all(&["AUTO", "A=1", "50 A=2", "A=3"]);
    assert_eq!(h.shell.auto_prompt(), Some(70));
    h.enter_all(&[""]);
    assert_eq!(h.shell.auto_prompt(), None);
    assert_eq!(h.enter("LIST").output, "10 A=1\n50 A=2\n60 A=3");
}

#[test]
fn test_unknown_command() {
    let h = harness();
    let reply = h.enter("frobnicate now");
    assert!(!reply.success);
    let failure = reply.error.unwrap();
    assert_eq!(failure.to_string(), "Unknown command: FROBNICATE");
    assert_eq!(failure.kind(), Kind::Parse);
}

#[test]
fn test_bad_arguments() {
    let h = harness();
    let failure = h.enter("LIST TEN").error.unwrap();
    assert!(failure.error().is(ErrorCode::SyntaxError));
    assert!(!h.enter("AUTO 10 0").success);
    assert!(h.enter("LIST").success);
}

#[test]
fn test_renum_rewrites_targets() {
    let h = harness();
    h.enter_all(&["5 PRINT 1", "7 GOTO 5", "9 IF 1 THEN 7 ELSE 5"]);
    h.enter_all(&["RENUM 100 10"]);
    assert_eq!(
        h.enter("LIST").output,
        "100 PRINT 1\n110 GOTO 100\n120 IF 1 THEN 110 ELSE 100"
    );
}

#[test]
fn test_delete() {
    let h = harness();
    h.enter_all(&["10 A=1", "20 A=2", "30 A=3"]);
    h.enter_all(&["DELETE 15 25", "DELETE 500 600", "DELETE 30"]);
    assert_eq!(h.enter("LIST").output, "10 A=1");
}

#[test]
fn test_run_output() {
    let h = harness();
    h.enter_all(&[
        "10 FOR I=1 TO 3",
        "20 PRINT I;",
        "30 NEXT I",
        "40 PRINT",
        "50 PRINT \"A\";LEN(\"HELLO\")",
        "RUN",
    ]);
    assert_eq!(h.output(), " 1  2  3 \nA 5 \n");
    assert_eq!(h.status(), vec![true, false]);
}

#[test]
fn test_gosub_and_if() {
    let h = harness();
    h.enter_all(&[
        "10 A$=\"X\"",
        "20 GOSUB 100",
        "30 IF A$=\"Y\" THEN PRINT \"YES\" ELSE PRINT \"NO\"",
        "40 END",
        "100 A$=\"Y\": RETURN",
        "RUN",
    ]);
    assert_eq!(h.output(), "YES\n");
}

#[test]
fn test_semantic_error_stops_compile() {
    let h = harness();
    h.enter_all(&["10 PRINT 1", "20 GOTO 99"]);
    let reply = h.enter("RUN");
    assert!(!reply.success);
    let failure = reply.error.unwrap();
    assert_eq!(failure.stage(), Some(Stage::Semantic));
    assert_eq!(failure.line_number(), Some(20));
    assert_eq!(failure.kind(), Kind::Compile);
    assert_eq!(h.output(), "");
    assert!(h.status().is_empty());
}

#[test]
fn test_parse_error_stage() {
    let h = harness();
    h.enter_all(&["10 PRINT (1"]);
    let failure = h.enter("RUN").error.unwrap();
    assert_eq!(failure.stage(), Some(Stage::Parse));
    assert!(failure.to_string().starts_with("parse error: "));
}

#[test]
fn test_runtime_error_leaves_shell_usable() {
    let h = harness();
    h.enter_all(&["10 A=0", "20 PRINT 1/A"]);
    let failure = h.enter("RUN").error.unwrap();
    assert_eq!(failure.kind(), Kind::Runtime);
    assert!(failure.error().is(ErrorCode::DivisionByZero));
    assert_eq!(failure.line_number(), Some(20));
    assert!(!h.shell.is_running());
    assert_eq!(h.enter("LIST").output, "10 A=0\n20 PRINT 1/A");
    h.enter_all(&["10 A=2", "RUN"]);
    assert_eq!(h.output(), " 0.5 \n");
}

#[test]
fn test_verbose_prints_script() {
    let h = harness();
    h.enter_all(&["VERBOSE ON", "10 END", "RUN"]);
    let out = h.output();
    assert!(out.contains("MAIN:"));
    assert!(out.contains("L10:"));
}

#[test]
fn test_optimizer_flags_reach_compiler() {
    let h = harness();
    h.enter_all(&["10 A=1+2", "VERBOSE ON"]);
    h.enter_all(&["RUN"]);
    assert!(!h.output().contains("ADD"));
    h.enter_all(&["OPTIMIZE AST OFF", "RUN"]);
    assert!(h.output().contains("ADD"));
}

#[test]
fn test_overflow_on_dead_line_runs_with_either_ast_setting() {
    let h = harness();
    h.enter_all(&["10 PRINT 1", "20 END", "30 A=1E300*1E300", "RUN"]);
    assert_eq!(h.output(), " 1 \n");
    h.enter_all(&["OPTIMIZE AST OFF", "RUN"]);
    assert_eq!(h.output(), " 1 \n");
}

#[test]
fn test_folded_overflow_fails_at_runtime() {
    let h = harness();
    h.enter_all(&["10 PRINT 1", "20 A=1E300*1E300"]);
    let failure = h.enter("RUN").error.unwrap();
    assert_eq!(failure.kind(), Kind::Runtime);
    assert!(failure.error().is(ErrorCode::Overflow));
    assert_eq!(failure.line_number(), Some(20));
}

#[test]
fn test_huge_line_number_is_rejected() {
    let h = harness();
    let failure = h.enter("99999999999 PRINT 1").error.unwrap();
    assert!(failure.error().is(ErrorCode::Overflow));
    h.enter_all(&["AUTO 100 5", "PRINT 1"]);
    let failure = h.enter("99999999999 PRINT 2").error.unwrap();
    assert!(failure.error().is(ErrorCode::Overflow));
    h.enter_all(&["PRINT 3", ""]);
    assert_eq!(h.enter("LIST").output, "100 PRINT 1\n105 PRINT 3");
}
