mod common;

use arrowlang::Value;
use common::{eval, eval_error, eval_lines, run_lines};

#[test]
fn test_if_picks_first_true_branch() {
    assert_eq!(eval("if 1 do 10 else 20"), Value::int(10));
    assert_eq!(eval("if 0 do 10 else 20"), Value::int(20));
    assert_eq!(eval("if 0 do 1 elif 0 do 2 elif 3 do 3 else 4"), Value::int(3));
    assert_eq!(eval(r#"if "" do 1 else 2"#), Value::int(2));
}

#[test]
fn test_if_without_match_has_no_value() {
    assert_eq!(run_lines(&["if 0 do 1"]).unwrap(), None);
}

#[test]
fn test_if_short_circuits_later_guards() {
    assert_eq!(eval("if 1 do 1 elif undefined_name do 2"), Value::int(1));
    assert_eq!(eval("if 0 do undefined_name else 2"), Value::int(2));
}

#[test]
fn test_for_excludes_end_bound() {
    let x = eval_lines(&["for i from 0 to 5 then set x = i", "x"]);
    assert_eq!(x, Value::int(4));
}

#[test]
fn test_for_counts_down_with_negative_step() {
    let x = eval_lines(&["for i from 5 to 0 by -1 then set x = i", "x"]);
    assert_eq!(x, Value::int(1));
}

#[test]
fn test_for_accumulates() {
    let total = eval_lines(&[
        "set total = 0",
        "for i from 1 to 11 then set total = total + i",
        "total",
    ]);
    assert_eq!(total, Value::int(55));

    let evens = eval_lines(&["set n = 0", "for i from 0 to 10 by 2 then set n = n + 1", "n"]);
    assert_eq!(evens, Value::int(5));
}

#[test]
fn test_loop_variable_outlives_loop() {
    assert_eq!(eval_lines(&["for i from 0 to 3 then 0", "i"]), Value::int(2));
}

#[test]
fn test_for_never_runs_against_its_direction() {
    let result = run_lines(&["for i from 0 to 5 by -1 then set hit = 1", "hit"]);
    assert_eq!(result.unwrap_err().message, "hit is not defined");

    let result = run_lines(&["for i from 5 to 0 then set hit = 1", "hit"]);
    assert_eq!(result.unwrap_err().message, "hit is not defined");
}

#[test]
fn test_for_with_float_step() {
    let count = eval_lines(&["set n = 0", "for i from 0 to 1 by 0.25 then set n = n + 1", "n"]);
    assert_eq!(count, Value::int(4));
}

#[test]
fn test_while_loop() {
    let result = eval_lines(&["set acc = 1", "while acc < 1000 then set acc = acc * 2", "acc"]);
    assert_eq!(result, Value::int(1024));

    let result = eval_lines(&["set n = 0", "while n < 3 then set n = n + 1", "n"]);
    assert_eq!(result, Value::int(3));
}

#[test]
fn test_loops_have_no_value() {
    assert_eq!(run_lines(&["for i from 0 to 2 then i"]).unwrap(), None);
    assert_eq!(run_lines(&["while 0 then 1"]).unwrap(), None);
}

#[test]
fn test_loop_body_error_aborts() {
    let error = eval_error("for i from 0 to 5 then 1 / (i - 2)");
    assert_eq!(error.message, "Division By Zero");
}

#[test]
fn test_loop_as_operand_has_no_value() {
    let error = eval_error("1 + (while 0 then 1)");
    assert_eq!(error.message, "expression has no value");
}
