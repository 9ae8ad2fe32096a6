use std::{
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use malang::{
    Error,
    interpreter::value::{number::Number, operation::Operation},
    options::RunOptions,
    run_file,
    run_source,
};
use num_bigint::BigUint;
use pretty_assertions::assert_eq;
use walkdir::WalkDir;

fn manifest_dir() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

fn options() -> RunOptions {
    RunOptions::default().with_std_lib_dir(manifest_dir().join("std_libs"))
}

fn run_with(src: &str, arguments: &[i64]) -> Result<Rc<Operation>, Error> {
    let arguments = arguments.iter().map(|&a| Number::from(a)).collect();
    run_source(&manifest_dir().join("inline.mlg"), src, &options().with_arguments(arguments))
}

fn run(src: &str) -> Result<Rc<Operation>, Error> {
    run_with(src, &[])
}

fn assert_success(src: &str, expected: &str) {
    match run(src) {
        Ok(program) => assert_eq!(program.result().to_string(), expected, "for script:\n{src}"),
        Err(e) => panic!("Script failed: {e}\n{src}"),
    }
}

fn assert_failure(src: &str, message: &str) {
    match run(src) {
        Ok(program) => panic!("Script succeeded with {} but was expected to fail", program.result()),
        Err(e) => {
            let rendered = e.to_string();
            assert!(rendered.contains(message), "expected `{message}` in:\n{rendered}");
        },
    }
}

#[test]
fn demo_programs_work() {
    let mut count = 0;

    for entry in
        WalkDir::new(manifest_dir().join("demos")).into_iter()
                                                  .filter_map(Result::ok)
                                                  .filter(|e| e.path().extension().is_some_and(|ext| ext == "mlg"))
    {
        let path = entry.path();
        let content =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));
        let expected = content.lines()
                              .find_map(|line| line.strip_prefix("# expect:"))
                              .map(str::trim)
                              .unwrap_or_else(|| panic!("{path:?} declares no expected value"));

        count += 1;
        match run_file(path, &options()) {
            Ok(program) => assert_eq!(program.result().to_string(), expected, "in {path:?}"),
            Err(e) => panic!("Demo {path:?} failed:\n{e}"),
        }
    }

    assert!(count > 0, "No demo programs found in demos/");
}

#[test]
fn arithmetic_and_precedence() {
    assert_success("res = 2 + 3 * 4", "14");
    assert_success("res = 2 * (3 + 4)", "14");
    assert_success("res = 10 - 2 - 3", "5");
    assert_success("res = 8 - 3 - 2", "3");
    assert_success("res = (2 + 3) * 4", "20");
    assert_success("res = 2 ^ 3 ^ 2", "64");
    assert_success("res = 7 / 2", "3.5");
    assert_success("res = 8 / 2", "4");
    assert_success("res = 7 // 2", "3");
    assert_success("res = -7 // 2", "-4");
    assert_success("res = 1_000 * 1_000", "1000000");
}

#[test]
fn result_is_always_an_operation() {
    let program = run("res = 5").unwrap();
    assert_eq!(program.show(), "5 + 0");
    assert_eq!(program.operations_count(), &BigUint::from(1u32));

    let program = run("").unwrap();
    assert_eq!(program.result(), &Number::from(0));

    let program = run("res = 1 + 2 * 3").unwrap();
    assert_eq!(program.show(), "1 + (2 * 3)");
    assert_eq!(program.operations_count(), &BigUint::from(2u32));
}

#[test]
fn variables_share_their_operations() {
    let program = run("x = 2 * 3\ny = x + x\nres = y").unwrap();
    assert_eq!(program.result(), &Number::from(12));
    assert_eq!(program.show(), "(2 * 3) + (2 * 3)");
    assert_eq!(program.operations_count(), &BigUint::from(3u32));

    assert_success("x = 1; x = x + 1; res = x", "2");
    assert_failure("res = y", "INVALID CODE: Unknown variable `y`");
}

#[test]
fn functions() {
    assert_success("def f(x) {\n  ret x\n  res = 100\n}\nres = f(3)", "3");
    assert_success("def f(x) { res = x; ret; res = 9 }\nres = f(4)", "4");
    assert_success("def f(x) { ret x }\ndef f(x, y) { ret x + y }\nres = f(1) + f(2, 3)", "6");
    assert_success("def outer(x) {\n  def inner(y) { ret y * 2 }\n  ret inner(x) + 1\n}\nres = outer(5)",
                   "11");
    assert_success("res = {\n  a = 4\n  ret a * a\n} - 1", "15");
    assert_success("def f(a,\n      b) { ret a - b }\nres = f(\n  9,\n  4\n)", "5");
}

#[test]
fn function_errors() {
    assert_failure("def f(x) { ret x }\ndef f(y) { ret y }",
                   "INVALID CODE: The function `f` cannot be defined again");
    assert_failure("res = g(1)", "INVALID CODE: Unknown function `g`");
    assert_failure("def f(x) { ret x }\nres = f(1, 2)", "Unknown function `f`");
    assert_failure("def f(x) { ret f(x) }", "Unknown function `f`");
    assert_failure("def f() { ret g() }\ndef g() { ret 1 }", "Unknown function `g`");
}

#[test]
fn recursion_through_shadowing_is_rejected() {
    let src = "def g() { ret 1 }\n\
               def f() { ret g() }\n\
               res = {\n\
               \x20 def g() { ret f() }\n\
               \x20 ret g()\n\
               }";
    assert_failure(src, "The function `g` is already being executed");
}

#[test]
fn external_assignments() {
    assert_success("x = 1\ndef set() { ext x = 5 }\nset()\nres = x", "5");
    assert_success("x = 1\n{\n  x = 2\n  {\n    ext x = x * 10\n  }\n  ext x = x + 1\n}\nres = x",
                   "21");
    assert_success("res = 3\nres = { ret ext_res * 2 }", "6");
    assert_failure("ext x = 1", "The external variable `x` does not exist in any enclosing scope");
    assert_failure("{ ext y = 1 }", "The external variable `y` does not exist");
    assert_failure("res = ext_res", "This is the main scope");
}

#[test]
fn for_loops() {
    assert_success("res = 0\nfor(3) { res = res + 2 }", "6");
    assert_success("res = 0\nfor(2 : 4) { res = res + 1 }", "3");
    assert_success("n = 4\nres = 0\nfor(i : 1 : n) { res = res + i }", "10");
    assert_success("res = 0\nfor(i : 1 : 10 : -3) { res = res * 100 + i }", "10070401");
    assert_success("res = 0\nfor(i : 1 : 2) {\n  for(j : 1 : i) { res = res + j }\n}", "4");
    assert_success("res = 0\nfor(i : 1 : 0) { res = 1 }", "0");
    assert_success("total = 0\nfor(i: 1:5) { total = total + i }\nres = total", "15");
    assert_success("res = 0\nfor(i: 5:1:-1) { res = res * 10 + i }", "54321");
    assert_success("def sum(n) {\n  for(i : 1 : n) { res = res + i }\n}\nres = sum(4)", "10");
}

#[test]
fn for_loop_errors() {
    assert_failure("for(i : 1 : 5 : 0) { res = i }", "For loops can't have a zero step");
    assert_failure("s = 0\nfor(i : 1 : 5 : s) { res = i }", "For loops can't have a zero step");
    assert_failure("for() { res = 1 }", "SYNTAX ERROR: Must specify at least the end index");
    assert_failure("for(i : 1 : 2 : 3 : 4 : 5) { res = 1 }", "You have 2 too many `:`");
    assert_failure("for(2 : 1 : 3) { res = 1 }", "single identifier naming the variable");
}

#[test]
fn main_function() {
    let program = run_with("def main(a, b) { res = a - b }", &[10, 4]).unwrap();
    assert_eq!(program.result(), &Number::from(6));

    let program = run_with("x = 100\ndef main(a) { res = x + a }", &[-1]).unwrap();
    assert_eq!(program.result(), &Number::from(99));

    let err = run_with("def main(a, b) { res = a }", &[1]).unwrap_err();
    assert!(err.to_string()
               .contains("This main function requires 2 parameters, yet only 1 argument was given"));

    let err = run_with("def main(a, b) { res = a }", &[1, 2, 3]).unwrap_err();
    assert!(err.to_string()
               .contains("3 arguments were given, but this main function only takes 2 parameters"));

    let err = run_with("def main() { res = 1 }", &[1, 2]).unwrap_err();
    assert!(err.to_string()
               .contains("2 arguments were given, but this main function takes 0 parameters"));

    assert_success("res = {\n  def main(x) { ret x }\n  ret main(3)\n}", "3");
}

#[test]
fn aliases() {
    assert_success("$neg def negate(a) { ret 0 - a }\nres = $neg 5 * 2", "-10");
    assert_success("@plus def add(a, b) { ret a + b }\nres = 1 * 2 @plus 3 * 4", "20");
    assert_success("@plus\ndef add(a, b) { ret a + b }\nres = 1 @plus 2", "3");
    assert_success("$neg def negate(a) { ret 0 - a }\nres = negate(3)", "-3");
    assert_success("$double def twice(a) { ret a * 2 }\nres = $double 5 - twice(5)", "0");
    assert_failure("$neg def negate(a, b) { ret a }",
                   "SYNTAX ERROR: This function definition is preceded by the alias `$neg`");
    assert_failure("res = $neg 1", "Unknown function `$neg`");
    assert_failure("$double def twice(a) { ret a * 2 }\nres = 5 $double",
                   "What is this `$double` doing here?");
    assert_failure("$neg\nres = 1", "A function definition was expected after this alias");
}

#[test]
fn square_then_root_stays_exact() {
    let program = run("x = 10 ^ 40\nres = ((0 - x) ^ 2) ^ 0.5").unwrap();
    assert_eq!(program.result().to_string(), format!("1{}", "0".repeat(40)));
}

#[test]
fn literals() {
    assert_success("res = \"Hi\"", "18537");
    assert_success("res = 'a' + 1", "98");
    assert_success("res = '\\n'", "10");
    assert_failure("res = \"\"", "PARSING ERROR: Strings can't be empty");
    assert_failure("res = 'ab'", "PARSING ERROR: Characters must contain one single character");
    assert_failure("res = 1__0", "PARSING ERROR: Couldn't parse this number");
    assert_failure("res = 1 ? 2", "PARSING ERROR: Unexpected / unacceptable character");
}

#[test]
fn syntax_errors() {
    assert_failure("res = (1 + 2", "SYNTAX ERROR: The enclosing element for this one is missing");
    assert_failure("res = 1 +", "SYNTAX ERROR");
    assert_failure("res 1", "SYNTAX ERROR");
    assert_failure("def (x) { ret x }", "SYNTAX ERROR");
    assert_failure("def f(x,) { ret x }", "There is an extra comma");
}

#[test]
fn arithmetic_errors_are_invalid_code() {
    assert_failure("res = 1 / 0", "INVALID CODE");
    assert_failure("x = 0\nres = 5 // x", "INVALID CODE");
    assert_failure("res = (0 - 4) ^ 0.5", "INVALID CODE");
    assert_failure("res = 10 ^ 400 * 0.5",
                   "INVALID CODE: This number is too large to be used as a real number");
    assert_failure("res = (10 ^ 400 + 1) / 3", "too large to be used as a real number");
}

#[test]
fn huge_integers_divide_exactly_or_round_once() {
    assert_success("res = (10 ^ 400 + 1) / 10 ^ 400", "1");
    assert_success("res = 10 ^ 400 / 10 ^ 399", "10");
    assert_success("res = 10 ^ 400 / (3 * 10 ^ 400)", "0.3333333333333333");
}

#[test]
fn errors_point_at_their_token() {
    let err = run("x = 1\nres = x + nope").unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains(">>>nope<<<"), "{rendered}");
    assert!(rendered.contains("line: 2, column: 11"), "{rendered}");
}

#[test]
fn standard_library() {
    assert_success("include std\nres = max(3, 9) * 100 + min(3, 9)", "903");
    assert_success("include std\nres = floor(7.9) + sign(0 - 4)", "6");
    assert_success("include std\nres = 17 @mod 5", "2");
    assert_success("include std\nres = $abs (0 - 2.5)", "2.5");
    assert_success("include std\nres = not(0) @and 1 @or 0", "1");
    assert_success("include std\nres = if(0, 1, 2) * 10 + if(1, 1, 2)", "21");
    assert_success("include std\nres = is_zero(0) + is_zero(3) + sign(0)", "1");
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn includes_next_to_the_main_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "lib.mlg", "def triple(x) { ret 3 * x }\n");
    let main = dir.path().join("main.mlg");

    let program = run_source(&main, "include lib\nres = triple(4)", &options()).unwrap();
    assert_eq!(program.result(), &Number::from(12));

    // The same file is spliced once, however it is named.
    let program = run_source(&main, "include lib, lib.mlg\ninclude lib # again\nres = triple(2)", &options())
        .unwrap();
    assert_eq!(program.result(), &Number::from(6));

    let err = run_source(&main, "include nothing_here\nres = 1", &options()).unwrap_err();
    assert!(matches!(err, Error::NoSuchFile { ref path, .. } if path == "nothing_here"));
    assert!(err.to_string().starts_with("NO SUCH FILE"));
}

#[test]
fn includes_fall_back_to_the_std_lib_dir() {
    let project = tempfile::tempdir().unwrap();
    let libs = tempfile::tempdir().unwrap();
    write(libs.path(), "extra.mlg", "include helper\ndef quad(x) { ret 2 * double(x) }\n");
    write(libs.path(), "helper.mlg", "def double(x) { ret x + x }\n");

    let options = RunOptions::default().with_std_lib_dir(libs.path());
    let program = run_source(&project.path().join("main.mlg"), "include extra\nres = quad(5)", &options).unwrap();
    assert_eq!(program.result(), &Number::from(20));
}

#[test]
fn entry_files() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "program.mlg", "res = 2 ^ 10\n");

    let program = run_file(&dir.path().join("program"), &options()).unwrap();
    assert_eq!(program.result(), &Number::from(1024));

    let program = run_file(&dir.path().join("program.mlg"), &options()).unwrap();
    assert_eq!(program.result(), &Number::from(1024));

    let err = run_file(&dir.path().join("missing"), &options()).unwrap_err();
    assert!(matches!(err, Error::MissingFile { .. }));
    assert!(err.to_string().starts_with("FILE DOES NOT EXIST"));
}

#[test]
fn deep_programs_do_not_overflow() {
    let mut src = String::new();
    for _ in 0..500 {
        src.push_str("res = {\n");
    }
    src.push_str("ret 1\n");
    for _ in 0..500 {
        src.push_str("} + 1\n");
    }
    assert_success(&src, "501");

    let chain = vec!["1"; 200_000].join(" + ");
    assert_success(&format!("res = {chain}"), "200000");

    let chain = vec!["x"; 200_000].join(" + ");
    assert_success(&format!("x = 1\nres = {chain}"), "200000");
}
