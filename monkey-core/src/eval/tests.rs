use pretty_assertions::assert_eq;

use crate::{
    environment::prelude::{Env, Environment, Object, FALSE, NULL, TRUE},
    parser::prelude::{parse_program, Program}
};

use super::prelude::{define_macros, eval_program, expand_macros, MacroError};

fn parse_ok(input: &str) -> Program {
    let parsed = parse_program(input);

    assert!(
        !parsed.has_errors(),
        "parser errors for {input:?}: {:?}",
        parsed.errors.iter().map(|err| err.to_string()).collect::<Vec<_>>()
    );

    parsed.program
}

fn test_eval(input: &str) -> Object {
    let env = Environment::new();

    eval_program(&parse_ok(input), &env)
}

fn int(value: i64) -> Object {
    Object::Integer { value }
}

fn error(message: &str) -> Object {
    Object::error(message)
}

fn check(tests: &[(&str, Object)]) {
    for (input, expected) in tests {
        assert_eq!(&test_eval(input), expected, "input: {input}");
    }
}

#[test]
fn test_integer_expressions() {
    check(&[
        ("5", int(5)),
        ("10", int(10)),
        ("-5", int(-5)),
        ("-10", int(-10)),
        ("5 + 5 + 5 + 5 - 10", int(10)),
        ("2 * 2 * 2 * 2 * 2", int(32)),
        ("-50 + 100 + -50", int(0)),
        ("5 * 2 + 10", int(20)),
        ("5 + 2 * 10", int(25)),
        ("20 + 2 * -10", int(0)),
        ("50 / 2 * 2 + 10", int(60)),
        ("2 * (5 + 10)", int(30)),
        ("3 * 3 * 3 + 10", int(37)),
        ("3 * (3 * 3) + 10", int(37)),
        ("(5 + 10 * 2 + 15 / 3) * 2 + -10", int(50)),
        ("7 / 2", int(3)),
        ("9223372036854775807 + 1", int(i64::MIN)),
    ]);
}

#[test]
fn test_boolean_expressions() {
    check(&[
        ("true", TRUE),
        ("false", FALSE),
        ("1 < 2", TRUE),
        ("1 > 2", FALSE),
        ("1 < 1", FALSE),
        ("1 == 1", TRUE),
        ("1 != 1", FALSE),
        ("1 == 2", FALSE),
        ("1 != 2", TRUE),
        ("true == true", TRUE),
        ("false == false", TRUE),
        ("true == false", FALSE),
        ("true != false", TRUE),
        ("(1 < 2) == true", TRUE),
        ("(1 > 2) == true", FALSE),
        ("(1 > 2) == false", TRUE),
    ]);
}

#[test]
fn test_bang_operator() {
    check(&[
        ("!true", FALSE),
        ("!false", TRUE),
        ("!5", FALSE),
        ("!!true", TRUE),
        ("!!false", FALSE),
        ("!!5", TRUE),
        ("!if (false) { 1 }", TRUE),
    ]);
}

#[test]
fn test_identity_equality() {
    check(&[
        ("[1] == [1]", FALSE),
        ("let a = [1]; a == a", TRUE),
        ("let h = {}; let g = h; g == h", TRUE),
        ("fn() { 1 } == fn() { 1 }", FALSE),
        ("let f = fn() { 1 }; f == f", TRUE),
        ("len == len", TRUE),
        ("len == first", FALSE),
        ("1 == true", FALSE),
        ("1 != true", TRUE),
        ("if (false) { 1 } == if (false) { 2 }", TRUE),
    ]);
}

#[test]
fn test_if_else_expressions() {
    check(&[
        ("if (true) { 10 }", int(10)),
        ("if (false) { 10 }", NULL),
        ("if (1) { 10 }", int(10)),
        ("if (1 < 2) { 10 }", int(10)),
        ("if (1 > 2) { 10 }", NULL),
        ("if (1 > 2) { 10 } else { 20 }", int(20)),
        ("if (1 < 2) { 10 } else { 20 }", int(10)),
        ("if 1 < 2 { 10 }", int(10)),
        ("if (\"\") { 1 } else { 2 }", int(1)),
    ]);
}

#[test]
fn test_return_statements() {
    check(&[
        ("return 10;", int(10)),
        ("return 10; 9;", int(10)),
        ("return 2 * 5; 9;", int(10)),
        ("9; return 2 * 5; 9;", int(10)),
        ("if (10 > 1) { if (10 > 1) { return 10; } return 1; }", int(10)),
        ("let f = fn(x) { return x; x + 10; }; f(10);", int(10)),
        ("let f = fn(x) { let result = x + 10; return result; return 10; }; f(10);", int(20)),
        ("let f = fn(x) { if (x > 1) { if (x > 2) { return 1; } }; return 2; }; f(5)", int(1)),
        ("let f = fn(x) { if (x > 1) { if (x > 2) { return 1; } }; return 2; }; f(2)", int(2)),
    ]);
}

#[test]
fn test_return_does_not_escape_call() {
    // the return inside `inner` ends `inner` only
    check(&[
        ("let inner = fn() { return 1; }; let outer = fn() { inner(); 2 }; outer()", int(2)),
        ("let f = fn() { return 1; }; f(); 3", int(3)),
    ]);
}

#[test]
fn test_error_handling() {
    check(&[
        ("5 + true;", error("type mismatch: INTEGER + BOOLEAN")),
        ("5 + true; 5;", error("type mismatch: INTEGER + BOOLEAN")),
        ("-true", error("unknown operator: -BOOLEAN")),
        ("true + false;", error("unknown operator: BOOLEAN + BOOLEAN")),
        ("true + false + true + false;", error("unknown operator: BOOLEAN + BOOLEAN")),
        ("5; true + false; 5", error("unknown operator: BOOLEAN + BOOLEAN")),
        ("if (10 > 1) { true + false; }", error("unknown operator: BOOLEAN + BOOLEAN")),
        (
            "if (10 > 1) { if (10 > 1) { return true + false; } return 1; }",
            error("unknown operator: BOOLEAN + BOOLEAN")
        ),
        ("foobar", error("identifier not found: foobar")),
        ("\"Hello\" - \"World\"", error("unknown operator: STRING - STRING")),
        ("\"a\" == \"a\"", error("unknown operator: STRING == STRING")),
        ("{\"name\": \"Monkey\"}[fn(x) { x }];", error("unusable as hash key: FUNCTION")),
        ("{fn() { 1 }: 2}", error("unusable as hash key: FUNCTION")),
        ("1 / 0", error("division by zero")),
        ("5()", error("not a function: INTEGER")),
        ("fn(x) { x }(1, 2)", error("wrong number of arguments. got=2, want=1")),
        ("1[0]", error("index operator not supported: INTEGER")),
        ("[1, 2][true]", error("index operator not supported: ARRAY")),
        ("-\"a\"", error("unknown operator: -STRING")),
    ]);
}

#[test]
fn test_first_error_wins() {
    check(&[
        // the error in the argument stops the call from happening
        ("let f = fn(x) { missing }; f(1 + true)", error("type mismatch: INTEGER + BOOLEAN")),
        ("let f = fn() { let a = 1 + true; missing; }; f()", error("type mismatch: INTEGER + BOOLEAN")),
        ("(1 + true) + missing", error("type mismatch: INTEGER + BOOLEAN")),
        ("[1, missing, 1 + true]", error("identifier not found: missing")),
        ("{1: missing, 2: 1 + true}", error("identifier not found: missing")),
        ("let x = missing; x", error("identifier not found: missing")),
        ("return missing; 1", error("identifier not found: missing")),
        ("missing(1 + true)", error("identifier not found: missing")),
    ]);
}

#[test]
fn test_let_statements() {
    check(&[
        ("let a = 5; a;", int(5)),
        ("let a = 5 * 5; a;", int(25)),
        ("let a = 5; let b = a; b;", int(5)),
        ("let a = 5; let b = a; let c = a + b + 5; c;", int(15)),
        ("let a = 5;", NULL),
        ("let a = 1; let a = a + 1; a", int(2)),
    ]);
}

#[test]
fn test_function_object() {
    let evaluated = test_eval("fn(x) { x + 2; };");

    match &evaluated {
        Object::Function(function) => {
            assert_eq!(function.parameters.len(), 1);
            assert_eq!(function.parameters[0].value, "x");
            assert_eq!(function.body.to_string(), "{ (x + 2) }");
        },
        object => panic!("object is not a function: {object:?}")
    }

    assert_eq!(evaluated.inspect(), "fn(x) { (x + 2) }");
}

#[test]
fn test_function_application() {
    check(&[
        ("let identity = fn(x) { x; }; identity(5);", int(5)),
        ("let identity = fn(x) { return x; }; identity(5);", int(5)),
        ("let double = fn(x) { x * 2; }; double(5);", int(10)),
        ("let add = fn(x, y) { x + y; }; add(5, 5);", int(10)),
        ("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));", int(20)),
        ("fn(x) { x; }(5)", int(5)),
        ("let f = fn() { }; f()", NULL),
        ("let x = 1; let f = fn(x) { x }; f(2); x", int(1)),
    ]);
}

#[test]
fn test_closures() {
    check(&[
        (
            "let newAdder = fn(x) { fn(y) { x + y } }; let addTwo = newAdder(2); addTwo(3);",
            int(5)
        ),
        // captured at evaluation of the literal, later bindings are visible
        // through the shared scope
        ("let f = fn() { later }; let later = 7; f()", int(7)),
        (
            "let fib = fn(n) { if (n < 2) { n } else { fib(n - 1) + fib(n - 2) } }; fib(15)",
            int(610)
        ),
    ]);
}

#[test]
fn test_string_expressions() {
    check(&[
        ("\"Hello World!\"", Object::string("Hello World!")),
        ("\"Hello\" + \" \" + \"World!\"", Object::string("Hello World!")),
        ("let greet = fn(name) { \"hi \" + name }; greet(\"bob\")", Object::string("hi bob")),
    ]);
}

#[test]
fn test_builtin_functions() {
    check(&[
        ("len(\"\")", int(0)),
        ("len(\"four\")", int(4)),
        ("len(\"hello world\")", int(11)),
        ("len(\"héllo\")", int(5)),
        ("len(1)", error("argument to \"len\" not supported, got INTEGER")),
        ("len(\"one\", \"two\")", error("wrong number of arguments. got=2, want=1")),
        ("len([1, 2, 3])", int(3)),
        ("len([])", int(0)),
        ("first([1, 2, 3])", int(1)),
        ("first([])", NULL),
        ("first(1)", error("argument to \"first\" must be ARRAY, got INTEGER")),
        ("last([1, 2, 3])", int(3)),
        ("last([])", NULL),
        ("last(1)", error("argument to \"last\" must be ARRAY, got INTEGER")),
        ("rest([1, 2, 3])", Object::array(vec![int(2), int(3)])),
        ("rest([])", NULL),
        ("rest([1], [2])", error("wrong number of arguments. got=2, want=1")),
        ("push([], 1)", Object::array(vec![int(1)])),
        ("push(1, 1)", error("argument to \"push\" must be ARRAY, got INTEGER")),
        ("push([])", error("wrong number of arguments. got=1, want=2")),
        ("puts(\"hello\", 1)", NULL),
    ]);
}

#[test]
fn test_builtins_do_not_mutate() {
    check(&[
        ("let a = [1]; let b = push(a, 2); len(a)", int(1)),
        ("let a = [1, 2]; rest(a); a", Object::array(vec![int(1), int(2)])),
    ]);
}

#[test]
fn test_bindings_shadow_builtins() {
    check(&[
        ("let len = fn(x) { 42 }; len(\"a\")", int(42)),
        ("len", Object::Builtin { name: "len", func: |_| NULL }),
    ]);
}

#[test]
fn test_array_literals() {
    check(&[
        ("[1, 2 * 2, 3 + 3]", Object::array(vec![int(1), int(4), int(6)])),
        ("[]", Object::array(vec![])),
    ]);

    assert_eq!(test_eval("[1, \"a\", true, [null_free]]").inspect(), "ERROR: identifier not found: null_free");
    assert_eq!(test_eval("[1, \"a\", true, []]").inspect(), "[1, a, true, []]");
}

#[test]
fn test_array_index_expressions() {
    check(&[
        ("[1, 2, 3][0]", int(1)),
        ("[1, 2, 3][1]", int(2)),
        ("[1, 2, 3][2]", int(3)),
        ("let i = 0; [1][i];", int(1)),
        ("[1, 2, 3][1 + 1];", int(3)),
        ("let myArray = [1, 2, 3]; myArray[2];", int(3)),
        ("let myArray = [1, 2, 3]; myArray[0] + myArray[1] + myArray[2];", int(6)),
        ("let myArray = [1, 2, 3]; let i = myArray[0]; myArray[i]", int(2)),
        ("[1, 2, 3][3]", NULL),
        ("[1, 2, 3][-1]", NULL),
    ]);
}

#[test]
fn test_map_and_reduce() {
    let map = "
        let map = fn(arr, f) {
            let iter = fn(arr, accumulated) {
                if (len(arr) == 0) {
                    accumulated
                } else {
                    iter(rest(arr), push(accumulated, f(first(arr))));
                }
            };

            iter(arr, []);
        };
    ";

    let reduce = "
        let reduce = fn(arr, initial, f) {
            let iter = fn(arr, result) {
                if (len(arr) == 0) {
                    result
                } else {
                    iter(rest(arr), f(result, first(arr)));
                }
            };

            iter(arr, initial);
        };
    ";

    let doubled = format!("{map} let double = fn(x) {{ x * 2 }}; map([1, 2, 3, 4], double);");
    let summed = format!("{reduce} reduce([1, 2, 3, 4, 5], 0, fn(acc, el) {{ acc + el }});");

    check(&[
        (doubled.as_str(), Object::array(vec![int(2), int(4), int(6), int(8)])),
        (summed.as_str(), int(15)),
    ]);
}

#[test]
fn test_hash_literals() {
    let input = r#"
        let two = "two";
        {
            "one": 10 - 9,
            two: 1 + 1,
            "thr" + "ee": 6 / 2,
            4: 4,
            true: 5,
            false: 6
        }
    "#;

    let evaluated = test_eval(input);

    let pairs = match &evaluated {
        Object::Hash { pairs } => pairs.clone(),
        object => panic!("eval didn't return a hash: {object:?}")
    };

    let expected = [
        (Object::string("one"), 1),
        (Object::string("two"), 2),
        (Object::string("three"), 3),
        (int(4), 4),
        (TRUE, 5),
        (FALSE, 6),
    ];

    assert_eq!(pairs.len(), expected.len());

    for (key, value) in expected {
        let pair = pairs.get(&key.hash_key().unwrap())
            .unwrap_or_else(|| panic!("no pair for {key}"));

        assert_eq!(pair.key, key);
        assert_eq!(pair.value, int(value));
    }
}

#[test]
fn test_hash_literal_order() {
    let tests = [
        (r#"{"a": 1, "b": 2, "c": 3, "d": 4, "e": 5}"#, "{a: 1, b: 2, c: 3, d: 4, e: 5}"),
        (r#"{3: "x", 1: "y", true: "z", "k": 0}"#, "{3: x, 1: y, true: z, k: 0}"),
        // a repeated key keeps its first position and takes the last value
        (r#"{"a": 1, "b": 2, "a": 3}"#, "{a: 3, b: 2}"),
    ];

    for (input, expected) in tests {
        for _ in 0..10 {
            assert_eq!(test_eval(input).inspect(), expected, "input: {input}");
        }
    }
}

#[test]
fn test_hash_index_expressions() {
    check(&[
        ("{\"foo\": 5}[\"foo\"]", int(5)),
        ("{\"foo\": 5}[\"bar\"]", NULL),
        ("let key = \"foo\"; {\"foo\": 5}[key]", int(5)),
        ("{}[\"foo\"]", NULL),
        ("{5: 5}[5]", int(5)),
        ("{true: 5}[true]", int(5)),
        ("{false: 5}[false]", int(5)),
        ("{1: 1, 1: 2}[1]", int(2)),
        ("{\"a\": 1}[[]]", error("unusable as hash key: ARRAY")),
    ]);
}

#[test]
fn test_quote() {
    let tests = [
        ("quote(5)", "5"),
        ("quote(5 + 8)", "(5 + 8)"),
        ("quote(foobar)", "foobar"),
        ("quote(foobar + barfoo)", "(foobar + barfoo)"),
        ("quote(fn(x) { x })", "fn(x) { x }"),
    ];

    for (input, expected) in tests {
        match test_eval(input) {
            Object::Quote { node } => assert_eq!(node.to_string(), expected, "input: {input}"),
            object => panic!("expected quote for {input}, got {object:?}")
        }
    }
}

#[test]
fn test_quote_unquote() {
    let tests = [
        ("quote(unquote(4))", "4"),
        ("quote(unquote(4 + 4))", "8"),
        ("quote(8 + unquote(4 + 4))", "(8 + 8)"),
        ("quote(unquote(4 + 4) + 8)", "(8 + 8)"),
        ("let foobar = 8; quote(foobar)", "foobar"),
        ("let foobar = 8; quote(unquote(foobar))", "8"),
        ("quote(unquote(true))", "true"),
        ("quote(unquote(true == false))", "false"),
        ("quote(unquote(quote(4 + 4)))", "(4 + 4)"),
        (
            "let quotedInfixExpression = quote(4 + 4); quote(unquote(4 + 4) + unquote(quotedInfixExpression))",
            "(8 + (4 + 4))"
        ),
        ("quote(unquote(-3))", "(-3)"),
        ("quote(unquote(\"a\" + \"b\"))", "\"ab\""),
        ("quote(unquote([1, 1 + 1]))", "[1, 2]"),
        ("quote(unquote({\"a\": 1}))", "{\"a\": 1}"),
        ("quote(unquote(1, 2))", "unquote(1, 2)"),
        ("quote(unquote())", "unquote()"),
        ("quote(unquote({\"b\": 2, \"a\": 1, \"c\": 3}))", "{\"b\": 2, \"a\": 1, \"c\": 3}"),
        ("quote(unquote(-9223372036854775807 - 1))", "((-9223372036854775807) - 1)"),
    ];

    for (input, expected) in tests {
        match test_eval(input) {
            Object::Quote { node } => assert_eq!(node.to_string(), expected, "input: {input}"),
            object => panic!("expected quote for {input}, got {object:?}")
        }
    }
}

#[test]
fn test_unquoted_integers_reparse() {
    for value in [0, 7, -7, i64::MAX, i64::MIN + 1, i64::MIN] {
        let source = match value {
            i64::MIN => "-9223372036854775807 - 1".to_string(),
            value => value.to_string()
        };
        let input = format!("quote(unquote({source}))");

        let printed = match test_eval(&input) {
            Object::Quote { node } => node.to_string(),
            object => panic!("expected quote for {input}, got {object:?}")
        };

        assert_eq!(test_eval(&printed), int(value), "printed: {printed}");
    }
}

#[test]
fn test_quote_errors() {
    check(&[
        ("quote(1, 2)", error("wrong number of arguments. got=2, want=1")),
        ("quote()", error("wrong number of arguments. got=0, want=1")),
        ("quote(unquote(missing))", error("identifier not found: missing")),
        ("quote(unquote(fn(x) { x }))", error("cannot unquote FUNCTION: it has no syntax")),
        ("quote(unquote([len]))", error("cannot unquote BUILTIN: it has no syntax")),
    ]);
}

#[test]
fn test_macro_literal_outside_definition() {
    check(&[("macro(x) { x }", NULL)]);
}

fn define(input: &str) -> (Program, Env) {
    let mut program = parse_ok(input);
    let env = Environment::new();

    define_macros(&mut program, &env);

    (program, env)
}

fn expand(input: &str) -> Result<Program, MacroError> {
    let (program, env) = define(input);

    expand_macros(program, &env)
}

#[test]
fn test_define_macros() {
    let (program, env) = define("
        let number = 1;
        let function = fn(x, y) { x + y };
        let mymacro = macro(x, y) { x + y; };
    ");

    assert_eq!(program.statements.len(), 2);
    assert_eq!(program.to_string(), "let number = 1; let function = fn(x, y) { (x + y) };");

    assert_eq!(env.borrow().get("number"), None);
    assert_eq!(env.borrow().get("function"), None);

    let mymacro = env.borrow().get("mymacro");

    match mymacro {
        Some(Object::Macro(macro_)) => {
            assert_eq!(macro_.parameters.len(), 2);
            assert_eq!(macro_.parameters[0].value, "x");
            assert_eq!(macro_.parameters[1].value, "y");
            assert_eq!(macro_.body.to_string(), "{ (x + y) }");
        },
        object => panic!("mymacro is not a macro: {object:?}")
    }
}

#[test]
fn test_define_macros_only_at_top_level() {
    let (program, env) = define("let f = fn() { let inner = macro() { 1 }; }; 1;");

    assert_eq!(program.statements.len(), 2);
    assert_eq!(env.borrow().get("inner"), None);
}

#[test]
fn test_expand_macros() {
    let tests = [
        (
            "let infixExpression = macro() { quote(1 + 2); }; infixExpression();",
            "(1 + 2)"
        ),
        (
            "let reverse = macro(a, b) { quote(unquote(b) - unquote(a)); }; reverse(2 + 2, 10 - 5);",
            "((10 - 5) - (2 + 2))"
        ),
        (
            r#"
                let unless = macro(condition, consequence, alternative) {
                    quote(if (!(unquote(condition))) {
                        unquote(consequence);
                    } else {
                        unquote(alternative);
                    });
                };

                unless(10 > 5, puts("not greater"), puts("greater"));
            "#,
            r#"if (!(10 > 5)) { puts("not greater") } else { puts("greater") }"#
        ),
        (
            "let m = macro(x) { return quote(unquote(x) * 2); }; let y = m(1 + 1);",
            "let y = ((1 + 1) * 2);"
        ),
        (
            "let twice = macro(x) { quote([unquote(x), unquote(x)]) }; twice(twice(1));",
            "[[1, 1], [1, 1]]"
        ),
    ];

    for (input, expected) in tests {
        let expanded = expand(input);

        assert_eq!(expanded.map(|program| program.to_string()), Ok(expected.to_string()));
    }
}

#[test]
fn test_expand_leaves_other_calls() {
    let expanded = expand("let m = macro() { quote(1) }; f(m(), g(2))");

    assert_eq!(expanded.map(|program| program.to_string()), Ok("f(1, g(2))".to_string()));
}

#[test]
fn test_macro_errors() {
    let not_quote = expand("let m = macro() { 1 }; m();");
    assert!(
        matches!(&not_quote, Err(MacroError::NotQuote { name, .. }) if name == "m"),
        "{not_quote:?}"
    );

    let arity = expand("let m = macro(x) { quote(x) }; m();");
    assert!(
        matches!(&arity, Err(MacroError::ArgumentCount { got: 0, want: 1, .. })),
        "{arity:?}"
    );

    let evaluation = expand("let m = macro() { missing }; m()");
    assert_eq!(
        evaluation.map_err(|err| err.to_string()).map(|program| program.to_string()),
        Err("identifier not found: missing".to_string())
    );
}

#[test]
fn test_expanded_program_evaluates() {
    let (program, macro_env) = define("
        let unless = macro(cond, cons, alt) { quote(if (!(unquote(cond))) { unquote(cons) } else { unquote(alt) }) };
        let double = macro(a) { quote(unquote(a) * 2) };
        unless(1 > 2, double(3 + 1), 0);
    ");

    let expanded = expand_macros(program, &macro_env).unwrap();
    let env = Environment::new();

    assert_eq!(eval_program(&expanded, &env), int(8));
}
