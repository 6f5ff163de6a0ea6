//! XCTest skeleton synthesis
//!
//! Tests are derived from the generated Swift, not from the Python source:
//! every `func` found in the translation gets one unit test, and two or more
//! functions add a single integration test. Synthesis is total; text without
//! functions simply yields no tests.

pub mod scan;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use scan::{scan_declarations, Declarations, FunctionSignature, SwiftParam};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Unit,
    Integration,
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestKind::Unit => write!(f, "unit"),
            TestKind::Integration => write!(f, "integration"),
        }
    }
}

/// One synthesized test method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSpec {
    pub name: String,
    /// Complete `func testX() { .. }` text at zero indentation
    pub body: String,
    pub kind: TestKind,
}

/// A list of tests rendered as one `XCTestCase` subclass
#[derive(Debug, Clone, Copy)]
pub struct TestSuite<'a> {
    tests: &'a [TestSpec],
}

impl<'a> TestSuite<'a> {
    pub fn new(tests: &'a [TestSpec]) -> Self {
        Self { tests }
    }

    pub fn render(&self, class_name: &str) -> String {
        let mut out = format!("import XCTest\n\nfinal class {class_name}: XCTestCase {{\n");
        for (i, test) in self.tests.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for line in test.body.lines() {
                if !line.is_empty() {
                    out.push_str("    ");
                    out.push_str(line);
                }
                out.push('\n');
            }
        }
        out.push_str("}\n");
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct TestSynthesizer;

impl TestSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Derive test skeletons from translated Swift text
    pub fn generate_tests(&self, swift: &str) -> Vec<TestSpec> {
        let decls = scan_declarations(swift);
        let mut names = HashSet::new();
        let mut tests: Vec<TestSpec> = decls
            .functions
            .iter()
            .map(|function| unit_test(function, &mut names))
            .collect();

        if let [first, second, ..] = decls.functions.as_slice() {
            tests.push(integration_test(first, second));
        }

        debug!(
            functions = decls.functions.len(),
            tests = tests.len(),
            "synthesized tests"
        );
        tests
    }
}

fn unit_test(function: &FunctionSignature, taken: &mut HashSet<String>) -> TestSpec {
    let base = format!("test{}", capitalize(&function.name));
    let mut name = base.clone();
    let mut n = 2;
    while !taken.insert(name.clone()) {
        name = format!("{base}{n}");
        n += 1;
    }

    let mut lines = Vec::new();
    for param in &function.params {
        lines.push(local_binding(param));
    }
    let args: Vec<String> = function
        .params
        .iter()
        .map(|param| argument(param, &param.name))
        .collect();
    let call = call_expr(function, &args);

    match function.return_type.as_deref() {
        Some(ty) => {
            lines.push(format!("let result = {call}"));
            lines.push("XCTAssertNotNil(result)".to_string());
            if ty == "String" {
                lines.push("XCTAssertFalse(result.isEmpty)".to_string());
            }
        }
        None => {
            lines.push(call);
            lines.push(format!("// {} returns no value; nothing to assert", function.name));
        }
    }

    TestSpec {
        body: method(&name, &lines),
        name,
        kind: TestKind::Unit,
    }
}

fn integration_test(first: &FunctionSignature, second: &FunctionSignature) -> TestSpec {
    let inline_call = |function: &FunctionSignature| {
        let args: Vec<String> = function
            .params
            .iter()
            .map(|param| argument(param, &sample_literal(param.ty.as_deref())))
            .collect();
        call_expr(function, &args)
    };

    let lines = vec![
        format!("let first = {}", inline_call(first)),
        format!("let second = {}", inline_call(second)),
        "XCTAssertNotNil(first)".to_string(),
        "XCTAssertNotNil(second)".to_string(),
    ];
    let name = "testIntegration".to_string();
    TestSpec {
        body: method(&name, &lines),
        name,
        kind: TestKind::Integration,
    }
}

fn method(name: &str, lines: &[String]) -> String {
    let mut out = format!("func {name}() {{\n");
    for line in lines {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("}\n");
    out
}

fn call_expr(function: &FunctionSignature, args: &[String]) -> String {
    let receiver = function
        .owner
        .as_ref()
        .map(|owner| format!("{owner}()."))
        .unwrap_or_default();
    format!("{receiver}{}({})", function.name, args.join(", "))
}

fn argument(param: &SwiftParam, value: &str) -> String {
    match &param.label {
        Some(label) => format!("{label}: {value}"),
        None => value.to_string(),
    }
}

fn local_binding(param: &SwiftParam) -> String {
    let literal = sample_literal(param.ty.as_deref());
    if literal == "nil" {
        let ty = param
            .ty
            .as_deref()
            .map(|ty| ty.trim_end_matches("...").trim_end_matches('?'))
            .unwrap_or("Any");
        if ty.contains("->") {
            format!("let {}: ({ty})? = nil", param.name)
        } else {
            format!("let {}: {ty}? = nil", param.name)
        }
    } else {
        format!("let {} = {literal}", param.name)
    }
}

/// Fixed sample value for a Swift type
pub fn sample_literal(ty: Option<&str>) -> String {
    let Some(ty) = ty.map(str::trim) else {
        return "nil".to_string();
    };
    match ty {
        "Int" | "Int8" | "Int16" | "Int32" | "Int64" | "UInt" => "42",
        "Double" | "Float" | "CGFloat" => "3.14",
        "String" | "Substring" => "\"test\"",
        "Bool" => "true",
        _ if ty.starts_with('[') && ty.ends_with(']') => {
            if is_dictionary(ty) {
                "[:]"
            } else {
                "[]"
            }
        }
        _ if ty.starts_with("Set<") => "[]",
        _ => "nil",
    }
    .to_string()
}

fn is_dictionary(ty: &str) -> bool {
    let inner = &ty[1..ty.len() - 1];
    let mut depth = 0i32;
    for ch in inner.chars() {
        match ch {
            '[' | '(' | '<' => depth += 1,
            ']' | ')' | '>' => depth -= 1,
            ':' if depth == 0 => return true,
            _ => {}
        }
    }
    false
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::transpiler::Transpiler;

    #[test]
    fn test_greet_unit_test() {
        let tests = TestSynthesizer::new()
            .generate_tests("func greet(name: String) -> String {\n    return name\n}\n");
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].name, "testGreet");
        assert_eq!(tests[0].kind, TestKind::Unit);
        assert_eq!(
            tests[0].body,
            "func testGreet() {\n    let name = \"test\"\n    let result = greet(name: name)\n    XCTAssertNotNil(result)\n    XCTAssertFalse(result.isEmpty)\n}\n"
        );
    }

    #[test]
    fn test_no_functions_no_tests() {
        let synthesizer = TestSynthesizer::new();
        assert!(synthesizer.generate_tests("").is_empty());
        assert!(synthesizer.generate_tests("let x = 1\nprint(x)\n").is_empty());
    }

    #[test]
    fn test_one_unit_test_per_function_plus_integration() {
        let swift = "func a() -> Int {\n}\nfunc b(x: Double) -> Double {\n}\nfunc c() {\n}\n";
        let tests = TestSynthesizer::new().generate_tests(swift);
        let names: Vec<&str> = tests.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["testA", "testB", "testC", "testIntegration"]);
        assert_eq!(
            tests.iter().filter(|t| t.kind == TestKind::Integration).count(),
            1
        );
        let integration = &tests[3].body;
        assert!(integration.contains("let first = a()"));
        assert!(integration.contains("let second = b(x: 3.14)"));
        assert!(integration.contains("XCTAssertNotNil(second)"));
    }

    #[test]
    fn test_void_function_gets_passthrough_comment() {
        let tests = TestSynthesizer::new().generate_tests("func reset(flag: Bool) {\n}\n");
        assert!(tests[0].body.contains("reset(flag: flag)\n"));
        assert!(tests[0].body.contains("// reset returns no value"));
        assert!(!tests[0].body.contains("XCTAssert"));
    }

    #[test]
    fn test_sample_literals() {
        assert_eq!(sample_literal(Some("Int")), "42");
        assert_eq!(sample_literal(Some("Double")), "3.14");
        assert_eq!(sample_literal(Some("String")), "\"test\"");
        assert_eq!(sample_literal(Some("Bool")), "true");
        assert_eq!(sample_literal(Some("[Int]")), "[]");
        assert_eq!(sample_literal(Some("[String: Any]")), "[:]");
        assert_eq!(sample_literal(Some("[[String: Int]]")), "[]");
        assert_eq!(sample_literal(Some("Any")), "nil");
        assert_eq!(sample_literal(None), "nil");
    }

    #[test]
    fn test_untyped_params_bind_optional_any() {
        let tests = TestSynthesizer::new().generate_tests("func scale(x, factor = 2) -> Any {\n}\n");
        assert!(tests[0].body.contains("let x: Any? = nil"));
        assert!(tests[0].body.contains("scale(x: x, factor: factor)"));
    }

    #[test]
    fn test_tuple_and_call_default_params_are_discovered() {
        let source = "\
def swap(pair: tuple) -> tuple:
    return pair
def first(p: Tuple[int, str]) -> int:
    return p
def bump(x=int(3)) -> int:
    return x
";
        let translated = Transpiler::new().transpile(source);
        assert!(translated
            .text
            .contains("func swap(pair: (Any, Any)) -> (Any, Any) {"));

        let tests = TestSynthesizer::new().generate_tests(&translated.text);
        let names: Vec<&str> = tests.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["testSwap", "testFirst", "testBump", "testIntegration"]
        );
        assert!(tests[0].body.contains("let pair: (Any, Any)? = nil"));
        assert!(tests[1].body.contains("let p: (Int, String)? = nil"));
        assert!(tests[2].body.contains("bump(x: x)"));
        assert!(tests[3].body.contains("let second = first(p: nil)"));
    }

    #[test]
    fn test_closure_param_binding_is_parenthesized() {
        let tests = TestSynthesizer::new().generate_tests("func apply(op: (Int) -> Int) {\n}\n");
        assert!(tests[0].body.contains("let op: ((Int) -> Int)? = nil"));
    }

    #[test]
    fn test_methods_called_on_instance() {
        let swift = "class Greeter {\n    func hello(_ name: String) -> String {\n    }\n}\n";
        let tests = TestSynthesizer::new().generate_tests(swift);
        assert!(tests[0].body.contains("Greeter().hello(name)"));
    }

    #[test]
    fn test_duplicate_names_get_suffix() {
        let swift = "class A {\n    func run() -> Int {\n    }\n}\nclass B {\n    func run() -> Int {\n    }\n}\n";
        let tests = TestSynthesizer::new().generate_tests(swift);
        assert_eq!(tests[0].name, "testRun");
        assert_eq!(tests[1].name, "testRun2");
    }

    #[test]
    fn test_suite_render() {
        let tests = TestSynthesizer::new().generate_tests("func one() -> Int {\n}\n");
        let rendered = TestSuite::new(&tests).render("MathTests");
        assert_eq!(
            rendered,
            "import XCTest\n\nfinal class MathTests: XCTestCase {\n    func testOne() {\n        let result = one()\n        XCTAssertNotNil(result)\n    }\n}\n"
        );
    }
}
