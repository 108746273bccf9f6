//! Tests for the TypeScript/JavaScript parser

#[cfg(test)]
mod parser_tests {
    use crate::language::Language;
    use crate::parser;
    use swc_ecma_ast::{Decl, ModuleItem, Stmt};

    fn parse_test(src: &str, language: Language) -> Result<parser::ParsedSource, anyhow::Error> {
        parser::parse_source(src, language)
    }

    #[test]
    fn test_parse_simple_function_typescript() {
        let result = parse_test("function foo() { return 42; }", Language::TypeScript);
        assert!(result.is_ok(), "Should parse simple TypeScript function");
        assert_eq!(result.unwrap().syntax_label, "typescript");
    }

    #[test]
    fn test_parse_typescript_types() {
        let src = "function foo(x: number): number { return x * 2; }";
        assert!(parse_test(src, Language::TypeScript).is_ok());
    }

    #[test]
    fn test_parse_jsx_in_tsx() {
        let src = "function foo() { return <div>hello</div>; }";
        let parsed = parse_test(src, Language::TypeScriptReact).unwrap();
        assert_eq!(parsed.syntax_label, "tsx");
    }

    #[test]
    fn test_parse_jsx_in_plain_typescript_falls_back_to_tsx() {
        let src = "function foo() { return <div>hello</div>; }";
        let parsed = parse_test(src, Language::TypeScript).unwrap();
        assert_eq!(
            parsed.syntax_label, "tsx",
            "markup in a .ts buffer should be retried with JSX enabled"
        );
    }

    #[test]
    fn test_parse_angle_bracket_cast_in_typescript() {
        let src = "const n = <number>value;\nconst id = <T,>(x: T) => x;";
        let parsed = parse_test(src, Language::TypeScript).unwrap();
        assert_eq!(parsed.syntax_label, "typescript");
    }

    #[test]
    fn test_parse_untyped_javascript_with_markup() {
        let src = r#"
            const App = () => <main className="app">hi</main>;
            export default App;
        "#;
        assert!(parse_test(src, Language::JavaScript).is_ok());
    }

    #[test]
    fn test_parse_decorators() {
        let src = r#"
            @Injectable({ providedIn: 'root' })
            export class UserService {
                @Get(':id')
                find(@Param('id') id: string) { return id; }
            }
        "#;
        assert!(parse_test(src, Language::TypeScript).is_ok());
    }

    #[test]
    fn test_parse_class_properties() {
        let src = r#"
            class Counter {
                count = 0;
                static #instances = 0;
                increment = () => { this.count += 1; };
            }
        "#;
        assert!(parse_test(src, Language::JavaScript).is_ok());
    }

    #[test]
    fn test_parse_unterminated_function_fails() {
        let result = parse_test("function f( { unterminated", Language::TypeScript);
        assert!(result.is_err(), "Unterminated input should fail every configuration");
    }

    #[test]
    fn test_parse_garbage_fails() {
        let src = "\nthis is not valid javascript code {[\nfunction incomplete(\n";
        assert!(parse_test(src, Language::TypeScriptReact).is_err());
    }

    #[test]
    fn test_offsets_are_relative_to_input() {
        let src = "const a = 1;\nfunction foo() {}";
        let parsed = parse_test(src, Language::TypeScript).unwrap();
        let span = parsed
            .module
            .body
            .iter()
            .find_map(|item| match item {
                ModuleItem::Stmt(Stmt::Decl(Decl::Fn(f))) => Some(f.function.span),
                _ => None,
            })
            .expect("function declaration");
        let (start, end) = parsed.range(span);
        assert_eq!(&src[start..end], "function foo() {}");
    }

    #[test]
    fn test_offsets_account_for_bom() {
        let src = "\u{feff}function foo() {}";
        let parsed = parse_test(src, Language::JavaScript).unwrap();
        let span = match &parsed.module.body[0] {
            ModuleItem::Stmt(Stmt::Decl(Decl::Fn(f))) => f.function.span,
            other => panic!("unexpected item: {:?}", other),
        };
        let (start, end) = parsed.range(span);
        assert_eq!(&src[start..end], "function foo() {}");
    }

    #[test]
    fn test_comment_ranges() {
        let src = "// header\nconst a = 1; /* inline */\n/** doc */\nfunction f() {}\n";
        let ranges = parser::comment_ranges(src, Language::TypeScript).unwrap();
        let texts: Vec<&str> = ranges.iter().map(|&(s, e)| &src[s..e]).collect();
        assert_eq!(texts, vec!["// header", "/* inline */", "/** doc */"]);
    }

    #[test]
    fn test_comment_ranges_ignore_string_contents() {
        let src = "const url = 'http://example.com'; // real\n";
        let ranges = parser::comment_ranges(src, Language::JavaScript).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(&src[ranges[0].0..ranges[0].1], "// real");
    }

    #[test]
    fn test_nesting_depth() {
        assert_eq!(parser::nesting_depth(""), 0);
        assert_eq!(parser::nesting_depth("a(b[c{d}])"), 3);
        assert_eq!(parser::nesting_depth("f() {} g() {}"), 1);
        assert_eq!(parser::nesting_depth(")))(("), 2);
    }

    #[test]
    fn test_parse_refuses_deep_nesting() {
        let depth = parser::MAX_NESTING_DEPTH + 1;
        let src = format!("const x = {}1{};", "(".repeat(depth), ")".repeat(depth));
        let err = parse_test(&src, Language::TypeScript).err().expect("deep input should be refused");
        assert!(err.to_string().contains("nesting depth"), "{}", err);
        assert!(parser::comment_ranges(&src, Language::TypeScript).is_err());

        let shallow = format!("const x = {}1{};", "(".repeat(depth - 1), ")".repeat(depth - 1));
        assert!(parse_test(&shallow, Language::TypeScript).is_ok());
    }
}
