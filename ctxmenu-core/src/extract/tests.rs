//! Tests for the copy/move-to-file workflow

#[cfg(test)]
mod extract_tests {
    use crate::config::{CopyCodeConfig, ImportHandling, InsertionPoint};
    use crate::extract::*;
    use crate::language::{Language, Position};
    use crate::locate::FunctionLocator;
    use std::fs;

    const TS: Language = Language::TypeScript;

    #[test]
    fn test_smart_insertion_after_last_import() {
        let target = "import a from 'a';\nimport b from 'b';\n\nexport const x = 1;\n";
        assert_eq!(insertion_line(target, InsertionPoint::Smart, TS), 2);
    }

    #[test]
    fn test_smart_insertion_after_multi_line_import() {
        let target = "import {\n  a,\n  b,\n} from 'ab';\nconst x = a + b;\n";
        assert_eq!(insertion_line(target, InsertionPoint::Smart, TS), 4);
    }

    #[test]
    fn test_smart_insertion_before_first_export() {
        let target = "const y = 2;\n\nexport function f() {}\n";
        assert_eq!(insertion_line(target, InsertionPoint::Smart, TS), 2);
    }

    #[test]
    fn test_smart_insertion_defaults_to_end() {
        let target = "const y = 2;\n";
        assert_eq!(insertion_line(target, InsertionPoint::Smart, TS), 2);
    }

    #[test]
    fn test_smart_insertion_scans_lines_when_unparseable() {
        let target = "import a from 'a';\nfunction broken( {\n";
        assert_eq!(insertion_line(target, InsertionPoint::Smart, TS), 1);
    }

    #[test]
    fn test_fixed_insertion_points() {
        let target = "a();\nb();\n";
        assert_eq!(insertion_line(target, InsertionPoint::Beginning, TS), 0);
        assert_eq!(insertion_line(target, InsertionPoint::End, TS), 3);
    }

    #[test]
    fn test_insert_code() {
        let target = "import a from 'a';\nconst x = 1;\n";
        assert_eq!(
            insert_code(target, "function f() {}", InsertionPoint::Smart, TS),
            "import a from 'a';\n\nfunction f() {}\nconst x = 1;\n"
        );
        assert_eq!(
            insert_code("const x = 1;\n", "function f() {}", InsertionPoint::End, TS),
            "const x = 1;\n\nfunction f() {}\n"
        );
        assert_eq!(
            insert_code("const x = 1;\n", "function f() {}", InsertionPoint::Beginning, TS),
            "\nfunction f() {}\nconst x = 1;\n"
        );
    }

    #[test]
    fn test_strip_comments() {
        let code = "// leading\nfunction f() {\n  return 1; // trailing\n  /* block */\n}\n";
        assert_eq!(strip_comments(code, TS), "function f() {\n  return 1;\n}\n");
    }

    #[test]
    fn test_strip_comments_keeps_strings() {
        let code = "const url = 'http://example.com/*not*/';\n";
        assert_eq!(strip_comments(code, TS), code);
    }

    #[test]
    fn test_strip_comments_leaves_unparseable_code() {
        let code = "  }\n  // orphan\n";
        assert_eq!(strip_comments(code, TS), code);
    }

    const SOURCE: &str = "import React, { useState } from 'react';
import { helper } from './helper';
import './styles.css';

export function Counter() {
  const [n] = useState(0);
  return n;
}
";

    const COUNTER: &str = "export function Counter() {
  const [n] = useState(0);
  return n;
}";

    #[test]
    fn test_plan_imports_by_policy() {
        let target = "import React from 'react';\n\nexport const x = 1;\n";
        let needed = vec!["import React, { useState } from 'react';".to_string()];

        assert_eq!(plan_imports(SOURCE, COUNTER, target, ImportHandling::Merge, TS), needed);
        assert_eq!(plan_imports(SOURCE, COUNTER, target, ImportHandling::Duplicate, TS), needed);
        assert!(plan_imports(SOURCE, COUNTER, target, ImportHandling::Skip, TS).is_empty());
    }

    #[test]
    fn test_merge_skips_imports_already_in_target() {
        let target = "import React, {useState} from \"react\"\n";
        assert!(plan_imports(SOURCE, COUNTER, target, ImportHandling::Merge, TS).is_empty());
        assert_eq!(
            plan_imports(SOURCE, COUNTER, target, ImportHandling::Duplicate, TS).len(),
            1
        );
    }

    #[test]
    fn test_plan_transfer_places_imports_before_code() {
        let target = "import React from 'react';\n\nexport const x = 1;\n";
        let plan = plan_transfer(SOURCE, COUNTER, target, &CopyCodeConfig::default(), TS);
        let expected = format!(
            "import React from 'react';\nimport React, {{ useState }} from 'react';\n\n{}\n\nexport const x = 1;\n",
            COUNTER
        );
        assert_eq!(plan.target_text, expected);
        assert_eq!(plan.insertion_line, 2);
        assert_eq!(plan.imports_added.len(), 1);
    }

    #[test]
    fn test_plan_transfer_without_comments() {
        let settings = CopyCodeConfig {
            preserve_comments: false,
            handle_imports: ImportHandling::Skip,
            insertion_point: InsertionPoint::End,
        };
        let code = "// adds\nconst add = (a, b) => a + b;";
        let plan = plan_transfer("", code, "export {};\n", &settings, TS);
        assert_eq!(plan.target_text, "export {};\n\nconst add = (a, b) => a + b;\n");
    }

    #[test]
    fn test_code_range_from_function() {
        let source = "const a = 1;\nfunction f() {\n  return a;\n}\n";
        let function = FunctionLocator::new()
            .locate(source, "ts", Position::new(2, 2))
            .unwrap();
        let range = CodeRange::from_function(&function);
        let (start, end) = range.byte_range(source).unwrap();
        assert_eq!(&source[start..end], function.full_text);
    }

    #[test]
    fn test_code_range_rejects_bad_ranges() {
        let text = "ab\ncd\n";
        assert!(CodeRange::new(Position::new(5, 0), Position::new(6, 0)).byte_range(text).is_err());
        assert!(CodeRange::new(Position::new(1, 1), Position::new(0, 0)).byte_range(text).is_err());
    }

    const FMT_SOURCE: &str = "import { format } from './fmt';

export function show(x: number) {
  return format(x);
}

export const keep = 1;
";

    fn setup() -> (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf, CodeRange) {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.ts");
        let target = dir.path().join("b.ts");
        fs::write(&source, FMT_SOURCE).unwrap();
        fs::write(&target, "export const other = 2;\n").unwrap();

        let function = FunctionLocator::new()
            .locate(FMT_SOURCE, "ts", Position::new(3, 4))
            .unwrap();
        assert_eq!(function.name, "show");
        (dir, source, target, CodeRange::from_function(&function))
    }

    const SHOW: &str = "export function show(x: number) {\n  return format(x);\n}";

    #[test]
    fn test_copy_to_file() {
        let (_dir, source, target, range) = setup();
        let outcome = copy_to_file(&source, range, &target, &CopyCodeConfig::default()).unwrap();

        assert!(!outcome.moved);
        assert_eq!(outcome.imports_added, vec!["import { format } from './fmt';"]);
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            format!("import {{ format }} from './fmt';\n\n{}\nexport const other = 2;\n", SHOW)
        );
        assert_eq!(fs::read_to_string(&source).unwrap(), FMT_SOURCE);
    }

    #[test]
    fn test_move_to_file() {
        let (_dir, source, target, range) = setup();
        let outcome = move_to_file(&source, range, &target, &CopyCodeConfig::default()).unwrap();

        assert!(outcome.moved);
        assert!(fs::read_to_string(&target).unwrap().contains(SHOW));
        assert_eq!(
            fs::read_to_string(&source).unwrap(),
            "import { format } from './fmt';\n\n\n\nexport const keep = 1;\n"
        );
    }

    #[test]
    fn test_failed_move_restores_target() {
        let (dir, source, target, range) = setup();
        // A directory in the way of the source's temp file makes its write fail
        fs::create_dir(dir.path().join("a.ts.ctxmenu-tmp")).unwrap();

        let result = move_to_file(&source, range, &target, &CopyCodeConfig::default());
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&target).unwrap(), "export const other = 2;\n");
        assert_eq!(fs::read_to_string(&source).unwrap(), FMT_SOURCE);
    }

    #[test]
    fn test_transfer_rejects_bad_targets() {
        let (dir, source, _target, range) = setup();
        let settings = CopyCodeConfig::default();

        let missing = dir.path().join("missing.ts");
        assert!(copy_to_file(&source, range, &missing, &settings).is_err());

        let err = copy_to_file(&source, range, &source, &settings).unwrap_err();
        assert!(err.to_string().contains("same file"), "{}", err);

        let js = dir.path().join("c.js");
        fs::write(&js, "").unwrap();
        assert!(copy_to_file(&source, range, &js, &settings).is_err());
        assert_eq!(fs::read_to_string(&js).unwrap(), "");
    }

    #[test]
    fn test_transfer_rejects_empty_selection() {
        let (_dir, source, target, _range) = setup();
        let empty = CodeRange::new(Position::new(1, 0), Position::new(1, 0));
        let err = copy_to_file(&source, empty, &target, &CopyCodeConfig::default()).unwrap_err();
        assert!(err.to_string().contains("no code selected"));
    }
}
