//! Hygiene: production sources must not panic or swallow errors.
//!
//! Scans `src/` (skipping `*_test.rs`) for patterns that either crash the
//! overlay mid-broadcast or discard a failure without logging it. Every
//! budget is zero.

use std::fs;
use std::path::Path;

struct SourceFile {
    path: String,
    content: String,
}

struct Rule {
    pattern: &'static str,
    why: &'static str,
}

const RULES: &[Rule] = &[
    Rule { pattern: ".unwrap()", why: "panics" },
    Rule { pattern: ".expect(", why: "panics" },
    Rule { pattern: "panic!(", why: "panics" },
    Rule { pattern: "unreachable!(", why: "panics" },
    Rule { pattern: "todo!(", why: "unfinished" },
    Rule { pattern: "unimplemented!(", why: "unfinished" },
    Rule { pattern: "let _ =", why: "discards a result silently" },
    Rule { pattern: ".ok()", why: "discards an error silently" },
    Rule { pattern: "#[allow(dead_code)]", why: "hides unused code" },
];

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let path_str = path.to_string_lossy().to_string();
            if path_str.ends_with("_test.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path: path_str, content });
            }
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<String> {
    files
        .iter()
        .flat_map(|file| {
            file.content
                .lines()
                .enumerate()
                .filter(|(_, line)| line.contains(pattern))
                .map(|(n, line)| format!("  {}:{}: {}", file.path, n + 1, line.trim()))
                .collect::<Vec<_>>()
        })
        .collect()
}

#[test]
fn scans_the_crate_sources() {
    let files = source_files();
    assert!(files.iter().any(|f| f.path.ends_with("main.rs")), "run from the crate root");
}

#[test]
fn no_forbidden_patterns() {
    let files = source_files();
    let mut report = Vec::new();
    for rule in RULES {
        let found = hits(&files, rule.pattern);
        if !found.is_empty() {
            report.push(format!("`{}` ({}):\n{}", rule.pattern, rule.why, found.join("\n")));
        }
    }
    assert!(report.is_empty(), "hygiene violations:\n{}", report.join("\n"));
}
