//! `.env` parsing into a key-value map; applying it to the environment happens in lib.

use std::collections::HashMap;
use std::path::Path;

use crate::LoadError;

/// Parses `KEY=VALUE` lines.
///
/// * Blank lines and lines starting with `#` are skipped; `#` inside a value is kept.
/// * An optional `export ` prefix is ignored.
/// * Double-quoted values unescape `\"` and `\n`; single-quoted values are taken literally.
fn parse(content: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        out.insert(key.to_string(), unquote(value.trim()));
    }
    out
}

fn unquote(value: &str) -> String {
    if let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    {
        return inner.replace("\\n", "\n").replace("\\\"", "\"");
    }
    if let Some(inner) = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
    {
        return inner.to_string();
    }
    value.to_string()
}

/// Reads `.env` from `dir` (default: current directory). A missing file yields an empty map.
pub fn load_env_map(dir: Option<&Path>) -> Result<HashMap<String, String>, LoadError> {
    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => match std::env::current_dir() {
            Ok(d) => d,
            Err(_) => return Ok(HashMap::new()),
        },
    };
    let path = dir.join(".env");
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let content =
        std::fs::read_to_string(&path).map_err(|source| LoadError::Read { path, source })?;
    Ok(parse(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_pairs_comments_and_blank_lines() {
        let m = parse("\n# model\nOPENAI_MODEL=gpt-4o\n  \nRUST_LOG=debug # keep\n");
        assert_eq!(m.get("OPENAI_MODEL").map(String::as_str), Some("gpt-4o"));
        assert_eq!(m.get("RUST_LOG").map(String::as_str), Some("debug # keep"));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn export_prefix_is_ignored() {
        let m = parse("export OPENAI_API_KEY=sk-test\n");
        assert_eq!(m.get("OPENAI_API_KEY").map(String::as_str), Some("sk-test"));
    }

    #[test]
    fn quoted_values() {
        let m = parse("A=\"hello world\"\nB='it''s raw \\n'\nC=\"say \\\"hi\\\"\"\nD=\"\"\n");
        assert_eq!(m["A"], "hello world");
        assert_eq!(m["B"], "it''s raw \\n");
        assert_eq!(m["C"], "say \"hi\"");
        assert_eq!(m["D"], "");
    }

    #[test]
    fn double_quoted_newline_escape() {
        let m = parse("GREETING=\"line one\\nline two\"\n");
        assert_eq!(m["GREETING"], "line one\nline two");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let m = parse("NO_EQUALS\n=orphan\nOK=1\n");
        assert_eq!(m.len(), 1);
        assert_eq!(m["OK"], "1");
    }

    #[test]
    fn missing_file_is_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_map(Some(dir.path())).unwrap().is_empty());
    }

    #[test]
    fn reads_file_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "PROMPTS_DIR=./my-prompts\n").unwrap();
        let m = load_env_map(Some(dir.path())).unwrap();
        assert_eq!(m["PROMPTS_DIR"], "./my-prompts");
    }
}
