use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, ReviewError};
use crate::review::ReviewResult;

const TITLE: &str = "# Code Review Report";
const MODE_PREFIX: &str = "**Mode**: ";
const CODE_HEADING: &str = "## Code";
const REVIEW_HEADING: &str = "## Review";

/// How many taken names we step over before giving up.
const MAX_CREATE_ATTEMPTS: u32 = 1000;

/// Write `result` into `output_dir` as `review_<mode>_<n>.md` and return the path.
///
/// `n` starts after the highest index already used for this mode. The file is
/// created with `create_new`, so a name taken in the meantime by another run is
/// skipped rather than overwritten.
pub fn write(result: &ReviewResult, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).map_err(|e| {
        ReviewError::output(format!(
            "failed to create output directory {}",
            output_dir.display()
        ))
        .with_source(e)
    })?;

    let contents = render(result);
    let mut index = next_index(highest_index(output_dir, &result.mode)?, &result.mode)?;

    for _ in 0..MAX_CREATE_ATTEMPTS {
        let path = output_dir.join(file_name(&result.mode, index));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(contents.as_bytes()).map_err(|e| {
                    ReviewError::output(format!("failed to write {}", path.display())).with_source(e)
                })?;
                log::debug!("Wrote review report to {}", path.display());
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                log::debug!("{} already exists, trying the next index", path.display());
                index = next_index(index, &result.mode)?;
            }
            Err(e) => {
                return Err(
                    ReviewError::output(format!("failed to create {}", path.display()))
                        .with_source(e),
                );
            }
        }
    }

    Err(ReviewError::output(format!(
        "could not find a free report name in {}",
        output_dir.display()
    )))
}

fn next_index(index: u32, mode: &str) -> Result<u32> {
    index.checked_add(1).ok_or_else(|| {
        ReviewError::output(format!(
            "report index for mode '{mode}' is exhausted (review_{mode}_{index}.md exists)"
        ))
    })
}

fn file_name(mode: &str, index: u32) -> String {
    format!("review_{mode}_{index}.md")
}

/// Highest `n` among existing `review_<mode>_<n>.md` files, or 0.
fn highest_index(dir: &Path, mode: &str) -> Result<u32> {
    let prefix = format!("review_{mode}_");
    let entries = fs::read_dir(dir).map_err(|e| {
        ReviewError::output(format!("failed to list {}", dir.display())).with_source(e)
    })?;

    let highest = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter_map(|name| {
            name.strip_prefix(&prefix)?
                .strip_suffix(".md")?
                .parse::<u32>()
                .ok()
        })
        .max()
        .unwrap_or(0);

    Ok(highest)
}

/// A fence longer than any backtick run inside `code`.
fn fence_for(code: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in code.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

/// The Markdown report for `result`.
pub fn render(result: &ReviewResult) -> String {
    let fence = fence_for(&result.source_text);
    let lang = result.language.unwrap_or("");

    let mut out = String::new();
    out.push_str(&format!("{TITLE}\n\n"));
    out.push_str(&format!("{MODE_PREFIX}{}\n\n", result.mode));
    out.push_str(&format!(
        "{CODE_HEADING}\n{fence}{lang}\n{code}\n{fence}\n\n",
        code = result.source_text
    ));
    out.push_str(&format!("{REVIEW_HEADING}\n{}\n", result.review_text));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A report split back into its parts.
    #[derive(Debug)]
    struct ReviewDocument {
        mode: String,
        code: String,
        review: String,
    }

    fn parse(data: &str) -> Option<ReviewDocument> {
        let rest = data.strip_prefix(&format!("{TITLE}\n\n"))?;
        let rest = rest.strip_prefix(MODE_PREFIX)?;
        let (mode, rest) = rest.split_once("\n\n")?;

        let rest = rest.strip_prefix(&format!("{CODE_HEADING}\n"))?;
        let (fence_line, rest) = rest.split_once('\n')?;
        let fence: String = fence_line.chars().take_while(|c| *c == '`').collect();
        if fence.len() < 3 {
            return None;
        }

        let closing = format!("\n{fence}\n\n{REVIEW_HEADING}\n");
        let (code, review) = rest.split_once(&closing)?;

        Some(ReviewDocument {
            mode: mode.to_string(),
            code: code.to_string(),
            review: review.strip_suffix('\n').unwrap_or(review).to_string(),
        })
    }

    fn read(path: &Path) -> ReviewDocument {
        parse(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn result(mode: &str, code: &str, review: &str) -> ReviewResult {
        ReviewResult {
            source_text: code.to_string(),
            review_text: review.to_string(),
            mode: mode.to_string(),
            language: Some("python"),
        }
    }

    #[test]
    fn first_report_in_empty_dir_is_index_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&result("strict", "x = 1", "Name things."), dir.path()).unwrap();

        assert_eq!(path, dir.path().join("review_strict_1.md"));
        let body = fs::read_to_string(&path).unwrap();
        assert!(body.contains("```python\nx = 1\n```"));
        assert!(body.contains("Name things."));
        assert!(body.starts_with("# Code Review Report\n\n**Mode**: strict\n\n"));
    }

    #[test]
    fn output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let path = write(&result("mentor", "x", "ok"), &nested).unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }

    #[test]
    fn indices_increase_per_mode_and_never_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(&result("strict", "a", "first"), dir.path()).unwrap();
        let b = write(&result("strict", "b", "second"), dir.path()).unwrap();
        let c = write(&result("mentor", "c", "third"), dir.path()).unwrap();

        assert_eq!(a.file_name().unwrap(), "review_strict_1.md");
        assert_eq!(b.file_name().unwrap(), "review_strict_2.md");
        assert_eq!(c.file_name().unwrap(), "review_mentor_1.md");
        assert_eq!(read(&a).review, "first");
    }

    #[test]
    fn index_continues_after_gaps_and_unrelated_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("review_strict_7.md"), "old").unwrap();
        fs::write(dir.path().join("notes.md"), "unrelated").unwrap();
        fs::write(dir.path().join("review_strict_x.md"), "odd").unwrap();

        let path = write(&result("strict", "x", "y"), dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "review_strict_8.md");
        assert_eq!(fs::read_to_string(dir.path().join("review_strict_7.md")).unwrap(), "old");
    }

    #[test]
    fn round_trip_recovers_code_and_review() {
        let dir = tempfile::tempdir().unwrap();
        let code = "def f(x):\n    return x * 2\n";
        let review = "## Issues\n\n- No type hints.\n\n```python\ndef f(x: int) -> int: ...\n```";
        let path = write(&result("test_focus", code, review), dir.path()).unwrap();

        let doc = read(&path);
        assert_eq!(doc.mode, "test_focus");
        assert_eq!(doc.code, code);
        assert_eq!(doc.review, review);
    }

    #[test]
    fn code_containing_fences_gets_a_longer_fence() {
        let code = "doc = \"\"\"\n```\nexample\n```\n\"\"\"";
        let rendered = render(&result("strict", code, "fine"));
        assert!(rendered.contains("````python\n"));

        let doc = parse(&rendered).unwrap();
        assert_eq!(doc.code, code);
        assert_eq!(doc.review, "fine");
    }

    #[test]
    fn literal_input_has_a_bare_fence() {
        let mut r = result("strict", "x", "y");
        r.language = None;
        assert!(render(&r).contains("## Code\n```\nx\n```\n"));
    }

    #[test]
    fn exhausted_index_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let last = dir.path().join(format!("review_strict_{}.md", u32::MAX));
        fs::write(&last, "old").unwrap();

        let err = write(&result("strict", "x", "y"), dir.path()).unwrap_err();
        assert!(matches!(err, ReviewError::Output { msg, .. } if msg.contains("exhausted")));
        assert_eq!(fs::read_to_string(&last).unwrap(), "old");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn index_just_below_the_limit_is_still_usable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(format!("review_mentor_{}.md", u32::MAX - 1)), "old").unwrap();

        let path = write(&result("mentor", "x", "y"), dir.path()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            format!("review_mentor_{}.md", u32::MAX)
        );
    }

    #[test]
    fn unwritable_output_dir_keeps_the_io_cause() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("reviews");
        fs::write(&blocker, "a file, not a directory").unwrap();

        let err = write(&result("strict", "x", "y"), &blocker).unwrap_err();
        assert!(matches!(err, ReviewError::Output { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}
