//! Breakpoint discovery from the site stylesheet.
//!
//! Responsive sizes are not configured separately: they are read from custom
//! property declarations of the form
//!
//! ```css
//! :root {
//!     --breakpoint-sm: 480px;
//!     --breakpoint-lg: 1024px;
//! }
//! ```
//!
//! Every `--breakpoint-<token>: <int>px;` declaration contributes one target
//! size. Sizes keep the order in which their token first appears. Equal
//! values under different tokens are not merged. A token declared twice keeps
//! its first position and takes the last value, so a later override in a
//! media query replaces the earlier number without reordering the list.

use regex::Regex;
use std::io;
use std::path::Path;
use std::sync::LazyLock;
use tracing::warn;

static BREAKPOINT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"--breakpoint-([a-z0-9]+):\s*([0-9]+)px;").expect("valid breakpoint regex")
});

/// A named breakpoint and its pixel value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub token: String,
    pub size: u32,
}

/// Ordered breakpoints read from a stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breakpoints {
    entries: Vec<Breakpoint>,
}

impl Breakpoints {
    pub fn entries(&self) -> &[Breakpoint] {
        &self.entries
    }

    /// Target sizes in first-appearance order.
    pub fn sizes(&self) -> Vec<u32> {
        self.entries.iter().map(|b| b.size).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn set(&mut self, token: &str, size: u32) {
        match self.entries.iter_mut().find(|b| b.token == token) {
            Some(existing) => existing.size = size,
            None => self.entries.push(Breakpoint {
                token: token.to_string(),
                size,
            }),
        }
    }
}

/// Extract breakpoints from stylesheet text.
///
/// Declarations with a zero or out-of-range value are skipped with a
/// warning; a target size must be a positive pixel count. No declarations
/// yields an empty set, which callers treat as "nothing to generate".
pub fn parse_breakpoints(css: &str) -> Breakpoints {
    let mut breakpoints = Breakpoints::default();
    for caps in BREAKPOINT_DECL.captures_iter(css) {
        let token = &caps[1];
        match caps[2].parse::<u32>() {
            Ok(0) => warn!("ignoring --breakpoint-{token}: 0px (size must be positive)"),
            Ok(size) => breakpoints.set(token, size),
            Err(_) => warn!("ignoring --breakpoint-{token}: {}px (out of range)", &caps[2]),
        }
    }
    breakpoints
}

/// Read and parse the stylesheet at `path`.
pub fn read_breakpoints_file(path: &Path) -> io::Result<Breakpoints> {
    let css = std::fs::read_to_string(path)?;
    Ok(parse_breakpoints(&css))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_declarations_in_order() {
        let css = r#"
:root {
    --breakpoint-sm: 480px;
    --breakpoint-md: 768px;
    --breakpoint-2xl: 1536px;
}
"#;
        let bp = parse_breakpoints(css);
        assert_eq!(bp.sizes(), vec![480, 768, 1536]);
        let tokens: Vec<&str> = bp.entries().iter().map(|b| b.token.as_str()).collect();
        assert_eq!(tokens, vec!["sm", "md", "2xl"]);
    }

    #[test]
    fn order_is_appearance_not_numeric() {
        let css = "--breakpoint-lg: 1024px; --breakpoint-sm: 480px;";
        assert_eq!(parse_breakpoints(css).sizes(), vec![1024, 480]);
    }

    #[test]
    fn equal_values_are_not_deduplicated() {
        let css = "--breakpoint-a: 600px; --breakpoint-b: 600px;";
        assert_eq!(parse_breakpoints(css).sizes(), vec![600, 600]);
    }

    #[test]
    fn repeated_token_keeps_position_takes_last_value() {
        let css = r#"
--breakpoint-sm: 480px;
--breakpoint-lg: 1024px;
@media print { :root { --breakpoint-sm: 320px; } }
"#;
        let bp = parse_breakpoints(css);
        assert_eq!(bp.sizes(), vec![320, 1024]);
    }

    #[test]
    fn empty_input_yields_no_sizes() {
        assert!(parse_breakpoints("").is_empty());
        assert!(parse_breakpoints("body { margin: 0; }").is_empty());
    }

    #[test]
    fn non_matching_declarations_ignored() {
        let css = r#"
--breakpoint-sm: 480em;
--breakpoint-MD: 768px;
--breakpoint-lg:1024px;
--breakpoint-xl: 12.5px;
--bp-xs: 320px;
--breakpoint-xs: 360px
"#;
        // Only `lg` matches: em units, uppercase tokens, decimals, other
        // prefixes and a missing semicolon are all rejected.
        assert_eq!(parse_breakpoints(css).sizes(), vec![1024]);
    }

    #[test]
    fn zero_and_overflowing_values_skipped() {
        let css = "--breakpoint-a: 0px; --breakpoint-b: 99999999999px; --breakpoint-c: 640px;";
        let bp = parse_breakpoints(css);
        assert_eq!(bp.sizes(), vec![640]);
        assert_eq!(bp.len(), 1);
    }

    #[test]
    fn non_ascii_digits_do_not_match() {
        let css = "--breakpoint-ar: \u{664}\u{668}\u{660}px; --breakpoint-c: 640px;";
        assert_eq!(parse_breakpoints(css).entries().len(), 1);
        assert_eq!(parse_breakpoints(css).sizes(), vec![640]);
    }

    #[test]
    fn reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("styles.css");
        std::fs::write(&path, "--breakpoint-sm: 480px;\n--breakpoint-lg: 1024px;").unwrap();
        assert_eq!(read_breakpoints_file(&path).unwrap().sizes(), vec![480, 1024]);
    }

    #[test]
    fn missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(read_breakpoints_file(&tmp.path().join("nope.css")).is_err());
    }
}
