//! Gem platform identifier parsing and normalization.
//!
//! A platform string encodes a build target as dash-joined CPU, OS, and
//! version fields: `x86_64-linux`, `arm64-darwin-20`, `x86-mingw32`. Parsing
//! normalizes CPU aliases (`i686` → `x86`) and OS spellings through an
//! ordered pattern ladder, and `Display` renders the canonical form.
//!
//! Invariant: for any string that parses, formatting the descriptor and
//! parsing the result yields an equal descriptor.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised when a platform string is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The leading CPU field was empty (`""`, `"-linux"`).
    #[error("empty cpu in platform `{input}`")]
    EmptyCpu {
        /// The full rejected string, verbatim.
        input: String,
    },
}

impl ParseError {
    /// The rejected input, verbatim.
    pub fn input(&self) -> &str {
        match self {
            Self::EmptyCpu { input } => input,
        }
    }
}

/// Parsed platform descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// CPU architecture. Absent for OS-only platforms like `java`.
    pub cpu: Option<String>,
    /// Operating system. `unknown` when the OS token is unrecognized.
    pub os: String,
    /// OS or libc version suffix.
    pub version: Option<String>,
}

impl Platform {
    /// Build a descriptor directly, bypassing parsing.
    pub fn new(cpu: Option<&str>, os: &str, version: Option<&str>) -> Self {
        Self {
            cpu: cpu.map(str::to_owned),
            os: os.to_owned(),
            version: version.map(str::to_owned),
        }
    }
}

static CPU_X86: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"i\d86").expect("valid regex"));

/// A bare numeric version: `9`, `2.6`, `12299`.
static FULL_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid regex"));

static OS_AIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"aix(\d+)?").expect("valid regex"));
static OS_CYGWIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"cygwin").expect("valid regex"));
static OS_DARWIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"darwin(\d+)?").expect("valid regex"));
static OS_MACRUBY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^macruby$").expect("valid regex"));
static OS_FREEBSD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"freebsd(\d+)?").expect("valid regex"));
static OS_JAVA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:java|jruby)$").expect("valid regex"));
static OS_JAVA_VERSIONED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^java([\d.]*)").expect("valid regex"));
static OS_DALVIK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^dalvik(\d+)?$").expect("valid regex"));
static OS_DOTNET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^dotnet$").expect("valid regex"));
static OS_DOTNET_VERSIONED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^dotnet([\d.]*)").expect("valid regex"));
static OS_LINUX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"linux-?(\w+)?").expect("valid regex"));
static OS_MINGW32: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"mingw32").expect("valid regex"));
static OS_MINGW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"mingw-?(\w+)?").expect("valid regex"));
static OS_MSWIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(mswin\d+)(?:_(\d+))?").expect("valid regex"));
static OS_NETBSDELF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"netbsdelf").expect("valid regex"));
static OS_OPENBSD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"openbsd(\d+\.\d+)?").expect("valid regex"));
static OS_SOLARIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"solaris(\d+\.\d+)?").expect("valid regex"));
static OS_WASI: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"wasi").expect("valid regex"));
static OS_TEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+_platform)(\d+)?").expect("valid regex"));

impl FromStr for Platform {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts: Vec<String> = s.split('-').map(str::to_owned).collect();

        // Reassemble a digitless trailing segment into the one before it,
        // so `x86-linux-gnu` keeps its libc suffix with the OS token.
        if parts.len() > 2 && !parts[parts.len() - 1].chars().any(|c| c.is_ascii_digit()) {
            let extra = parts.pop().unwrap_or_default();
            let idx = parts.len() - 1;
            parts[idx].push('-');
            parts[idx].push_str(&extra);
        }

        let mut segments = parts.into_iter();
        let cpu_token = segments.next().unwrap_or_default();
        if cpu_token.is_empty() {
            return Err(ParseError::EmptyCpu {
                input: s.to_owned(),
            });
        }
        let cpu = if CPU_X86.is_match(&cpu_token) {
            "x86".to_owned()
        } else {
            cpu_token.clone()
        };

        let mut rest: Vec<String> = segments.collect();

        if rest.is_empty() {
            // Bare OS form (`java`, `mswin32`): the only token is the OS,
            // pre-normalization.
            let (os, version) = normalize_os(&cpu_token, false);
            return Ok(Self {
                cpu: None,
                os,
                version,
            });
        }

        if rest.len() == 2 && FULL_VERSION.is_match(&rest[1]) {
            // Explicit cpu-os-version form: os passes through verbatim.
            let version = rest.pop();
            let os = rest.pop().unwrap_or_default();
            return Ok(Self {
                cpu: Some(cpu),
                os,
                version,
            });
        }

        // Segments beyond the OS token carry no meaning here and are dropped.
        let (os, version) = normalize_os(&rest[0], true);
        Ok(Self {
            cpu: Some(cpu),
            os,
            version,
        })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cpu) = &self.cpu {
            write!(f, "{cpu}-")?;
        }
        f.write_str(&self.os)?;
        if let Some(version) = &self.version {
            write!(f, "-{version}")?;
        }
        Ok(())
    }
}

/// Normalize one OS token through the ordered pattern ladder.
///
/// `with_cpu` is false in the bare OS form, whose canonical rendering has no
/// CPU slot: `os-version` would re-parse with `os` in the CPU position, so a
/// version extracted there cannot be carried and is dropped.
fn normalize_os(token: &str, with_cpu: bool) -> (String, Option<String>) {
    if let Some(c) = OS_AIX.captures(token) {
        return ("aix".to_owned(), numeric_version(&c, 1, with_cpu));
    }
    if OS_CYGWIN.is_match(token) {
        return ("cygwin".to_owned(), None);
    }
    if let Some(c) = OS_DARWIN.captures(token) {
        return ("darwin".to_owned(), numeric_version(&c, 1, with_cpu));
    }
    if OS_MACRUBY.is_match(token) {
        return ("macruby".to_owned(), None);
    }
    if let Some(c) = OS_FREEBSD.captures(token) {
        return ("freebsd".to_owned(), numeric_version(&c, 1, with_cpu));
    }
    if OS_JAVA.is_match(token) {
        return ("java".to_owned(), None);
    }
    if let Some(c) = OS_JAVA_VERSIONED.captures(token) {
        return ("java".to_owned(), dotted_version(&c, 1, with_cpu));
    }
    if let Some(c) = OS_DALVIK.captures(token) {
        return ("dalvik".to_owned(), numeric_version(&c, 1, with_cpu));
    }
    if OS_DOTNET.is_match(token) {
        return ("dotnet".to_owned(), None);
    }
    if let Some(c) = OS_DOTNET_VERSIONED.captures(token) {
        return ("dotnet".to_owned(), dotted_version(&c, 1, with_cpu));
    }
    if let Some(c) = OS_LINUX.captures(token) {
        return ("linux".to_owned(), libc_version(&c, 1, with_cpu));
    }
    if OS_MINGW32.is_match(token) {
        return ("mingw32".to_owned(), None);
    }
    if let Some(c) = OS_MINGW.captures(token) {
        return ("mingw".to_owned(), libc_version(&c, 1, with_cpu));
    }
    if let Some(c) = OS_MSWIN.captures(token) {
        let os = c.get(1).map_or_else(String::new, |m| m.as_str().to_owned());
        return (os, numeric_version(&c, 2, with_cpu));
    }
    if OS_NETBSDELF.is_match(token) {
        return ("netbsdelf".to_owned(), None);
    }
    if let Some(c) = OS_OPENBSD.captures(token) {
        return ("openbsd".to_owned(), numeric_version(&c, 1, with_cpu));
    }
    if let Some(c) = OS_SOLARIS.captures(token) {
        return ("solaris".to_owned(), numeric_version(&c, 1, with_cpu));
    }
    if OS_WASI.is_match(token) {
        return ("wasi".to_owned(), None);
    }
    if let Some(c) = OS_TEST.captures(token) {
        let os = c.get(1).map_or_else(String::new, |m| m.as_str().to_owned());
        return (os, numeric_version(&c, 2, with_cpu));
    }
    ("unknown".to_owned(), None)
}

fn capture(c: &Captures<'_>, idx: usize, with_cpu: bool) -> Option<String> {
    if !with_cpu {
        return None;
    }
    c.get(idx)
        .map(|m| m.as_str().to_owned())
        .filter(|v| !v.is_empty())
}

/// Capture groups that are digits (and optionally one dot) by construction.
fn numeric_version(c: &Captures<'_>, idx: usize, with_cpu: bool) -> Option<String> {
    capture(c, idx, with_cpu)
}

/// `[\d.]*` captures: only a plain `N` or `N.N` survives a re-parse of the
/// canonical form; anything else (`1..0`, `1.`) is dropped.
fn dotted_version(c: &Captures<'_>, idx: usize, with_cpu: bool) -> Option<String> {
    capture(c, idx, with_cpu).filter(|v| FULL_VERSION.is_match(v))
}

/// `\w+` libc captures (`gnu`, `musl`, `gnueabihf`): a suffix mixing digits
/// and letters cannot ride in the version slot of the canonical form and is
/// dropped.
fn libc_version(c: &Captures<'_>, idx: usize, with_cpu: bool) -> Option<String> {
    capture(c, idx, with_cpu).filter(|v| {
        FULL_VERSION.is_match(v) || v.chars().all(|ch| ch.is_ascii_alphabetic() || ch == '_')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Platform {
        s.parse().unwrap_or_else(|e| panic!("{s:?} failed: {e}"))
    }

    #[test]
    fn parses_known_platform_strings() {
        let cases: &[(&str, (Option<&str>, &str, Option<&str>))] = &[
            ("x86_64-linux", (Some("x86_64"), "linux", None)),
            ("x86_64-linux-gnu", (Some("x86_64"), "linux", Some("gnu"))),
            ("x86_64-linux-musl", (Some("x86_64"), "linux", Some("musl"))),
            ("arm64-darwin-20", (Some("arm64"), "darwin", Some("20"))),
            ("arm-linux-gnueabihf", (Some("arm"), "linux", Some("gnueabihf"))),
            ("amd64-freebsd6", (Some("amd64"), "freebsd", Some("6"))),
            ("i386-mswin32", (Some("x86"), "mswin32", None)),
            ("i686-solaris2.9", (Some("x86"), "solaris", Some("2.9"))),
            ("x86-mswin32-80", (Some("x86"), "mswin32", Some("80"))),
            ("universal-dotnet2.0", (Some("universal"), "dotnet", Some("2.0"))),
            ("powerpc-aix5", (Some("powerpc"), "aix", Some("5"))),
            ("x86-openbsd5.2", (Some("x86"), "openbsd", Some("5.2"))),
            ("wasm32-wasi", (Some("wasm32"), "wasi", None)),
            ("i486-cygwin", (Some("x86"), "cygwin", None)),
            ("java", (None, "java", None)),
            ("jruby", (None, "java", None)),
            ("mswin32", (None, "mswin32", None)),
            ("dalvik", (None, "dalvik", None)),
            ("test_platform", (None, "test_platform", None)),
            ("nonsense", (None, "unknown", None)),
        ];

        for (input, (cpu, os, version)) in cases {
            let expected = Platform::new(*cpu, os, *version);
            assert_eq!(parse(input), expected, "input {input:?}");
        }
    }

    #[test]
    fn unrecognized_os_becomes_unknown() {
        assert_eq!(parse("x86-bogus"), Platform::new(Some("x86"), "unknown", None));
        assert_eq!(parse("1..0-x86"), Platform::new(Some("1..0"), "unknown", None));
    }

    #[test]
    fn cpu_os_version_form_keeps_os_verbatim() {
        // The three-segment numeric-version form does not run the ladder.
        assert_eq!(parse("a-b-9"), Platform::new(Some("a"), "b", Some("9")));
        assert_eq!(parse("x86--9"), Platform::new(Some("x86"), "", Some("9")));
    }

    #[test]
    fn extra_segments_are_dropped() {
        assert_eq!(
            parse("x86-linux-arm-12299"),
            Platform::new(Some("x86"), "linux", None)
        );
    }

    #[test]
    fn empty_cpu_is_rejected_with_full_input() {
        for input in ["", "-", "-linux", "-x86_64-linux"] {
            let err = input.parse::<Platform>().unwrap_err();
            assert_eq!(err.input(), input);
            assert_eq!(err.to_string(), format!("empty cpu in platform `{input}`"));
        }
    }

    #[test]
    fn display_joins_present_fields() {
        assert_eq!(
            Platform::new(Some("x86_64"), "linux", None).to_string(),
            "x86_64-linux"
        );
        assert_eq!(
            Platform::new(Some("arm64"), "darwin", Some("20")).to_string(),
            "arm64-darwin-20"
        );
        assert_eq!(Platform::new(None, "java", None).to_string(), "java");
    }

    #[test]
    fn canonical_form_reparses_equal() {
        let inputs = [
            "x86_64-linux-gnu",
            "arm64-darwin-20",
            "i386-mswin32",
            "darwin-9",
            "linuxfoo",
            "x86-mingw-0",
            "javadarwin",
            "mswin64",
            "x86--9",
            "aarch64-linux1gnu",
        ];
        for input in inputs {
            let first = parse(input);
            let second = parse(&first.to_string());
            assert_eq!(first, second, "input {input:?}");
        }
    }

    #[test]
    fn bare_os_token_drops_version_digits() {
        // `darwin20` renders as `darwin`; keeping the 20 would put it in the
        // CPU slot on re-parse.
        assert_eq!(parse("darwin20"), Platform::new(None, "darwin", None));
        assert_eq!(parse("linux3"), Platform::new(None, "linux", None));
    }

    #[test]
    fn flattening_long_input_is_linear() {
        let fragment = "x86_64linuxdarwin12299".repeat(64);
        let candidate = [
            fragment.as_str(),
            fragment.as_str(),
            fragment.as_str(),
            fragment.as_str(),
            fragment.as_str(),
        ]
        .join("-");
        let first = parse(&candidate);
        assert_eq!(first, parse(&first.to_string()));
    }
}
