//! Proptest strategies producing adversarial platform strings.
//!
//! Three layers: atoms from a closed vocabulary, fragments built by
//! recursively concatenating atoms, and candidates built by dash-joining
//! fragments. Nothing is filtered here; rejection policy belongs to the
//! oracle.

use proptest::prelude::*;

/// Maximum children per fragment-tree node.
pub const MAX_CHILDREN: usize = 4;

/// Maximum fragments joined into one candidate.
pub const MAX_FRAGMENTS: usize = 5;

/// Recursion depth budget for fragment trees.
const MAX_DEPTH: u32 = 4;

const CPU_ATOMS: &[&str] = &["x86", "x86_64", "arm", "arm64", "i386", "i486", "aarch64"];

const OS_ATOMS: &[&str] = &[
    "linux",
    "darwin",
    "freebsd",
    "mingw",
    "mswin",
    "mswin64",
    "java",
    "jruby",
    "aix",
    "cygwin",
    "macruby",
    "dalvik",
    "dotnet",
    "mingw32",
    "openbsd",
    "solaris",
    "wasi",
    "test_platform",
];

/// Version-shaped tokens, valid and deliberately malformed (double dots,
/// dangling dots) alike.
const VERSION_ATOMS: &[&str] = &[
    "1",
    "1.0",
    "1..0",
    "1..",
    ".0",
    "1.",
    "..",
    "12299",
    "gnueabihf",
];

/// One vocabulary token: empty, bare zero, a CPU name, an OS name, or a
/// version-shaped token.
pub fn arb_atom() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("0".to_owned()),
        prop::sample::select(CPU_ATOMS).prop_map(str::to_owned),
        prop::sample::select(OS_ATOMS).prop_map(str::to_owned),
        prop::sample::select(VERSION_ATOMS).prop_map(str::to_owned),
    ]
}

/// A fragment: a recursively nested sequence of atoms, flattened by plain
/// concatenation at every level. No separators are injected.
pub fn arb_fragment() -> impl Strategy<Value = String> {
    arb_atom().prop_recursive(MAX_DEPTH, 32, MAX_CHILDREN as u32, |inner| {
        prop::collection::vec(inner, 0..=MAX_CHILDREN).prop_map(|children| children.concat())
    })
}

/// A candidate platform string: up to [`MAX_FRAGMENTS`] fragments joined
/// with the platform field separator.
pub fn arb_platform_string() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_fragment(), 0..=MAX_FRAGMENTS)
        .prop_map(|fragments| fragments.join("-"))
}
