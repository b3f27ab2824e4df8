//! Fixed lookup tables mapping Jest names onto their Vitest equivalents.

/// Module the consolidated import is emitted from.
pub const VITEST_MODULE: &str = "vitest";

/// Namespace object of the legacy framework.
pub const JEST_NAMESPACE: &str = "jest";

/// Namespace object of the target framework.
pub const VI_NAMESPACE: &str = "vi";

/// Test-lifecycle functions that become named imports when used.
pub const LIFECYCLE_FUNCTIONS: &[&str] = &[
    "afterAll",
    "afterEach",
    "beforeAll",
    "beforeEach",
    "describe",
    "expect",
    "it",
    "test",
];

/// Iterator variables are commonly named `it`, so it is only registered
/// when called bare.
pub const BARE_ONLY_FUNCTIONS: &[&str] = &["it"];

/// Names exported by vitest as types only.
pub const VITEST_TYPE_EXPORTS: &[&str] = &[
    "ExpectationResult",
    "Mock",
    "MockInstance",
    "Mocked",
    "MockedClass",
    "MockedFunction",
];

/// Milliseconds per unit of the legacy timer helpers' duration argument.
pub const TIMER_SCALE_MS: u32 = 1000;

/// Widest single-line import before it is broken into a brace block.
pub const IMPORT_COLUMN_BUDGET: usize = 80;

/// How a `jest.<Member>` type reference is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRewrite {
    /// Replace the reference with an inline structural type.
    Inline(&'static str),
    /// Replace the reference with a vitest type and import it.
    Imported(&'static str),
}

const JEST_TYPES: &[(&str, TypeRewrite)] = &[
    (
        "CustomMatcherResult",
        TypeRewrite::Inline("{ message: () => string; pass: boolean }"),
    ),
    ("Mock", TypeRewrite::Imported("Mock")),
    ("Mocked", TypeRewrite::Imported("Mocked")),
    ("MockedClass", TypeRewrite::Imported("MockedClass")),
    ("MockedFunction", TypeRewrite::Imported("MockedFunction")),
    ("SpyInstance", TypeRewrite::Imported("MockInstance")),
];

const SUGGESTION_THRESHOLD: f64 = 0.8;

pub fn jest_type(member: &str) -> Option<TypeRewrite> {
    JEST_TYPES
        .iter()
        .find(|(name, _)| *name == member)
        .map(|(_, rewrite)| *rewrite)
}

/// Closest known `jest.*` type name, if any is similar enough.
pub fn suggest_jest_type(member: &str) -> Option<String> {
    JEST_TYPES
        .iter()
        .map(|(name, _)| (*name, strsim::jaro_winkler(member, name)))
        .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(name, _)| name.to_string())
}

/// Vitest replacement for a bare legacy timer helper.
pub fn timer_helper(name: &str) -> Option<&'static str> {
    match name {
        "advanceTimers" => Some("vi.advanceTimersByTime"),
        "advanceTimersAndPromises" => Some("vi.advanceTimersByTimeAsync"),
        _ => None,
    }
}

pub fn is_lifecycle(name: &str) -> bool {
    LIFECYCLE_FUNCTIONS.contains(&name)
}

pub fn is_bare_only(name: &str) -> bool {
    BARE_ONLY_FUNCTIONS.contains(&name)
}

pub fn is_vitest_type(name: &str) -> bool {
    VITEST_TYPE_EXPORTS.contains(&name)
}
