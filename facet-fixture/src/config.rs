/// Knobs read by the engine during a manufacturing call.
///
/// A `Fixture` owns its configuration; it is never shared mutably between
/// calls.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct FixtureConfig {
    /// Entries per container when no size attribute applies
    pub collection_size: usize,

    /// Length of generated strings when no length or pattern applies
    pub string_length: usize,

    /// Maximum nesting depth of one call
    pub max_depth: usize,

    /// Reuse record instances of the same bound type within one call
    pub memoization: bool,

    /// Allow `Null` for values whose type cannot be resolved, even where the
    /// field or parameter is not nullable
    pub allow_nulls: bool,

    /// Element type of raw (unparameterized) containers
    pub fallback_element: String,
}

/// Default value of [`FixtureConfig::collection_size`]
pub const DEFAULT_COLLECTION_SIZE: usize = 5;

/// Default value of [`FixtureConfig::string_length`]
pub const DEFAULT_STRING_LENGTH: usize = 10;

/// Default value of [`FixtureConfig::max_depth`]
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default value of [`FixtureConfig::fallback_element`]
pub const OBJECT: &str = "Object";

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            collection_size: DEFAULT_COLLECTION_SIZE,
            string_length: DEFAULT_STRING_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
            memoization: false,
            allow_nulls: false,
            fallback_element: OBJECT.to_string(),
        }
    }
}

impl FixtureConfig {
    /// Sets [`FixtureConfig::collection_size`].
    pub fn collection_size(mut self, size: usize) -> Self {
        self.collection_size = size;
        self
    }

    /// Sets [`FixtureConfig::string_length`].
    pub fn string_length(mut self, length: usize) -> Self {
        self.string_length = length;
        self
    }

    /// Sets [`FixtureConfig::max_depth`].
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets [`FixtureConfig::memoization`].
    pub fn memoization(mut self, enabled: bool) -> Self {
        self.memoization = enabled;
        self
    }

    /// Sets [`FixtureConfig::allow_nulls`].
    pub fn allow_nulls(mut self, allowed: bool) -> Self {
        self.allow_nulls = allowed;
        self
    }

    /// Sets [`FixtureConfig::fallback_element`].
    pub fn fallback_element(mut self, type_identifier: impl Into<String>) -> Self {
        self.fallback_element = type_identifier.into();
        self
    }
}
