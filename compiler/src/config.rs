use tiny_regex_runtime::DEFAULT_RECURSION_LIMIT;

/// The default maximum number of simultaneously open groups.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 256;

/// Reserved matching modes. No modes are currently defined and an empty set
/// of flags leaves behavior unchanged.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Flags(u32);

impl Flags {
    pub const NONE: Self = Self(0);

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Limits and options applied while compiling a pattern.
///
/// # Example
///
/// ```
/// use tiny_regex_compiler::{compile_with_config, Config, ParseErrKind};
///
/// let config = Config::default().with_max_nesting_depth(1);
///
/// assert!(compile_with_config("(a)", &config).is_ok());
/// assert_eq!(
///     Err(ParseErrKind::StackOverflow),
///     compile_with_config("((a))", &config).map_err(|e| e.kind)
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    max_nesting_depth: usize,
    max_recursion_depth: usize,
    flags: Flags,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_recursion_depth: DEFAULT_RECURSION_LIMIT,
            flags: Flags::NONE,
        }
    }
}

impl Config {
    /// Bounds the number of groups that may be open at once.
    pub fn with_max_nesting_depth(mut self, max_nesting_depth: usize) -> Self {
        self.max_nesting_depth = max_nesting_depth;
        self
    }

    /// Bounds the recursion depth a compiled program may require of the VM.
    /// The compiled program carries the same bound, clamped to
    /// [MAX_RECURSION_LIMIT](tiny_regex_runtime::MAX_RECURSION_LIMIT).
    pub fn with_max_recursion_depth(mut self, max_recursion_depth: usize) -> Self {
        self.max_recursion_depth = max_recursion_depth;
        self
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn max_nesting_depth(&self) -> usize {
        self.max_nesting_depth
    }

    pub fn max_recursion_depth(&self) -> usize {
        self.max_recursion_depth
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_reference_limits() {
        let config = Config::default();

        assert_eq!(DEFAULT_MAX_NESTING_DEPTH, config.max_nesting_depth());
        assert_eq!(DEFAULT_RECURSION_LIMIT, config.max_recursion_depth());
        assert!(config.flags().is_empty());
    }

    #[test]
    fn should_compile_identically_with_empty_flags() {
        let config = Config::default().with_flags(Flags::NONE);

        assert_eq!(
            crate::compile("(a|b)+?c"),
            crate::compile_with_config("(a|b)+?c", &config)
        );
    }
}
