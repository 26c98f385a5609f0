//! Build options and configuration.

/// Default domain whose links are stripped from annotation asides.
pub const DEFAULT_INTERNAL_DOMAIN: &str = "verstak.local";

/// Options for building a document from a source tree.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Recognize headings from paragraph style names
    pub recognize_titles: bool,

    /// Links to this domain are removed from annotation asides
    pub internal_domain: String,

    /// Run the typography pass after building
    pub typography: bool,

    /// Allow the join pass of the typography engine
    pub nobr: bool,

    /// Normalize source text to NFC
    pub normalize_unicode: bool,
}

impl BuildOptions {
    /// Create new build options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (unresolved links degrade to text).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable heading recognition.
    pub fn with_titles(mut self, recognize: bool) -> Self {
        self.recognize_titles = recognize;
        self
    }

    /// Set the internal domain.
    pub fn with_internal_domain(mut self, domain: impl Into<String>) -> Self {
        self.internal_domain = domain.into();
        self
    }

    /// Enable or disable the typography pass.
    pub fn with_typography(mut self, enabled: bool) -> Self {
        self.typography = enabled;
        self
    }

    /// Disable the typography pass.
    pub fn without_typography(mut self) -> Self {
        self.typography = false;
        self
    }

    /// Enable or disable the join pass.
    pub fn with_nobr(mut self, enabled: bool) -> Self {
        self.nobr = enabled;
        self
    }

    /// Enable or disable NFC normalization.
    pub fn with_normalization(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            recognize_titles: true,
            internal_domain: DEFAULT_INTERNAL_DOMAIN.to_string(),
            typography: true,
            nobr: true,
            normalize_unicode: true,
        }
    }
}

/// Error handling mode during building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip invalid content and continue
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_options_builder() {
        let options = BuildOptions::new()
            .lenient()
            .with_titles(false)
            .with_internal_domain("example.org")
            .without_typography()
            .with_nobr(false);

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert!(!options.recognize_titles);
        assert_eq!(options.internal_domain, "example.org");
        assert!(!options.typography);
        assert!(!options.nobr);
    }

    #[test]
    fn test_default_options() {
        let options = BuildOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(options.recognize_titles);
        assert!(options.typography);
        assert!(options.normalize_unicode);
        assert_eq!(options.internal_domain, DEFAULT_INTERNAL_DOMAIN);
    }
}
