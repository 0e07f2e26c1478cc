//! Generation flags.
//!
//! [`GenerationConfig`] is built once per run and passed by reference to
//! every translator.

/// Naming convention of persisted record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PersistenceNaming {
    /// `_title`, lazy flag `__title_ExtraFlag`.
    #[default]
    Current,
    /// `title`, lazy flag `title_ExtraFlag`, as written by older models.
    Legacy,
}

/// Shape of emitted asynchronous code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConcurrencyStyle {
    /// Completion callbacks joined with a `DispatchGroup`.
    Futures,
    /// `async` functions joined with a task group.
    #[default]
    Structured,
}

/// Reactive framework used by emitted observable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignalStyle {
    /// ReactiveKit `Property` and `DisposeBag`.
    ReactiveKit,
    /// Combine `CurrentValueSubject` and `AnyCancellable`.
    #[default]
    Combine,
}

impl SignalStyle {
    /// Returns the module to import.
    #[must_use]
    pub const fn module(&self) -> &'static str {
        match self {
            Self::ReactiveKit => "ReactiveKit",
            Self::Combine => "Combine",
        }
    }
}

/// Per-run generation flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Persisted field naming.
    pub persistence_naming: PersistenceNaming,
    /// Asynchronous code shape.
    pub concurrency: ConcurrencyStyle,
    /// Reactive framework.
    pub signals: SignalStyle,
    /// Version of the app being generated. Migration tests are emitted for
    /// every released version strictly below it. Defaults to the description
    /// version when unset.
    pub app_version: Option<String>,
    /// Module the generated sources belong to.
    pub module_name: String,
}

impl GenerationConfig {
    /// Creates a configuration with default flags.
    #[must_use]
    pub fn new() -> Self {
        Self {
            persistence_naming: PersistenceNaming::default(),
            concurrency: ConcurrencyStyle::default(),
            signals: SignalStyle::default(),
            app_version: None,
            module_name: "App".to_string(),
        }
    }

    /// Sets the persisted field naming.
    #[must_use]
    pub fn persistence_naming(mut self, naming: PersistenceNaming) -> Self {
        self.persistence_naming = naming;
        self
    }

    /// Sets the asynchronous code shape.
    #[must_use]
    pub fn concurrency(mut self, style: ConcurrencyStyle) -> Self {
        self.concurrency = style;
        self
    }

    /// Sets the reactive framework.
    #[must_use]
    pub fn signals(mut self, style: SignalStyle) -> Self {
        self.signals = style;
        self
    }

    /// Sets the app version.
    #[must_use]
    pub fn app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = Some(version.into());
        self
    }

    /// Sets the module name.
    #[must_use]
    pub fn module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.persistence_naming, PersistenceNaming::Current);
        assert_eq!(config.concurrency, ConcurrencyStyle::Structured);
        assert_eq!(config.signals, SignalStyle::Combine);
        assert_eq!(config.app_version, None);
    }

    #[test]
    fn test_builder() {
        let config = GenerationConfig::new()
            .persistence_naming(PersistenceNaming::Legacy)
            .concurrency(ConcurrencyStyle::Futures)
            .signals(SignalStyle::ReactiveKit)
            .app_version("2.0.0")
            .module_name("Library");
        assert_eq!(config.persistence_naming, PersistenceNaming::Legacy);
        assert_eq!(config.concurrency, ConcurrencyStyle::Futures);
        assert_eq!(config.signals.module(), "ReactiveKit");
        assert_eq!(config.app_version.as_deref(), Some("2.0.0"));
        assert_eq!(config.module_name, "Library");
    }
}
