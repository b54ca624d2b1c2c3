//! Lowering options.

use nnl_diagnostic::DiagnosticConfig;

/// Options for one lowering pass.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct LowerConfig {
    /// Maximum number of errors reported before further errors are dropped
    /// (0 = unlimited). Lowering itself always runs to completion.
    pub error_limit: usize,
    /// Report an error code at a given position only once.
    pub deduplicate: bool,
    /// Give function and class clusters their declared name.
    pub name_clusters: bool,
    /// Name of the module variable holding a restructured conditional's
    /// selected branch.
    pub case_selector_name: String,
    /// Name of the module variable holding a short-circuit result inside a
    /// condition.
    pub bool_result_name: String,
}

impl Default for LowerConfig {
    fn default() -> Self {
        LowerConfig {
            error_limit: 100,
            deduplicate: true,
            name_clusters: true,
            case_selector_name: "CaseSelector".to_owned(),
            bool_result_name: "BoolResult".to_owned(),
        }
    }
}

impl LowerConfig {
    #[must_use]
    pub fn with_error_limit(mut self, limit: usize) -> Self {
        self.error_limit = limit;
        self
    }

    #[must_use]
    pub fn with_deduplicate(mut self, deduplicate: bool) -> Self {
        self.deduplicate = deduplicate;
        self
    }

    #[must_use]
    pub fn with_name_clusters(mut self, name_clusters: bool) -> Self {
        self.name_clusters = name_clusters;
        self
    }

    #[must_use]
    pub fn with_case_selector_name(mut self, name: impl Into<String>) -> Self {
        self.case_selector_name = name.into();
        self
    }

    #[must_use]
    pub fn with_bool_result_name(mut self, name: impl Into<String>) -> Self {
        self.bool_result_name = name.into();
        self
    }

    /// Queue options derived from this config.
    pub fn diagnostic_config(&self) -> DiagnosticConfig {
        DiagnosticConfig {
            error_limit: self.error_limit,
            deduplicate: self.deduplicate,
        }
    }
}
