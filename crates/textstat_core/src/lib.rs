//! Core domain logic for textstat.
//! This crate owns text storage, text statistics and the role policy.

pub mod access;
pub mod analysis;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::policy::{
    has_permission, role_has_permission, AccessPolicy, AccessPolicyError, Permission, Role,
};
pub use analysis::text_stats::{
    analyze, char_count, longest_word_per_paragraph, paragraph_count, sentence_count, word_count,
    TextStats,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::text::{Text, TextId, TextValidationError, TextValue, MAX_TEXT_VALUE_CHARS};
pub use repo::text_repo::{
    Page, PageRequest, QueryValidationError, RepoError, RepoResult, SortDirection, SortField,
    SortKey, SortSpec, SqliteTextRepository, TextFilter, TextRepository, DEFAULT_PAGE,
    DEFAULT_PAGE_LIMIT,
};
pub use service::text_service::{TextPatch, TextService, TextServiceError};

/// Returns the core crate version, as reported by `/v1/health`.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
