//! Text use-case service.
//!
//! # Responsibility
//! - Provide create/get/query/update/delete entry points for texts.
//! - Validate raw input before it reaches the repository.
//!
//! # Invariants
//! - Mutating calls return the entity as read back from storage.
//! - `delete_text` returns the representation the text had before removal.

use crate::model::text::{Text, TextId, TextValidationError, TextValue};
use crate::repo::text_repo::{
    Page, PageRequest, RepoError, RepoResult, TextFilter, TextRepository,
};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for text use-cases.
#[derive(Debug)]
pub enum TextServiceError {
    /// Input value failed validation.
    Validation(TextValidationError),
    /// Target text does not exist.
    NotFound(TextId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for TextServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "text not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent text state: {details}"),
        }
    }
}

impl Error for TextServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) | Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for TextServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<TextValidationError> for TextServiceError {
    fn from(value: TextValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Partial update; `value` is the only mutable field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextPatch {
    pub value: Option<String>,
}

/// Text service facade over repository implementations.
pub struct TextService<R: TextRepository> {
    repo: R,
}

impl<R: TextRepository> TextService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and stores a new text.
    pub fn create_text(&self, value: impl AsRef<str>) -> Result<Text, TextServiceError> {
        let value = TextValue::parse(value)?;
        let id = self.repo.create_text(Uuid::new_v4(), &value)?;
        let text = self
            .repo
            .get_text(id)?
            .ok_or(TextServiceError::InconsistentState(
                "created text not found in read-back",
            ))?;

        info!(
            "event=text_create module=service status=ok id={} chars={}",
            text.id,
            text.value.chars().count()
        );
        Ok(text)
    }

    /// Gets one text by stable ID.
    pub fn get_text(&self, id: TextId) -> RepoResult<Option<Text>> {
        self.repo.get_text(id)
    }

    /// Lists texts matching `filter`, one page at a time.
    pub fn query_texts(
        &self,
        filter: &TextFilter,
        request: &PageRequest,
    ) -> RepoResult<Page<Text>> {
        let page = self.repo.query_texts(filter, request)?;
        debug!(
            "event=text_query module=service status=ok page={} limit={} returned={} total={}",
            page.page,
            page.limit,
            page.results.len(),
            page.total_results
        );
        Ok(page)
    }

    /// Applies `patch` to an existing text.
    ///
    /// An empty patch is a no-op that still fails with `NotFound` for
    /// unknown ids.
    pub fn update_text(&self, id: TextId, patch: TextPatch) -> Result<Text, TextServiceError> {
        let Some(raw) = patch.value else {
            return self.repo.get_text(id)?.ok_or(TextServiceError::NotFound(id));
        };

        let value = TextValue::parse(raw)?;
        self.repo.update_text_value(id, &value)?;
        let text = self
            .repo
            .get_text(id)?
            .ok_or(TextServiceError::InconsistentState(
                "updated text not found in read-back",
            ))?;

        info!("event=text_update module=service status=ok id={}", text.id);
        Ok(text)
    }

    /// Removes a text and returns what was removed.
    pub fn delete_text(&self, id: TextId) -> Result<Text, TextServiceError> {
        let text = self
            .repo
            .get_text(id)?
            .ok_or(TextServiceError::NotFound(id))?;
        self.repo.delete_text(id)?;

        info!("event=text_delete module=service status=ok id={}", id);
        Ok(text)
    }
}
