//! Text repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and paginated query APIs over the `texts` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths only accept validated `TextValue`s.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Query ordering is total: `rowid` is always the last sort key.

use crate::db::DbError;
use crate::model::text::{Text, TextId, TextValidationError, TextValue};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const DEFAULT_PAGE: u32 = 1;

const TEXT_SELECT_SQL: &str = "SELECT
    uuid,
    value,
    created_at,
    updated_at
FROM texts";

const NOW_EPOCH_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for text persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(TextId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "text not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted text data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Rejected list-query options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValidationError {
    /// `sortBy` entry is not `field:direction`.
    MalformedSort(String),
    /// `sortBy` names a field that cannot be sorted on.
    UnknownSortField(String),
    /// `sortBy` direction is neither `asc` nor `desc`.
    UnknownSortDirection(String),
    /// `limit` is below 1 or out of range.
    InvalidLimit(i64),
    /// `page` is below 1 or out of range.
    InvalidPage(i64),
}

impl QueryValidationError {
    /// Name of the query parameter this error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MalformedSort(_) | Self::UnknownSortField(_) | Self::UnknownSortDirection(_) => {
                "sortBy"
            }
            Self::InvalidLimit(_) => "limit",
            Self::InvalidPage(_) => "page",
        }
    }
}

impl Display for QueryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedSort(raw) => {
                write!(f, "sort entry `{raw}` must have the form field:asc|desc")
            }
            Self::UnknownSortField(field) => write!(
                f,
                "cannot sort by `{field}`; expected value|createdAt|updatedAt"
            ),
            Self::UnknownSortDirection(direction) => {
                write!(f, "unknown sort direction `{direction}`; expected asc|desc")
            }
            Self::InvalidLimit(limit) => write!(f, "limit must be at least 1, got {limit}"),
            Self::InvalidPage(page) => write!(f, "page must be at least 1, got {page}"),
        }
    }
}

impl Error for QueryValidationError {}

/// Match conditions on `value`. Set conditions are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFilter {
    /// Exact, case-sensitive match.
    pub value: Option<String>,
    /// Case-sensitive substring match.
    pub contains: Option<String>,
}

impl TextFilter {
    pub fn value_equals(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            contains: None,
        }
    }

    pub fn value_contains(fragment: impl Into<String>) -> Self {
        Self {
            value: None,
            contains: Some(fragment.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Value,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "value" => Some(Self::Value),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Ordered list of sort keys. Empty means `createdAt:asc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Parses `field:direction[,field:direction...]`.
    ///
    /// A bare `field` sorts ascending. Blank input yields the default order.
    pub fn parse(raw: &str) -> Result<Self, QueryValidationError> {
        let mut keys = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let (field_raw, direction_raw) = match entry.split_once(':') {
                Some((field, direction)) => (field.trim(), direction.trim()),
                None => (entry, "asc"),
            };
            if field_raw.is_empty() || direction_raw.contains(':') {
                return Err(QueryValidationError::MalformedSort(entry.to_string()));
            }

            let field = SortField::parse(field_raw)
                .ok_or_else(|| QueryValidationError::UnknownSortField(field_raw.to_string()))?;
            let direction = SortDirection::parse(direction_raw).ok_or_else(|| {
                QueryValidationError::UnknownSortDirection(direction_raw.to_string())
            })?;
            keys.push(SortKey { field, direction });
        }
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    fn order_by_sql(&self) -> String {
        let mut clauses = if self.keys.is_empty() {
            vec!["created_at ASC".to_string()]
        } else {
            self.keys
                .iter()
                .map(|key| format!("{} {}", key.field.column(), key.direction.keyword()))
                .collect::<Vec<_>>()
        };
        clauses.push("rowid ASC".to_string());
        format!(" ORDER BY {}", clauses.join(", "))
    }
}

/// Validated pagination options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    limit: u32,
    page: u32,
    sort: SortSpec,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            page: DEFAULT_PAGE,
            sort: SortSpec::default(),
        }
    }
}

impl PageRequest {
    /// Builds a request; `None` falls back to `limit=10`, `page=1`.
    pub fn new(limit: Option<i64>, page: Option<i64>) -> Result<Self, QueryValidationError> {
        let limit = match limit {
            None => DEFAULT_PAGE_LIMIT,
            Some(raw) => positive_u32(raw).ok_or(QueryValidationError::InvalidLimit(raw))?,
        };
        let page = match page {
            None => DEFAULT_PAGE,
            Some(raw) => positive_u32(raw).ok_or(QueryValidationError::InvalidPage(raw))?,
        };
        Ok(Self {
            limit,
            page,
            sort: SortSpec::default(),
        })
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

fn positive_u32(raw: i64) -> Option<u32> {
    u32::try_from(raw).ok().filter(|value| *value >= 1)
}

/// Pagination envelope returned by list queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub results: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
    pub total_results: u64,
}

/// Repository interface for text persistence.
pub trait TextRepository {
    /// Inserts a new row; both timestamps are set to the current time.
    fn create_text(&self, id: TextId, value: &TextValue) -> RepoResult<TextId>;
    fn get_text(&self, id: TextId) -> RepoResult<Option<Text>>;
    fn query_texts(&self, filter: &TextFilter, request: &PageRequest) -> RepoResult<Page<Text>>;
    /// Replaces `value` and bumps `updated_at`; `NotFound` when absent.
    fn update_text_value(&self, id: TextId, value: &TextValue) -> RepoResult<()>;
    /// Removes the row; `NotFound` when absent.
    fn delete_text(&self, id: TextId) -> RepoResult<()>;
}

/// SQLite-backed text repository.
pub struct SqliteTextRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTextRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TextRepository for SqliteTextRepository<'_> {
    fn create_text(&self, id: TextId, value: &TextValue) -> RepoResult<TextId> {
        self.conn.execute(
            &format!(
                "INSERT INTO texts (uuid, value, created_at, updated_at)
                 VALUES (?1, ?2, {NOW_EPOCH_MS_SQL}, {NOW_EPOCH_MS_SQL});"
            ),
            params![id.to_string(), value.as_str()],
        )?;
        Ok(id)
    }

    fn get_text(&self, id: TextId) -> RepoResult<Option<Text>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TEXT_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_text_row(row)?));
        }

        Ok(None)
    }

    fn query_texts(&self, filter: &TextFilter, request: &PageRequest) -> RepoResult<Page<Text>> {
        let mut where_sql = String::from(" WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(value) = filter.value.as_ref() {
            where_sql.push_str(" AND value = ?");
            bind_values.push(Value::Text(value.clone()));
        }
        if let Some(fragment) = filter.contains.as_ref() {
            where_sql.push_str(" AND instr(value, ?) > 0");
            bind_values.push(Value::Text(fragment.clone()));
        }

        let total_results: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM texts{where_sql};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;
        let total_results = u64::try_from(total_results).map_err(|_| {
            RepoError::InvalidData(format!("negative row count {total_results}"))
        })?;

        let mut sql = format!("{TEXT_SELECT_SQL}{where_sql}");
        sql.push_str(&request.sort().order_by_sql());
        sql.push_str(" LIMIT ? OFFSET ?");
        bind_values.push(Value::Integer(i64::from(request.limit())));
        bind_values.push(Value::Integer(
            i64::try_from(request.offset()).unwrap_or(i64::MAX),
        ));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            results.push(parse_text_row(row)?);
        }

        Ok(Page {
            results,
            page: request.page(),
            limit: request.limit(),
            total_pages: total_results.div_ceil(u64::from(request.limit())),
            total_results,
        })
    }

    fn update_text_value(&self, id: TextId, value: &TextValue) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE texts
                 SET
                    value = ?1,
                    updated_at = MAX(created_at, {NOW_EPOCH_MS_SQL})
                 WHERE uuid = ?2;"
            ),
            params![value.as_str(), id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_text(&self, id: TextId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM texts WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_text_row(row: &Row<'_>) -> RepoResult<Text> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in texts.uuid"))
    })?;

    let text = Text {
        id,
        value: row.get("value")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    text.validate()
        .map_err(|err: TextValidationError| {
            RepoError::InvalidData(format!("text {id} failed validation: {err}"))
        })?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::{PageRequest, QueryValidationError, SortDirection, SortField, SortSpec};

    #[test]
    fn sort_spec_parses_multiple_keys() {
        let spec = SortSpec::parse("value:desc, createdAt:asc").expect("valid sort");
        assert_eq!(spec.keys().len(), 2);
        assert_eq!(spec.keys()[0].field, SortField::Value);
        assert_eq!(spec.keys()[0].direction, SortDirection::Desc);
        assert_eq!(spec.keys()[1].field, SortField::CreatedAt);
        assert_eq!(spec.keys()[1].direction, SortDirection::Asc);
    }

    #[test]
    fn sort_spec_bare_field_sorts_ascending() {
        let spec = SortSpec::parse("updatedAt").expect("valid sort");
        assert_eq!(spec.keys()[0].field, SortField::UpdatedAt);
        assert_eq!(spec.keys()[0].direction, SortDirection::Asc);
    }

    #[test]
    fn sort_spec_rejects_unknown_field_and_direction() {
        assert_eq!(
            SortSpec::parse("uuid:asc"),
            Err(QueryValidationError::UnknownSortField("uuid".to_string()))
        );
        assert_eq!(
            SortSpec::parse("value:sideways"),
            Err(QueryValidationError::UnknownSortDirection("sideways".to_string()))
        );
        assert!(matches!(
            SortSpec::parse(":asc"),
            Err(QueryValidationError::MalformedSort(_))
        ));
    }

    #[test]
    fn order_by_always_ends_with_rowid() {
        assert_eq!(
            SortSpec::default().order_by_sql(),
            " ORDER BY created_at ASC, rowid ASC"
        );
        let spec = SortSpec::parse("value:desc").expect("valid sort");
        assert_eq!(spec.order_by_sql(), " ORDER BY value DESC, rowid ASC");
    }

    #[test]
    fn page_request_defaults_and_bounds() {
        let request = PageRequest::new(None, None).expect("defaults");
        assert_eq!(request.limit(), 10);
        assert_eq!(request.page(), 1);
        assert_eq!(request.offset(), 0);

        let request = PageRequest::new(Some(5), Some(3)).expect("valid");
        assert_eq!(request.offset(), 10);

        assert_eq!(
            PageRequest::new(Some(0), None),
            Err(QueryValidationError::InvalidLimit(0))
        );
        assert_eq!(
            PageRequest::new(None, Some(-2)),
            Err(QueryValidationError::InvalidPage(-2))
        );
        assert_eq!(QueryValidationError::InvalidPage(-2).field(), "page");
    }
}
