//! Record loader trait for tabular input.
//!
//! Abstracts reading `id`/`text` rows so the manager can be tested without
//! touching the filesystem. The CSV implementation lives in ragit-infra.

use std::path::Path;

use ragit_types::error::LoadError;
use ragit_types::record::Record;

/// Column that holds record IDs.
pub const ID_COLUMN: &str = "id";

/// Column that holds record text.
pub const TEXT_COLUMN: &str = "text";

/// Trait for reading records from a tabular source.
///
/// Implementations must fail with `LoadError::MissingColumns` when the
/// source lacks an `id` or `text` column. Other columns are ignored.
pub trait RecordLoader: Send + Sync {
    /// Read every row of the source, in order.
    fn load(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<Vec<Record>, LoadError>> + Send;
}
