pub use assert_matches::assert_matches;

pub use crate::error::{TestError, TestResult};
pub use crate::storage::{FailOn, InMemoryStorage, StorageCall};
pub use crate::trees::{DeepTree, ShortcutTree, StorefrontTree};
