//! Domain model for task synchronization.
//!
//! The domain holds the task record shape, its status and priority enums,
//! the payloads sent to the remote authority, and the pure transition and
//! grouping rules. Nothing here performs I/O.

mod error;
mod ids;
mod payload;
mod record;
mod stats;
mod status;
mod transition;

pub use error::{ParseTaskPriorityError, ParseTaskStatusError, TaskDomainError};
pub use ids::{TaskId, TaskTitle};
pub use payload::{NewTask, TaskFilter, TaskPatch};
pub use record::{TaskRecord, TaskRecordData};
pub use stats::TaskStats;
pub use status::{TaskPriority, TaskStatus, is_valid_status};
pub use transition::{TaskBuckets, action_label, bucket_of, next_status};
