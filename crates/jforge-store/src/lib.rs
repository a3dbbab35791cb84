pub mod ledger;
pub mod marker;
pub mod record;
pub mod table;

pub use ledger::{GlobalLedger, LocalEntry, LocalLedger, StoreError};
pub use marker::{BuiltMarkers, ToolchainDescriptor};
pub use record::{BuildRecord, BuildStatus, NOT_APPLICABLE};
pub use table::TableError;
