pub mod audit;
pub mod context;
pub mod error;
pub mod ids;
pub mod model;
pub mod timestamp;
pub mod view;

pub use audit::*;
pub use context::ExecContext;
pub use error::{ErrorKind, IdError, RecordError, StoreError, StoreResult};
pub use ids::*;
pub use model::*;
pub use timestamp::Timestamp;
pub use view::*;
