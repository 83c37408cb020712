pub mod content;
pub mod cursor;
pub mod ranking;
pub mod trending;

mod error;

pub use content::{ContentKind, ContentRef, ObjectId};
pub use cursor::Cursor;
pub use error::{Error, Result};
pub use ranking::{Page, Ranked};
pub use trending::{Engagement, TrendingFormula};
