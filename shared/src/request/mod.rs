mod error;
mod outcome;
mod request_table;
mod response;

pub use error::RequestError;
pub use outcome::Outcome;
pub use request_table::RequestTable;
pub use response::{ResponseEnvelope, ResponseSlot};
