mod column;
mod connection;
mod database;
mod dialect;
mod driver;
mod error;
mod from_value;
mod pool;
mod record;
mod session;
mod statement;
mod transaction;
mod util;
mod value;

pub use ::anyhow::Context;
pub use column::*;
pub use connection::*;
pub use database::*;
pub use dialect::*;
pub use driver::*;
pub use error::*;
pub use from_value::*;
pub use pool::*;
pub use record::*;
pub use session::*;
pub use statement::*;
pub use transaction::*;
pub use util::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
