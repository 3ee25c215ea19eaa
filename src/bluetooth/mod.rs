pub mod bytes;
pub mod characteristic;
pub mod connection;
pub mod parser;
pub mod scanner;

pub use characteristic::{decode, Characteristic};
pub use connection::BoardConnection;
pub use scanner::{scan_for_boards, DiscoveredBoard};
