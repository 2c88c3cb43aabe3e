pub mod blockchains;
pub mod tokens;
pub mod trade_type;

pub use blockchains::*;
pub use tokens::*;
pub use trade_type::*;
