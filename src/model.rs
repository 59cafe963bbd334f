pub mod currency;
pub mod item;
pub mod money;
pub mod render;
pub mod security;
pub mod transaction;

pub use self::currency::*;
pub use self::item::*;
pub use self::money::*;
pub use self::security::*;
pub use self::transaction::*;
