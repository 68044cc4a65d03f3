pub mod connector;
pub mod sheets;

pub use connector::{AuthError, EnvIdentity, IdentitySource, TokenCache};
pub use sheets::{GoogleSheets, SheetStore, SheetsClient};
