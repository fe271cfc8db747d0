//! NTAG 424 DNA command definitions
//!
//! One module per command. Each type knows its APDU header and the
//! command-header/data split the secure-messaging wrapper frames around;
//! argument validation happens in the application layer before a command
//! is built.

pub mod authenticate;
pub mod change_key;
pub mod file_settings;
pub mod get_card_uid;
pub mod get_key_version;
pub mod read_data;
pub mod select;
pub mod write_data;

// Re-exports for convenience
pub use change_key::ChangeKeyCommand;
pub use file_settings::{ChangeFileSettingsCommand, GetFileSettingsCommand};
pub use get_card_uid::GetCardUidCommand;
pub use get_key_version::GetKeyVersionCommand;
pub use read_data::ReadDataCommand;
pub use select::SelectFileCommand;
pub use write_data::WriteDataCommand;
