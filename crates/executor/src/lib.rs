pub mod azure_cli;
pub mod secure_files;
pub mod tool_runner;

pub use azure_cli::{AccountSet, AzureCli, AzureCommand, LoggedIn, Login, SetAccount, Subscription};
pub use secure_files::{SecureFileDownloader, SecureFileSettings};
pub use tool_runner::{find_in_path, ProcessToolchain, ToolRunner};
