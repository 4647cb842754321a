pub mod import;
pub mod init;
pub mod show;

pub use import::{import, ImportArgs};
pub use init::{init, InitArgs};
pub use show::{show, ShowArgs};
