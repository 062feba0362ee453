pub mod layout;
pub mod login;

pub use layout::Layout;
pub use login::Login;
