mod messages;
pub mod state;
mod update;

pub use state::App;
pub use update::settle;
