pub mod analysis;
pub mod entry;
pub mod history;
pub mod session;
pub mod settings;

pub use analysis::*;
pub use entry::*;
pub use history::*;
pub use session::*;
pub use settings::*;
