pub mod actions;
pub mod codec;
pub mod proposal;
pub mod reducer;
pub mod settings;
pub mod state;

pub use actions::*;
pub use codec::*;
pub use proposal::*;
pub use reducer::*;
pub use settings::*;
pub use state::*;
