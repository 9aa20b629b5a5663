pub mod code;
pub mod identity;
pub mod symbology;

pub use code::*;
pub use identity::*;
pub use symbology::*;
