//! Buffer primitives shared by the lento crates: an owned multi-channel
//! sample matrix, the planar block traits, and the overlap-add window.

mod error;
pub use error::{Error, Result};

mod frames;
pub use frames::{Frames, Planar, PlanarMut};

mod window;
pub use window::OlaWindow;
