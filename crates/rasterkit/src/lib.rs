#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use rasterkit_image as image;

#[doc(inline)]
pub use rasterkit_imgproc as imgproc;

#[doc(inline)]
pub use rasterkit_io as io;

#[doc(inline)]
pub use rasterkit_linalg as linalg;
