pub(crate) mod color;
pub(crate) mod image;
pub(crate) mod painter;
