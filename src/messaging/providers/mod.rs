pub mod line;
pub mod null;
