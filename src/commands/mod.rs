pub mod info;
pub mod slice;
