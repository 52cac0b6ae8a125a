pub mod signing;
pub mod thumbnails;
