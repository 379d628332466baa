pub mod contours;
pub mod quality;
pub mod simplify;
