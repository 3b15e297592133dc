//! Pure transformations from route data to what gets drawn. No I/O happens here.

pub mod district;
pub mod geo;
pub mod geometry;
pub mod grouping;
pub mod timetable;
