pub mod route;
pub mod station;

pub use route::*;
pub use station::*;
