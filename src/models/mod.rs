pub mod appointment;
pub mod enums;
pub mod filters;
pub mod health_sample;
pub mod lab;
pub mod patient;
pub mod reading;

pub use appointment::*;
pub use enums::*;
pub use filters::*;
pub use health_sample::*;
pub use lab::*;
pub use patient::*;
pub use reading::*;
