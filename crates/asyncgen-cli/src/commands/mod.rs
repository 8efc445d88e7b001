pub mod helpers;
pub mod transform;
