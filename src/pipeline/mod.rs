pub mod check;
pub mod extraction;
