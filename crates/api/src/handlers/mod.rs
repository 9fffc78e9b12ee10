pub mod combination;
pub mod deployment;
pub mod fragment;
pub mod variant;
