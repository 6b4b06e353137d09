//! Reusable page components

pub mod nav;
pub mod summary_bar;
