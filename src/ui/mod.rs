//! UI module - shared widgets used by the views

pub mod components;
