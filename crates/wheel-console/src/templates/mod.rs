pub mod admin;
pub mod fragments;
pub mod layouts;
