//! Template engine: placeholder scanning, key resolution and rendering

pub mod catalog;
pub mod render;
pub mod resolver;
pub mod scanner;
