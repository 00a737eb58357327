//! Test Helper Utilities
//!
//! Shared fixtures for aimg-index integration tests

#![allow(dead_code)]

pub mod image_generator;

pub use image_generator::{generate_test_library, write_png, TestImage};
