//! ONNX model fixtures for tests.

pub mod onnx;
