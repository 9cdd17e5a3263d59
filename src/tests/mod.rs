//! tests/mod.rs
//! Pruebas unitarias y de integración del binario.

mod policy_tests;
mod support;
