//! Integration tests for BLP parsing, encoding and the session API

mod external_tests;
mod format_tests;
mod jpeg_tests;
