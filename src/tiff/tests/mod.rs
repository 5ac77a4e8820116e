//! Unit tests for TIFF parsing, layout resolution and decoding


mod handle_tests;
