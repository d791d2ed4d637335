//! Internal test suite.
