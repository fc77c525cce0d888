//! End-to-end tests for logtriage live under `tests/`.
