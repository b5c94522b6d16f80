//! Prelude module - commonly used test helpers.
//!
//! Use `use morais_test::prelude::*;` to import all essential helpers.

pub use crate::{
    RecordedCall, RecordingListener, failing_async_callback, failing_callback, init_test_logging,
    noop_callback, panicking_callback, payload, payloads, test_config_file,
};
