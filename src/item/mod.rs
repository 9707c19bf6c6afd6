/// This module provides the restartable JSON document writer implementation.
pub mod json;
