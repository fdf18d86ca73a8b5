/// Unit tests against the public library API
mod basic_tests;
mod streak_properties;
