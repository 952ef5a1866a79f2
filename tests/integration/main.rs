//! Integration tests for Plugboard.


mod connection_test;
mod hook_test;
mod proxy_test;
mod samples_test;
