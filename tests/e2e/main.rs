// End-to-end tests for the narration HTTP API
//
// Each test gets its own server on an ephemeral port, backed by in-memory
// synthesis and upload fakes and a private scratch directory, so tests run
// in parallel without sharing state.

mod helpers;
mod test_health;
mod test_narrations;
mod test_upload;
