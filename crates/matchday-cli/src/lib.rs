// Library root: command parsing, admin session, orchestration and text views
// for the `matchday` binary. Exposed so integration tests can drive the app.

pub mod app;
pub mod command;
pub mod session;
pub mod view;
