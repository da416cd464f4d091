//! Library components of the `react-tox` command-line shell.

pub mod input;
pub mod logging;
pub mod render;
