//! Subcommand handlers.
//!
//! Each file in this module corresponds to one user-facing command:
//!
//! | File        | Invocation                              | Description                     |
//! |-------------|-----------------------------------------|---------------------------------|
//! | `backup.rs` | `linux-toolset backup`                  | Back up, prune, list and copy   |
//! | `custom.rs` | `linux-toolset custom-command <name>`   | Run a named command procedure   |
//! | `init.rs`   | `linux-toolset init`                    | Scaffold a starter config       |

pub mod backup;
pub mod custom;
pub mod init;
