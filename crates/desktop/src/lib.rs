//! `coursestock-desktop`
//!
//! **Responsibility:** host the single-user desktop session.
//!
//! The visual form owns no business logic. It holds an [`AppState`] and
//! calls the command layer in [`commands`], which parses raw field text,
//! invokes the inventory store, and hands back either a confirmation string
//! or a `kind: message` failure to display. The form re-renders the stock
//! list after any operation that can change quantity, and the movement log
//! after any movement mutation.

pub mod commands;

pub use commands::AppState;
