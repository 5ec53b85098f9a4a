//! REST API implementation
//!
//! | Method | Path | Body |
//! |---|---|---|
//! | `GET` | `/health` | |
//! | `GET` | `/v1/catalog?scope=global\|event:<name>` | |
//! | `POST` | `/v1/segments/validate` | `{ "groups": [...] }` |
//! | `POST` | `/v1/segments/evaluate` | `{ "groups": [...], "customers": [...] }` |
//! | `POST` | `/v1/triggers/evaluate` | `{ "triggers": [...], "event": {...} }` |

mod extractors;
mod handlers;
mod router;
mod types;

pub use router::create_router;
pub use types::*;
