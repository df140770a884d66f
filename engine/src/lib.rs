//! # Sortable Engine
//!
//! Maintains a dense, contiguous sort index over records that may be
//! partitioned into independent groups. This is the logic behind drag-and-drop
//! reordering, playlists, queues and priority lists kept in a database.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine talks to persistence only through [`RecordStore`]
//! - **Atomic**: every operation runs in one store transaction
//! - **Typed**: records expose their index and group through [`Sortable`]
//!
//! ## Core Concepts
//!
//! ### Contiguity
//!
//! Within a group of N records the indices are exactly
//! `start, start + 1, ..., start + N - 1`. Every operation preserves this:
//! - creating appends at `max + 1`
//! - deleting decrements every later sibling
//! - moving a record shifts the siblings between its old and new position
//!
//! ### Groups
//!
//! [`SortConfig::group_key_field`] turns on grouping. Records are then
//! ordered independently per [`Sortable::group_key`]; without it every record
//! of the type shares one ordering.
//!
//! ### Hooks
//!
//! Hosts with their own persistence call [`OrderingEngine::before_create`],
//! [`OrderingEngine::before_update`] and [`OrderingEngine::after_delete`]
//! around their writes. The convenience operations (`create`, `move_up`,
//! `swap`, ...) do the same against any [`RecordStore`].
//!
//! ## Quick Start
//!
//! ```rust
//! use sortable_engine::{Item, MemoryStore, OrderingEngine, SortConfig};
//! use serde_json::json;
//!
//! let engine = OrderingEngine::new(SortConfig::new().grouped_by("playlist")).unwrap();
//! let mut store = MemoryStore::new();
//!
//! for id in ["intro", "verse", "outro"] {
//!     let item = Item::new(id, json!({"title": id})).in_group("demo");
//!     engine.create(&mut store, item).unwrap();
//! }
//!
//! engine.to_top(&mut store, &"outro".to_string()).unwrap();
//!
//! let order: Vec<_> = engine
//!     .sorted_ascending(&store, Some(&"demo".to_string()))
//!     .unwrap()
//!     .into_iter()
//!     .map(|item| item.id)
//!     .collect();
//! assert_eq!(order, ["outro", "intro", "verse"]);
//! ```

pub mod config;
pub mod contiguity;
pub mod engine;
pub mod error;
pub mod operation;
pub mod record;
pub mod snapshot;
pub mod store;

// Re-export main types at crate root
pub use config::SortConfig;
pub use engine::{Direction, OrderingEngine, Resort};
pub use error::Error;
pub use operation::{ApplyResult, Operation, Placement};
pub use record::{Item, Sortable};
pub use snapshot::{StoreSnapshot, SNAPSHOT_FORMAT_VERSION};
pub use store::{GroupScope, IndexFilter, MemoryStore, RecordStore};

/// Type aliases for clarity
pub type RecordId = String;
pub type SortIndex = i64;
