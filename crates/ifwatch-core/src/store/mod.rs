// ── Interface store ──
//
// Last-known interface list for the selected device. All state lives in a
// single `watch` cell so selection, list and staleness change together.

mod interface_store;

pub use interface_store::{InterfaceStore, LoadOutcome, StoreState};
