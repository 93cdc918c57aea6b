//! Edge Interception Cache
//!
//! Answers outgoing GET requests at the network boundary from three named
//! stores, picking a strategy per request class:
//!
//! | Class        | Strategy               | Store   |
//! |--------------|------------------------|---------|
//! | static asset | cache-first            | static  |
//! | image        | cache-first            | static  |
//! | api          | network-first          | api     |
//! | page         | stale-while-revalidate | dynamic |

mod network;
mod request;
mod storage;
mod strategy;
mod worker;

pub use network::{HttpNetwork, Network};
pub use request::{EdgeRequest, EdgeResponse, RequestClass, StoreRole, Strategy};
pub use storage::{MemoryStorage, StoreBackend, StoreNames};
pub use worker::{CleanupReport, EdgeCache, InstallReport, LifecycleState};
