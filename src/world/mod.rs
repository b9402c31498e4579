// ============================================
// World Module - Реестр миров и события хоста
// ============================================

mod lifecycle;
mod registry;

pub use lifecycle::{DestroyCause, WorldLifecycle};
pub use registry::WorldRegistry;
