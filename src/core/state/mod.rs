//! Persisted run state: the export watermark and the single-instance lock

pub mod lock;
pub mod watermark;

pub use lock::PidLock;
pub use watermark::WatermarkStore;
