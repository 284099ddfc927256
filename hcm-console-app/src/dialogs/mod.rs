//! 对话框

mod attach_disk;

pub use attach_disk::{disk_filter, AttachDiskDialog, CachingType, HostDetail, DISK_COLLECTION};
