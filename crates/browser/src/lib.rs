pub mod capabilities;
pub mod cdp;
pub mod targets;
pub mod watcher;

pub use capabilities::CdpCapabilities;
pub use cdp::CdpClient;
pub use targets::{DevtoolsEndpoint, TargetInfo};
pub use watcher::TabWatcher;
