pub mod capture;
pub mod codec;
pub mod dispatch;
pub mod router;
pub mod sync;

pub use capture::capture_identifier;
pub use dispatch::{NotificationPayload, WebhookNotifier};
pub use router::{classify_url, EventRouter, IdentifierSource};
pub use sync::{CookieSource, NotificationSink, SyncEngine, SyncOutcome};
