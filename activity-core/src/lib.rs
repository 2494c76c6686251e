pub mod clock;
pub mod matchmaking;
pub mod origin;
pub mod session;
pub mod validation;

pub use clock::{Clock, SystemClock};
pub use matchmaking::{AutoAction, Throttle, plan_auto_action};
pub use origin::{HostContext, resolve_origins};
pub use session::SessionTracker;
