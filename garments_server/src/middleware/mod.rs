mod guard;

pub use guard::{GuardMiddlewareFactory, GuardMiddlewareService};
