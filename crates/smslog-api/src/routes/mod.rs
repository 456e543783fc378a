//! Route modules. Each exposes a `router()` merged by [`crate::app`].

pub mod logs;
pub mod sms;
