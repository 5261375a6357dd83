//! # baglens-session
//!
//! Handle-addressed reading sessions over logs.
//!
//! A [`Session`] owns one open log and a forward-only cursor over the
//! entries on a chosen set of channels. The [`Multiplexer`] keeps sessions
//! behind integer handles, and [`dispatch`] drives it with the flat
//! argument lists a host environment passes in.
//!
//! ## Example
//!
//! ```rust,no_run
//! use baglens_session::{dispatch, HostArg, Multiplexer, Reply};
//!
//! let mut mux = Multiplexer::new();
//! let reply = dispatch(
//!     &mut mux,
//!     &[0u64.into(), "construct".into(), "~/logs/run.log".into()],
//! )?;
//! let Reply::Handle(handle) = reply else { unreachable!() };
//!
//! dispatch(
//!     &mut mux,
//!     &[handle.into(), "reset_view".into(), HostArg::from(&["/odom"][..])],
//! )?;
//! while dispatch(&mut mux, &[handle.into(), "has_next".into()])? == Reply::Bool(true) {
//!     let message = dispatch(&mut mux, &[handle.into(), "read_one".into(), true.into()])?;
//!     println!("{:?}", message);
//! }
//! # Ok::<(), baglens_session::SessionError>(())
//! ```

mod error;
mod multiplexer;
mod protocol;
mod session;

pub use error::{Result, SessionError};
pub use multiplexer::{Multiplexer, MultiplexerConfig};
pub use protocol::{dispatch, HostArg, Reply};
pub use session::{Message, Metadata, Session};
