//! Discover raw socket privileges.
//!
//! Sending and capturing `ICMP` over a raw socket is a privileged operation on every supported
//! platform.
//!
//! [`Privilege::acquire_privileges`]:
//!
//! - On Linux we check if `CAP_NET_RAW` is in the permitted set and if so raise it to the effective
//!   set
//! - On other Unix platforms this is a no-op
//!
//! [`Privilege::has_privileges`] (obtained via [`Privilege::discover`]):
//!
//! - On Linux we check if `CAP_NET_RAW` is in the effective set
//! - On other Unix platforms we check that the effective user is root
//!
//! [`Privilege::drop_privileges`]:
//!
//! - On Linux we clear the effective set, an already open raw socket remains usable
//! - On other Unix platforms this is a no-op
//!
//! # Examples
//!
//! ```rust
//! # fn main() -> anyhow::Result<()> {
//! # use hoptrace_privilege::Privilege;
//! let privilege = Privilege::acquire_privileges()?;
//! if privilege.has_privileges() {
//!     println!("You have the required privileges for raw sockets");
//! } else {
//!     println!("You do not have the required privileges for raw sockets");
//! }
//! Privilege::drop_privileges()?;
//! # Ok(())
//! # }
//! ```

/// A privilege error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A privilege error.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[cfg(target_os = "linux")]
    #[error("failed to query CAP_NET_RAW: {0}")]
    QueryCapability(caps::errors::CapsError),
    #[cfg(target_os = "linux")]
    #[error("failed to raise CAP_NET_RAW: {0}")]
    RaiseCapability(caps::errors::CapsError),
    #[cfg(target_os = "linux")]
    #[error("failed to clear effective capabilities: {0}")]
    ClearCapabilities(caps::errors::CapsError),
}

/// Whether the process may open raw sockets.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Privilege {
    has_privileges: bool,
}

impl Privilege {
    #[must_use]
    pub const fn new(has_privileges: bool) -> Self {
        Self { has_privileges }
    }

    /// Discover the current privileges without changing them.
    pub fn discover() -> Result<Self> {
        platform::is_privileged().map(Self::new)
    }

    /// Raise privileges, if permitted, and then discover them.
    pub fn acquire_privileges() -> Result<Self> {
        platform::raise()?;
        Self::discover()
    }

    /// Give up any raised privileges.
    pub fn drop_privileges() -> Result<()> {
        platform::clear()
    }

    #[must_use]
    pub const fn has_privileges(&self) -> bool {
        self.has_privileges
    }
}

#[cfg(target_os = "linux")]
mod platform {
    use crate::{Error, Result};
    use caps::{CapSet, Capability};

    pub fn is_privileged() -> Result<bool> {
        caps::has_cap(None, CapSet::Effective, Capability::CAP_NET_RAW)
            .map_err(Error::QueryCapability)
    }

    /// Move `CAP_NET_RAW` from the permitted set to the effective set.
    pub fn raise() -> Result<()> {
        let permitted = caps::has_cap(None, CapSet::Permitted, Capability::CAP_NET_RAW)
            .map_err(Error::QueryCapability)?;
        if permitted {
            caps::raise(None, CapSet::Effective, Capability::CAP_NET_RAW)
                .map_err(Error::RaiseCapability)?;
        }
        Ok(())
    }

    pub fn clear() -> Result<()> {
        caps::clear(None, CapSet::Effective).map_err(Error::ClearCapabilities)
    }
}

#[cfg(all(unix, not(target_os = "linux")))]
#[expect(clippy::unnecessary_wraps)]
mod platform {
    use crate::Result;
    use nix::unistd::Uid;

    pub fn is_privileged() -> Result<bool> {
        Ok(Uid::effective().is_root())
    }

    pub fn raise() -> Result<()> {
        Ok(())
    }

    pub fn clear() -> Result<()> {
        Ok(())
    }
}
