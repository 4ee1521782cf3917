use anyhow::{anyhow, Result};
use nix::unistd::{Gid, Uid, User};

use crate::services::Environment;

/// Reads the invoking operator's identity from the host account database.
pub struct HostEnvironment;

impl Environment for HostEnvironment {
    fn username(&self) -> Result<String> {
        let uid = Uid::current();
        let user = User::from_uid(uid)?
            .ok_or_else(|| anyhow!("no account database entry for uid {}", uid))?;

        Ok(user.name)
    }

    fn uid(&self) -> u32 {
        Uid::current().as_raw()
    }

    fn gid(&self) -> u32 {
        Gid::current().as_raw()
    }
}
