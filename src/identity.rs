//! Current user lookup
//!
//! Run-as-user mode needs the invoking user's numeric id. A uid with no
//! password database entry is an error.

use crate::error::{ComposeError, Result};
use std::ffi::CStr;
use std::mem::MaybeUninit;

/// Identity of the invoking user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// Numeric user id
    pub uid: u32,
    /// Login name
    pub name: String,
}

impl CurrentUser {
    /// Compose `user:` value, overridable through `$UID` at deploy time
    pub fn compose_user(&self) -> String {
        format!("${{UID:-{}}}", self.uid)
    }
}

/// Resolve the user running this process
pub fn current_user() -> Result<CurrentUser> {
    let uid = unsafe { libc::getuid() };
    lookup_uid(uid)
}

/// Initial getpwuid_r buffer size
const PWD_BUF_SIZE: usize = 1024;
/// Largest buffer tried before giving up on ERANGE
const PWD_BUF_MAX: usize = 1024 * 1024;

/// Resolve a user id through getpwuid_r
pub fn lookup_uid(uid: u32) -> Result<CurrentUser> {
    lookup_uid_with_buffer(uid, PWD_BUF_SIZE)
}

/// Resolve a user id, doubling the string buffer on ERANGE
fn lookup_uid_with_buffer(uid: u32, initial: usize) -> Result<CurrentUser> {
    let mut buf = vec![0 as libc::c_char; initial.max(1)];

    loop {
        let mut pwd = MaybeUninit::<libc::passwd>::uninit();
        let mut result: *mut libc::passwd = std::ptr::null_mut();

        let rc = unsafe {
            libc::getpwuid_r(
                uid,
                pwd.as_mut_ptr(),
                buf.as_mut_ptr(),
                buf.len(),
                &mut result,
            )
        };

        if rc == libc::ERANGE && buf.len() < PWD_BUF_MAX {
            let len = buf.len() * 2;
            buf.resize(len, 0);
            continue;
        }
        if rc != 0 {
            return Err(ComposeError::Identity(
                std::io::Error::from_raw_os_error(rc).to_string(),
            ));
        }
        if result.is_null() {
            return Err(ComposeError::Identity(format!("unknown userid {}", uid)));
        }

        // result points at pwd and its strings live in buf
        let pwd = unsafe { pwd.assume_init() };
        let name = unsafe { CStr::from_ptr(pwd.pw_name) }
            .to_string_lossy()
            .into_owned();

        return Ok(CurrentUser { uid: pwd.pw_uid, name });
    }
}
