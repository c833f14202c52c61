//! Group membership checks against the system user/group databases.
//!
//! Used for permission decisions, so "could not tell" is always reported
//! as an error and never folded into "not a member".

use libc::{c_char, c_int};
use once_cell::sync::OnceCell;
use std::ffi::CStr;
use std::mem::MaybeUninit;
use std::ptr;
use thiserror::Error;
use tracing::{debug, warn};

const FALLBACK_PASSWD_BUFFER: usize = 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MembershipError {
    #[error("could not determine group buffer size")]
    BufferSize,
    #[error("could not allocate group lookup buffer")]
    OutOfMemory,
    #[error("group lookup failed (errno {0})")]
    GroupLookup(c_int),
    #[error("group not found")]
    GroupNotFound,
    #[error("user lookup failed (errno {0})")]
    UserLookup(c_int),
}

impl MembershipError {
    /// Negative errno for the callback layer.
    pub fn to_error_code(&self) -> c_int {
        match self {
            MembershipError::BufferSize => -libc::ERANGE,
            MembershipError::OutOfMemory => -libc::ENOMEM,
            MembershipError::GroupLookup(errno) => -errno,
            MembershipError::GroupNotFound => -libc::EINVAL,
            MembershipError::UserLookup(errno) => -errno,
        }
    }
}

/// Process-wide `_SC_GETGR_R_SIZE_MAX`, computed once.
fn group_buffer_len() -> Result<usize, MembershipError> {
    static GROUP_BUFFER_LEN: OnceCell<usize> = OnceCell::new();
    GROUP_BUFFER_LEN
        .get_or_try_init(|| {
            let len = unsafe { libc::sysconf(libc::_SC_GETGR_R_SIZE_MAX) };
            if len <= 0 {
                warn!("could not get max group entry length");
                return Err(MembershipError::BufferSize);
            }
            Ok(len as usize)
        })
        .copied()
}

fn lookup_buffer(len: usize) -> Result<Vec<c_char>, MembershipError> {
    let mut buf: Vec<c_char> = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| {
        warn!("failed to allocate {} bytes for group lookup", len);
        MembershipError::OutOfMemory
    })?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Login name for `uid`.
///
/// `Ok(None)` means the passwd database has no entry for `uid`; failing to
/// consult the database at all is an error.
pub fn username(uid: u32) -> Result<Option<String>, MembershipError> {
    let len = match unsafe { libc::sysconf(libc::_SC_GETPW_R_SIZE_MAX) } {
        n if n > 0 => n as usize,
        _ => FALLBACK_PASSWD_BUFFER,
    };
    let mut buf = lookup_buffer(len)?;
    let mut pwd = MaybeUninit::<libc::passwd>::uninit();
    let mut result: *mut libc::passwd = ptr::null_mut();

    let rc = unsafe {
        libc::getpwuid_r(
            uid as libc::uid_t,
            pwd.as_mut_ptr(),
            buf.as_mut_ptr(),
            buf.len(),
            &mut result,
        )
    };
    if is_not_found(rc) || (rc == 0 && result.is_null()) {
        debug!("no passwd entry for uid {}", uid);
        return Ok(None);
    }
    if rc != 0 {
        warn!("could not get username for uid {} (errno={})", uid, rc);
        return Err(MembershipError::UserLookup(rc));
    }

    // `result` points into `pwd`, whose strings live in `buf`.
    let name = unsafe { (*result).pw_name };
    if name.is_null() {
        return Ok(None);
    }
    let name = unsafe { CStr::from_ptr(name) };
    Ok(Some(name.to_string_lossy().into_owned()))
}

/// Codes `getpwuid_r` may use for "no such user" instead of a null result.
fn is_not_found(rc: c_int) -> bool {
    matches!(rc, libc::ENOENT | libc::ESRCH | libc::EBADF | libc::EPERM)
}

/// Whether the user `uid` is listed as a member of group `gid`.
///
/// Only the group's explicit member list is consulted, not the user's
/// primary group. A uid with no passwd entry is never a member.
pub fn is_member(uid: u32, gid: u32) -> Result<bool, MembershipError> {
    let len = group_buffer_len()?;
    let mut buf = lookup_buffer(len)?;
    let mut grp = MaybeUninit::<libc::group>::uninit();
    let mut result: *mut libc::group = ptr::null_mut();

    let rc = unsafe {
        libc::getgrgid_r(
            gid as libc::gid_t,
            grp.as_mut_ptr(),
            buf.as_mut_ptr(),
            buf.len(),
            &mut result,
        )
    };
    if rc != 0 {
        debug!("could not get group information for gid {} (errno={})", gid, rc);
        return Err(MembershipError::GroupLookup(rc));
    }
    if result.is_null() {
        return Err(MembershipError::GroupNotFound);
    }

    let Some(user) = username(uid)? else {
        return Ok(false);
    };

    let mut member = unsafe { (*result).gr_mem };
    if member.is_null() {
        return Ok(false);
    }
    loop {
        let name = unsafe { *member };
        if name.is_null() {
            return Ok(false);
        }
        if unsafe { CStr::from_ptr(name) }.to_bytes() == user.as_bytes() {
            return Ok(true);
        }
        member = unsafe { member.add(1) };
    }
}
