use super::response::ReturnedData;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::io;

/// Extras key carrying the transaction type of a launch.
pub const EXTRA_REQUEST_TYPE: &str = "REQUEST_TYPE";
/// Extras key carrying the serialized sale payload.
pub const EXTRA_DATA: &str = "DATA";

/// Identifies a launch so its return event can be claimed.
///
/// Host platforms only route the low 16 bits of a request code back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationTag(pub u16);

impl fmt::Display for CorrelationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Routing flags attached to a launch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaunchFlags(pub u32);

impl LaunchFlags {
    pub const NONE: Self = Self(0);
}

/// A resolved, launchable external application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTarget {
    pub package: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchResolution {
    Launchable(LaunchTarget),
    NotFound,
}

/// An inter-process launch request.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRequest {
    pub target: LaunchTarget,
    pub extras: BTreeMap<String, String>,
    pub flags: LaunchFlags,
    pub correlation_tag: CorrelationTag,
}

impl LaunchRequest {
    pub fn new(target: LaunchTarget, correlation_tag: CorrelationTag) -> Self {
        Self {
            target,
            extras: BTreeMap::new(),
            flags: LaunchFlags::NONE,
            correlation_tag,
        }
    }

    pub fn with_extra(mut self, key: &str, value: impl Into<String>) -> Self {
        self.extras.insert(key.to_string(), value.into());
        self
    }

    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }
}

/// The event a host delivers when a launched application returns control.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityResult {
    pub request_code: CorrelationTag,
    pub result_code: i32,
    pub data: Option<ReturnedData>,
}

impl ActivityResult {
    pub const RESULT_OK: i32 = -1;
    pub const RESULT_CANCELED: i32 = 0;
}

/// The foreground host context used to find and start external applications.
#[async_trait]
pub trait HostContext: Send + Sync {
    async fn resolve(&self, package: &str) -> LaunchResolution;
    async fn start_for_result(&self, request: LaunchRequest) -> io::Result<()>;
}
