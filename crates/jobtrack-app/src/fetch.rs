// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState<T> {
    Idle,
    Loading {
        request: RequestId,
    },
    Failed(FetchError),
    Ready(T),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Hands out request ids. Only the most recently issued id is accepted, so a
/// slow response can never overwrite a newer one.
#[derive(Debug, Clone, Default)]
pub struct FetchTracker {
    issued: u64,
}

impl FetchTracker {
    pub fn begin(&mut self) -> RequestId {
        self.issued += 1;
        RequestId(self.issued)
    }

    pub fn latest(&self) -> Option<RequestId> {
        (self.issued > 0).then_some(RequestId(self.issued))
    }

    pub fn is_latest(&self, request: RequestId) -> bool {
        self.latest() == Some(request)
    }

    /// Moves `state` out of `Loading` when `request` is current. Returns
    /// `false` and leaves `state` alone for a stale completion.
    pub fn complete<T>(
        &self,
        state: &mut FetchState<T>,
        request: RequestId,
        result: Result<T, FetchError>,
    ) -> bool {
        if !self.is_latest(request) {
            return false;
        }
        *state = match result {
            Ok(value) => FetchState::Ready(value),
            Err(error) => FetchState::Failed(error),
        };
        true
    }
}
