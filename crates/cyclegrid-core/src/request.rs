#![forbid(unsafe_code)]

//! Request tickets for stale-response rejection.
//!
//! Every dataset request is stamped with a monotonically increasing epoch.
//! Only the response carrying the ticket of the most recent unsettled
//! request may be applied; anything else arrived late and is dropped.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coords::AddressingMode;

/// The parameters a dataset is keyed by upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub modulus: i64,
    pub mode: AddressingMode,
}

impl RequestKey {
    #[inline]
    pub const fn new(modulus: i64, mode: AddressingMode) -> Self {
        Self { modulus, mode }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "base={} ({})", self.modulus, self.mode)
    }
}

/// A request key plus the epoch it was issued at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    pub epoch: u64,
    pub key: RequestKey,
}

/// Issues tickets and decides which completions are still wanted.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    epoch: u64,
    pending: Option<RequestTicket>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for `key`, superseding any outstanding request.
    pub fn issue(&mut self, key: RequestKey) -> RequestTicket {
        self.epoch += 1;
        let ticket = RequestTicket {
            epoch: self.epoch,
            key,
        };
        self.pending = Some(ticket);
        ticket
    }

    /// Whether `ticket` is the outstanding request.
    #[inline]
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.pending.as_ref() == Some(ticket)
    }

    /// Settle `ticket`. Returns `false` (and changes nothing) when stale.
    pub fn settle(&mut self, ticket: &RequestTicket) -> bool {
        if self.is_current(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Epoch of the most recently issued ticket.
    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}
