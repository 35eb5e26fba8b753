use std::collections::HashMap;

use log::warn;

use crate::{
    request::{error::RequestError, response::ResponseSlot},
    ResponseEnvelope, ResponseId, Tick,
};

const CAPACITY: usize = ResponseId::MAX as usize + 1;

struct PendingRequest<N> {
    node: N,
    slot: ResponseSlot,
    sent_at: Tick,
}

/// Correlates outgoing requests on one session with the responses that come
/// back. Ids are handed out in increasing order, wrapping around and skipping
/// ids that are still pending.
pub struct RequestTable<N: Copy + Eq> {
    next_id: ResponseId,
    pending: HashMap<ResponseId, PendingRequest<N>>,
}

impl<N: Copy + Eq> Default for RequestTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Copy + Eq> RequestTable<N> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: HashMap::new(),
        }
    }

    /// Records a request sent to `node`, returning the id to put on the wire
    pub fn register(
        &mut self,
        node: N,
        slot: ResponseSlot,
        now: Tick,
    ) -> Result<ResponseId, RequestError> {
        if self.pending.len() >= CAPACITY {
            return Err(RequestError::TableExhausted { capacity: CAPACITY });
        }
        while self.pending.contains_key(&self.next_id) {
            self.next_id = self.next_id.wrapping_add(1);
        }
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.insert(
            id,
            PendingRequest {
                node,
                slot,
                sent_at: now,
            },
        );
        Ok(id)
    }

    /// Hands a response to whoever is waiting on `id`
    pub fn resolve(
        &mut self,
        id: ResponseId,
        response: ResponseEnvelope,
    ) -> Result<(), RequestError> {
        let request = self
            .pending
            .remove(&id)
            .ok_or(RequestError::UnknownResponseId { id })?;
        if !request.slot.set(Ok(response)) {
            warn!("Response id {} resolved a request that already had a result", id);
        }
        Ok(())
    }

    /// Like `resolve`, but only accepts the response from the node the
    /// request was sent to. A mismatched response leaves the request pending.
    pub fn resolve_from(
        &mut self,
        node: N,
        id: ResponseId,
        response: ResponseEnvelope,
    ) -> Result<(), RequestError> {
        match self.pending.get(&id) {
            None => Err(RequestError::UnknownResponseId { id }),
            Some(request) if request.node != node => {
                Err(RequestError::MisroutedResponse { id })
            }
            Some(_) => self.resolve(id, response),
        }
    }

    /// Fails a single pending request, returning false if it was not pending
    pub fn fail(&mut self, id: ResponseId, error: RequestError) -> bool {
        match self.pending.remove(&id) {
            Some(request) => {
                request.slot.set(Err(error));
                true
            }
            None => false,
        }
    }

    /// Fails every request pending on `node`, returning how many failed
    pub fn fail_node(&mut self, node: N, error: RequestError) -> usize {
        self.fail_where(|request| request.node == node, error)
    }

    pub fn fail_all(&mut self, error: RequestError) -> usize {
        self.fail_where(|_| true, error)
    }

    /// Fails every request that has waited `timeout` ticks or longer
    pub fn expire(&mut self, now: Tick, timeout: Tick) -> usize {
        self.fail_where(
            |request| now.saturating_sub(request.sent_at) >= timeout,
            RequestError::TimedOut { ticks: timeout },
        )
    }

    pub fn contains(&self, id: ResponseId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn fail_where<F: Fn(&PendingRequest<N>) -> bool>(
        &mut self,
        predicate: F,
        error: RequestError,
    ) -> usize {
        let failed: Vec<ResponseId> = self
            .pending
            .iter()
            .filter(|(_, request)| predicate(request))
            .map(|(id, _)| *id)
            .collect();
        for id in &failed {
            if let Some(request) = self.pending.remove(id) {
                request.slot.set(Err(error.clone()));
            }
        }
        failed.len()
    }
}
