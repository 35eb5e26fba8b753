use std::collections::VecDeque;

use log::warn;

use arbor_shared::{
    EntityMessageEvent, ExecKind, Identity, MessageKind, NetworkEvent, RequestTable,
    ResponseEnvelope, ResponseEvent, ResponseId, ResponseSlot, Tick,
};

use crate::error::ClusterError;

/// Pseudo-session for traffic a process addresses to itself. Events queued
/// during one tick are read back in the next tick's read phase, so local
/// requests complete with the same timing as remote ones.
#[derive(Default)]
pub(crate) struct Loopback {
    queued: VecDeque<NetworkEvent>,
    requests: RequestTable<()>,
}

impl Loopback {
    pub fn send_event(&mut self, event: NetworkEvent) {
        self.queued.push_back(event);
    }

    pub fn send_request(
        &mut self,
        target: Identity,
        kind: MessageKind,
        payload: Vec<u8>,
        slot: ResponseSlot,
        now: Tick,
    ) -> Result<ResponseId, ClusterError> {
        let response_id = self.requests.register((), slot, now)?;
        self.queued
            .push_back(NetworkEvent::EntityMessage(EntityMessageEvent {
                target,
                kind,
                exec: ExecKind::Request(response_id),
                payload,
            }));
        Ok(response_id)
    }

    /// Drains queued events. Responses resolve their requests here and are
    /// not returned.
    pub fn receive(&mut self) -> Vec<NetworkEvent> {
        let mut events = Vec::new();
        for event in std::mem::take(&mut self.queued) {
            match event {
                NetworkEvent::Response(ResponseEvent {
                    kind,
                    response_id,
                    payload,
                }) => {
                    if let Err(error) = self
                        .requests
                        .resolve(response_id, ResponseEnvelope { kind, payload })
                    {
                        warn!("Dropping loopback response: {}", error);
                    }
                }
                event => events.push(event),
            }
        }
        events
    }

    pub fn expire_requests(&mut self, now: Tick, timeout: Tick) -> usize {
        self.requests.expire(now, timeout)
    }

    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }
}
