use log::{info, warn};

use arbor_shared::{
    transport::{Transport, TransportError},
    Connection, ConnectionConfig, ConnectionError, EntityMessageEvent, ExecKind, Identity,
    MessageKind, NetworkEvent, PeerAddress, RequestError, RequestTable, ResponseEnvelope,
    ResponseEvent, ResponseId, ResponseSlot, Tick,
};

use crate::{events::ClientEvents, ClientError};

/// Outbound side of a session: one link to one server session
pub struct ClientSession {
    server_address: PeerAddress,
    connection: Connection,
    requests: RequestTable<()>,
    announced: bool,
    disconnected: bool,
}

impl ClientSession {
    /// Opens a link to the server session at `address`
    pub fn connect(
        transport: &mut dyn Transport,
        address: &PeerAddress,
        config: &ConnectionConfig,
    ) -> Result<Self, ClientError> {
        let link = transport.connect(address)?;
        info!("Client session connected to {}", address);
        Ok(Self {
            server_address: address.clone(),
            connection: Connection::new(link, config),
            requests: RequestTable::new(),
            announced: false,
            disconnected: false,
        })
    }

    pub fn server_address(&self) -> &PeerAddress {
        &self.server_address
    }

    pub fn is_connected(&self) -> bool {
        !self.disconnected && self.connection.is_connected()
    }

    // Read phase

    /// Reads a bounded batch of events. The first call reports the
    /// connection, the call that notices the link closing reports the
    /// disconnection and fails every outstanding request.
    pub fn receive(&mut self) -> ClientEvents {
        let mut events = ClientEvents::new();
        if self.disconnected {
            return events;
        }
        if !self.announced {
            self.announced = true;
            events.push_connection();
        }

        let (received, error) = self.connection.receive_events();
        for event in received {
            match event {
                NetworkEvent::Response(response) => {
                    let envelope = ResponseEnvelope {
                        kind: response.kind,
                        payload: response.payload,
                    };
                    if let Err(error) = self.requests.resolve(response.response_id, envelope) {
                        warn!("Dropping response from {}: {}", self.server_address, error);
                    }
                }
                event => events.push_event(event),
            }
        }

        let closed = error.is_some() || !self.connection.is_connected();
        if let Some(error) = error {
            if error != ConnectionError::Transport(TransportError::Closed) {
                events.push_error(error.into());
            }
        }
        if closed {
            self.mark_disconnected();
            events.push_disconnection();
        }

        events
    }

    // Write phase

    pub fn send_all(&mut self) {
        if self.disconnected {
            return;
        }
        if let Err(error) = self.connection.flush() {
            warn!("Failed to flush events to {}: {}", self.server_address, error);
            self.connection.close();
        }
    }

    // Sending

    pub fn send_event(&mut self, event: &NetworkEvent) -> Result<(), ClientError> {
        self.check_connected()?;
        self.connection.queue_event(event)?;
        Ok(())
    }

    /// Sends a correlated entity message. The slot resolves when the server
    /// answers, or fails if the session closes first.
    pub fn send_request(
        &mut self,
        target: Identity,
        kind: MessageKind,
        payload: Vec<u8>,
        slot: ResponseSlot,
        now: Tick,
    ) -> Result<ResponseId, ClientError> {
        self.check_connected()?;
        let response_id = self.requests.register((), slot, now)?;
        let event = NetworkEvent::EntityMessage(EntityMessageEvent {
            target,
            kind,
            exec: ExecKind::Request(response_id),
            payload,
        });
        if let Err(error) = self.connection.queue_event(&event) {
            self.requests.fail(
                response_id,
                RequestError::Unroutable {
                    reason: error.to_string(),
                },
            );
            return Err(error.into());
        }
        Ok(response_id)
    }

    pub fn send_response(
        &mut self,
        response_id: ResponseId,
        kind: MessageKind,
        payload: Vec<u8>,
    ) -> Result<(), ClientError> {
        self.send_event(&NetworkEvent::Response(ResponseEvent {
            kind,
            response_id,
            payload,
        }))
    }

    pub fn expire_requests(&mut self, now: Tick, timeout: Tick) -> usize {
        self.requests.expire(now, timeout)
    }

    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    /// Closes the link. The disconnection is reported by the next `receive`.
    pub fn disconnect(&mut self) {
        self.connection.close();
    }

    fn check_connected(&self) -> Result<(), ClientError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(ClientError::Disconnected {
                address: self.server_address.to_string(),
            })
        }
    }

    fn mark_disconnected(&mut self) {
        self.disconnected = true;
        self.connection.close();
        let failed = self.requests.fail_all(RequestError::SessionClosed);
        info!(
            "Client session to {} closed, {} pending requests failed",
            self.server_address, failed
        );
    }
}
