use arbor_client::{self as client, ClientError, ClientSession};
use arbor_server::{self as server, ServerSession};
use arbor_shared::{
    ConnectionConfig, EntityMessageEvent, ExecKind, Identity, MessageKind, NetworkEvent,
    PeerAddress, RequestError, ResponseSlot, RpcEvent, SyncEvent,
};
use arbor_test::{init_logging, LocalTransport};

fn address() -> PeerAddress {
    PeerAddress::new("127.0.0.1", 1200)
}

fn sync(byte: u8) -> NetworkEvent {
    NetworkEvent::Synchronize(SyncEvent {
        target: Identity::ROOT,
        data: vec![byte],
    })
}

/// Server with one accepted client, both sides past their connect events
fn connected(config: &ConnectionConfig) -> (ServerSession, ClientSession, server::PeerKey) {
    init_logging();
    let mut transport = LocalTransport::new();
    let mut server = ServerSession::listen(&mut transport, &address(), config).unwrap();
    let mut client = ClientSession::connect(&mut transport, &address(), config).unwrap();

    assert!(client.receive().has::<client::ConnectEvent>());
    let mut accepted = server.receive();
    let peers: Vec<server::PeerKey> = accepted.read::<server::ConnectEvent>().collect();
    assert_eq!(peers.len(), 1);
    (server, client, peers[0])
}

#[test]
fn events_arrive_in_send_order() {
    let config = ConnectionConfig::default();
    let (mut server, mut client, peer) = connected(&config);

    for byte in 0..5 {
        client.send_event(&sync(byte)).unwrap();
    }
    client.send_all();

    let received: Vec<NetworkEvent> = server
        .receive()
        .read::<server::NetworkEventReceived>()
        .map(|(from, event)| {
            assert_eq!(from, peer);
            event
        })
        .collect();
    assert_eq!(received, (0..5).map(sync).collect::<Vec<_>>());
}

#[test]
fn reads_are_capped_per_update() {
    let config = ConnectionConfig {
        max_frames_per_read: 2,
        ..ConnectionConfig::default()
    };
    let (mut server, mut client, _) = connected(&config);

    // one flush per event, so one frame per event
    for byte in 0..5 {
        client.send_event(&sync(byte)).unwrap();
        client.send_all();
    }

    let mut batches = Vec::new();
    for _ in 0..3 {
        let batch: Vec<NetworkEvent> = server
            .receive()
            .read::<server::NetworkEventReceived>()
            .map(|(_, event)| event)
            .collect();
        batches.push(batch);
    }
    assert_eq!(batches[0], vec![sync(0), sync(1)]);
    assert_eq!(batches[1], vec![sync(2), sync(3)]);
    assert_eq!(batches[2], vec![sync(4)]);
}

#[test]
fn server_requests_are_correlated_with_responses() {
    let config = ConnectionConfig::default();
    let (mut server, mut client, peer) = connected(&config);
    let kind = MessageKind::new(120);
    let reply_kind = MessageKind::new(121);

    let first = ResponseSlot::new();
    let second = ResponseSlot::new();
    server
        .send_request(&peer, Identity::ROOT, kind, vec![1], first.clone(), 0)
        .unwrap();
    server
        .send_request(&peer, Identity::ROOT, kind, vec![2], second.clone(), 0)
        .unwrap();
    server.send_all();
    assert_eq!(server.pending_requests(), 2);

    let requests: Vec<EntityMessageEvent> = client
        .receive()
        .read::<client::NetworkEventReceived>()
        .map(|event| match event {
            NetworkEvent::EntityMessage(message) => message,
            other => panic!("unexpected event {:?}", other),
        })
        .collect();
    assert_eq!(requests.len(), 2);

    // answer out of order, echoing the payload back
    for request in requests.iter().rev() {
        let ExecKind::Request(response_id) = request.exec else {
            panic!("expected a request");
        };
        client
            .send_response(response_id, reply_kind, request.payload.clone())
            .unwrap();
    }
    client.send_all();
    let events = server.receive();
    assert!(events.is_empty());

    assert_eq!(first.take().unwrap().unwrap().payload, vec![1]);
    assert_eq!(second.take().unwrap().unwrap().payload, vec![2]);
    assert_eq!(server.pending_requests(), 0);
}

#[test]
fn stray_responses_are_dropped() {
    let config = ConnectionConfig::default();
    let (mut server, mut client, _) = connected(&config);

    client
        .send_response(7, MessageKind::new(121), Vec::new())
        .unwrap();
    client.send_all();

    assert!(server.receive().is_empty());
    assert_eq!(server.pending_requests(), 0);
}

#[test]
fn responses_only_resolve_requests_sent_to_that_peer() {
    init_logging();
    let config = ConnectionConfig::default();
    let mut transport = LocalTransport::new();
    let mut server = ServerSession::listen(&mut transport, &address(), &config).unwrap();
    let mut asked = ClientSession::connect(&mut transport, &address(), &config).unwrap();
    let mut other = ClientSession::connect(&mut transport, &address(), &config).unwrap();
    let peers: Vec<server::PeerKey> = server.receive().read::<server::ConnectEvent>().collect();
    assert_eq!(peers.len(), 2);

    let slot = ResponseSlot::new();
    let response_id = server
        .send_request(&peers[0], Identity::ROOT, MessageKind::new(120), vec![1], slot.clone(), 0)
        .unwrap();
    server.send_all();

    // the other peer answers with the same id
    other
        .send_response(response_id, MessageKind::new(121), vec![9])
        .unwrap();
    other.send_all();
    server.receive();
    assert!(!slot.is_ready());
    assert_eq!(server.pending_requests(), 1);

    asked
        .send_response(response_id, MessageKind::new(121), vec![1])
        .unwrap();
    asked.send_all();
    server.receive();
    assert_eq!(slot.take().unwrap().unwrap().payload, vec![1]);
    assert_eq!(server.pending_requests(), 0);
}

#[test]
fn client_disconnect_fails_server_requests() {
    let config = ConnectionConfig::default();
    let (mut server, mut client, peer) = connected(&config);

    let slot = ResponseSlot::new();
    server
        .send_request(&peer, Identity::ROOT, MessageKind::new(120), Vec::new(), slot.clone(), 0)
        .unwrap();
    server.send_all();

    client.disconnect();
    let mut events = server.receive();
    let gone: Vec<_> = events.read::<server::DisconnectEvent>().collect();
    assert_eq!(gone, vec![(peer, None)]);
    assert_eq!(slot.take(), Some(Err(RequestError::SessionClosed)));
    assert_eq!(server.peers_count(), 0);
}

#[test]
fn server_disconnect_fails_client_requests() {
    let config = ConnectionConfig::default();
    let (mut server, mut client, peer) = connected(&config);

    let slot = ResponseSlot::new();
    client
        .send_request(Identity::ROOT, MessageKind::new(120), Vec::new(), slot.clone(), 0)
        .unwrap();
    client.send_all();

    server.disconnect(&peer);
    assert!(client.receive().has::<client::DisconnectEvent>());
    assert_eq!(slot.take(), Some(Err(RequestError::SessionClosed)));
    assert!(!client.is_connected());
    assert!(matches!(
        client.send_event(&sync(0)),
        Err(ClientError::Disconnected { .. })
    ));
}

#[test]
fn broadcast_reaches_every_peer() {
    init_logging();
    let config = ConnectionConfig::default();
    let mut transport = LocalTransport::new();
    let mut server = ServerSession::listen(&mut transport, &address(), &config).unwrap();
    let mut clients: Vec<ClientSession> = (0..3)
        .map(|_| ClientSession::connect(&mut transport, &address(), &config).unwrap())
        .collect();
    server.receive();
    assert_eq!(server.peers_count(), 3);

    let rpc = NetworkEvent::Rpc(RpcEvent {
        target: Identity::ROOT,
        method: "wave".to_string(),
        params: Vec::new(),
    });
    server.broadcast(&rpc).unwrap();
    server.send_all();

    for client in clients.iter_mut() {
        let received: Vec<NetworkEvent> = client
            .receive()
            .read::<client::NetworkEventReceived>()
            .collect();
        assert_eq!(received, vec![rpc.clone()]);
    }
}

#[test]
fn listening_twice_on_one_address_fails() {
    let config = ConnectionConfig::default();
    let mut transport = LocalTransport::new();
    let _server = ServerSession::listen(&mut transport, &address(), &config).unwrap();
    assert!(ServerSession::listen(&mut transport, &address(), &config).is_err());
    let other = PeerAddress::new("127.0.0.1", 1201);
    assert!(ClientSession::connect(&mut transport, &other, &config).is_err());
}
