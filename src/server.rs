/*!
 * TCP Server
 *
 * Accepts observer connections and speaks the line-delimited JSON protocol.
 * Each connection gets a reader task (commands in) and a writer task
 * (replies and broadcast updates out); a dead peer is dropped without
 * touching engine state or other observers.
 */

use crate::coordinator::Coordinator;
use crate::protocol::{Message, Request};
use log::{debug, info, warn};
use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Run the accept loop on an already-bound listener
pub async fn serve(listener: TcpListener, coordinator: Coordinator) -> io::Result<()> {
    let addr = listener.local_addr()?;
    info!("Listening on {}", addr);

    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Client connected: {}", peer);

        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, peer, coordinator).await {
                warn!("Client {} error: {}", peer, e);
            }
            info!("Client disconnected: {}", peer);
        });
    }
}

async fn handle_client(
    socket: TcpStream,
    peer: SocketAddr,
    coordinator: Coordinator,
) -> io::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();

    // All outbound traffic funnels through one channel so replies and
    // broadcast updates never interleave mid-line
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();

    let write_task = tokio::spawn(async move {
        while let Some(line) = out_rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    // Forward every post-mutation snapshot to this observer
    let mut updates = BroadcastStream::new(coordinator.subscribe());
    let forward_tx = out_tx.clone();
    let forward_task = tokio::spawn(async move {
        while let Some(item) = updates.next().await {
            match item {
                Ok(snapshot) => {
                    if let Ok(line) = Message::update(&snapshot).to_line() {
                        if forward_tx.send(line).is_err() {
                            break;
                        }
                    }
                }
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    // The next snapshot supersedes anything missed
                    debug!("Observer lagged, skipped {} snapshots", skipped);
                }
            }
        }
    });

    // Push the current state on connect
    if let Ok(line) = Message::update(&coordinator.snapshot()).to_line() {
        let _ = out_tx.send(line);
    }

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match Message::parse_line(&line).and_then(Request::try_from) {
            Ok(Request::Bye) => {
                debug!("{} requested disconnect", peer);
                break;
            }
            Ok(request) => {
                debug!("{}: {:?}", peer, request);
                if let Some(reply) = dispatch(&coordinator, request) {
                    if let Ok(line) = reply.to_line() {
                        let _ = out_tx.send(line);
                    }
                }
            }
            Err(e) => {
                // Malformed commands are rejected here and never reach
                // the engine
                warn!("{}: rejected command: {}", peer, e);
                if let Ok(line) = Message::error(e.to_string()).to_line() {
                    let _ = out_tx.send(line);
                }
            }
        }
    }

    drop(out_tx);
    forward_task.abort();
    let _ = write_task.await;
    Ok(())
}

/// Apply one validated request. Semantic failures come back as ERR replies
/// to the sender; successful mutations answer through the broadcast.
fn dispatch(coordinator: &Coordinator, request: Request) -> Option<Message> {
    match request {
        Request::Add(spec) => coordinator
            .add_process(spec)
            .err()
            .map(|e| Message::error(e.to_string())),
        Request::Remove(pid) => coordinator
            .remove_process(pid)
            .err()
            .map(|e| Message::error(e.to_string())),
        Request::SetAlgorithm(name) => coordinator
            .set_algorithm(&name)
            .err()
            .map(|e| Message::error(e.to_string())),
        Request::SetQuantum(quantum) => coordinator
            .set_quantum(quantum)
            .err()
            .map(|e| Message::error(e.to_string())),
        Request::Start => {
            coordinator.start();
            None
        }
        Request::TogglePause => {
            coordinator.toggle_pause();
            None
        }
        Request::Reset => {
            coordinator.reset();
            None
        }
        Request::Tick => {
            coordinator.tick();
            None
        }
        Request::GetState => Some(Message::update(&coordinator.snapshot())),
        // Handled by the caller
        Request::Bye => None,
    }
}
