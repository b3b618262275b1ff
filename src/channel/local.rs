use std::collections::HashMap;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use log::debug;

use crate::channel::error::{Result, TransportError};
use crate::channel::protocol::{Ack, Request};
use crate::channel::{ProcessLifecycle, RequestSink, RequestSource};
use crate::common::types::{ProcessId, VirtualAddress};

/// Distinguishes successive occupants of the same process slot, so traffic
/// from a retired process cannot be mistaken for its successor's.
type Incarnation = u64;

#[derive(Debug)]
struct Envelope {
    incarnation: Incarnation,
    request: Request,
}

#[derive(Debug)]
struct Route {
    incarnation: Incarnation,
    acks: Sender<Ack>,
}

/// In-process transport built on crossbeam channels.
///
/// All processes share one request queue; each registered process gets its
/// own acknowledgement queue. Dropping an endpoint posts an exit notice.
pub struct LocalTransport {
    requests_tx: Sender<Envelope>,
    requests_rx: Receiver<Envelope>,
    exits_tx: Sender<(ProcessId, Incarnation)>,
    exits_rx: Receiver<(ProcessId, Incarnation)>,
    routes: HashMap<ProcessId, Route>,
    next_incarnation: Incarnation,
    discarded: u64,
}

impl LocalTransport {
    pub fn new() -> Self {
        let (requests_tx, requests_rx) = channel::unbounded();
        let (exits_tx, exits_rx) = channel::unbounded();
        Self {
            requests_tx,
            requests_rx,
            exits_tx,
            exits_rx,
            routes: HashMap::new(),
            next_incarnation: 0,
            discarded: 0,
        }
    }

    /// Open a route for `pid` and return the process side of it.
    /// Any earlier route for the same slot is replaced.
    pub fn register(&mut self, pid: ProcessId) -> ProcessEndpoint {
        self.next_incarnation += 1;
        let incarnation = self.next_incarnation;
        let (ack_tx, ack_rx) = channel::unbounded();

        self.routes.insert(pid, Route { incarnation, acks: ack_tx });

        ProcessEndpoint {
            pid,
            incarnation,
            requests: self.requests_tx.clone(),
            acks: ack_rx,
            exits: self.exits_tx.clone(),
        }
    }

    pub fn is_routed(&self, pid: ProcessId) -> bool {
        self.routes.contains_key(&pid)
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Requests queued but not yet received
    pub fn pending_requests(&self) -> usize {
        self.requests_rx.len()
    }

    /// Accesses dropped because their sender had already been retired.
    /// A late `Terminate` from a retired process is part of a normal exit
    /// and is not counted.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    fn is_current(&self, pid: ProcessId, incarnation: Incarnation) -> bool {
        self.routes
            .get(&pid)
            .is_some_and(|route| route.incarnation == incarnation)
    }
}

impl Default for LocalTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSource for LocalTransport {
    fn try_receive(&mut self) -> Result<Option<Request>> {
        loop {
            match self.requests_rx.try_recv() {
                Ok(envelope) if self.is_current(envelope.request.pid(), envelope.incarnation) => {
                    return Ok(Some(envelope.request));
                }
                Ok(envelope) => {
                    if matches!(envelope.request, Request::Access { .. }) {
                        self.discarded += 1;
                    }
                    debug!("Discarding {:?} from a retired process", envelope.request);
                }
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => return Err(TransportError::Disconnected),
            }
        }
    }
}

impl RequestSink for LocalTransport {
    fn send_ack(&mut self, pid: ProcessId, ack: Ack) -> Result<()> {
        let route = self.routes.get(&pid).ok_or(TransportError::NoRoute(pid))?;
        route.acks.send(ack).map_err(|_| TransportError::Disconnected)
    }

    fn close_route(&mut self, pid: ProcessId) {
        self.routes.remove(&pid);
    }
}

impl ProcessLifecycle for LocalTransport {
    fn poll_terminated(&mut self) -> Option<ProcessId> {
        loop {
            match self.exits_rx.try_recv() {
                Ok((pid, incarnation)) if self.is_current(pid, incarnation) => return Some(pid),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }
}

/// Process side of a route: submits requests and waits for their acks
pub struct ProcessEndpoint {
    pid: ProcessId,
    incarnation: Incarnation,
    requests: Sender<Envelope>,
    acks: Receiver<Ack>,
    exits: Sender<(ProcessId, Incarnation)>,
}

impl ProcessEndpoint {
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Submit an access and block until it is acknowledged
    pub fn access(&self, address: VirtualAddress, is_write: bool) -> Result<Ack> {
        self.submit(Request::Access {
            pid: self.pid,
            address,
            is_write,
        })?;
        self.acks.recv().map_err(|_| TransportError::Disconnected)
    }

    /// Like `access`, but gives up after `timeout` of real time
    pub fn access_timeout(
        &self,
        address: VirtualAddress,
        is_write: bool,
        timeout: Duration,
    ) -> Result<Ack> {
        self.submit(Request::Access {
            pid: self.pid,
            address,
            is_write,
        })?;
        self.acks.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => TransportError::Timeout,
            RecvTimeoutError::Disconnected => TransportError::Disconnected,
        })
    }

    /// Announce termination. The exit notice follows when `self` drops.
    pub fn terminate(self) -> Result<()> {
        self.submit(Request::Terminate { pid: self.pid })
    }

    fn submit(&self, request: Request) -> Result<()> {
        self.requests
            .send(Envelope {
                incarnation: self.incarnation,
                request,
            })
            .map_err(|_| TransportError::Disconnected)
    }
}

impl Drop for ProcessEndpoint {
    fn drop(&mut self) {
        // The coordinator may already be gone
        let _ = self.exits.send((self.pid, self.incarnation));
    }
}
