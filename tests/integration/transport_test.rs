use std::thread;
use std::time::Duration;

use anyhow::Result;

use pagesim::channel::{
    LocalTransport, ProcessLifecycle, Request, RequestSink, RequestSource, TransportError,
};
use pagesim::memory::MemoryManager;
use pagesim::simulation::{reap, serve_one, Turn};

#[path = "../common/mod.rs"]
mod common;
use common::{address_of, tiny_memory_config};

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn test_try_receive_does_not_block() -> Result<()> {
    let mut transport = LocalTransport::new();
    assert_eq!(transport.try_receive()?, None);
    assert_eq!(transport.poll_terminated(), None);
    Ok(())
}

#[test]
fn test_round_trip_between_threads() -> Result<()> {
    let mut manager = MemoryManager::new(tiny_memory_config(2, 4))?;
    let mut transport = LocalTransport::new();
    let pid = manager.admit_process()?;
    let endpoint = transport.register(pid);

    let process = thread::spawn(move || -> Result<Vec<bool>, TransportError> {
        let mut faults = Vec::new();
        for page in [0, 0, 1] {
            faults.push(endpoint.access_timeout(address_of(page), false, WAIT)?.fault_occurred);
        }
        endpoint.terminate()?;
        Ok(faults)
    });

    let mut served = 0;
    while served < 3 {
        if let Turn::Served { .. } = serve_one(&mut manager, &mut transport)? {
            served += 1;
        } else {
            thread::yield_now();
        }
    }

    let faults = process.join().expect("process thread panicked")?;
    assert_eq!(faults, vec![true, false, true]);

    // The terminate request follows the last access
    let mut turn = serve_one(&mut manager, &mut transport)?;
    while turn == Turn::Idle {
        thread::yield_now();
        turn = serve_one(&mut manager, &mut transport)?;
    }
    assert_eq!(turn, Turn::Terminated { pid, frames: 2 });
    assert!(!transport.is_routed(pid));

    // The exit notice of a retired process is ignored
    assert!(reap(&mut manager, &mut transport)?.is_empty());
    Ok(())
}

#[test]
fn test_acks_reach_the_right_process() -> Result<()> {
    let mut manager = MemoryManager::new(tiny_memory_config(4, 4))?;
    let mut transport = LocalTransport::new();
    let a = manager.admit_process()?;
    let b = manager.admit_process()?;
    let endpoint_a = transport.register(a);
    let endpoint_b = transport.register(b);

    let thread_a = thread::spawn(move || endpoint_a.access_timeout(address_of(1), true, WAIT));
    let thread_b = thread::spawn(move || endpoint_b.access_timeout(address_of(2), false, WAIT));

    let mut served = 0;
    while served < 2 {
        if let Turn::Served { .. } = serve_one(&mut manager, &mut transport)? {
            served += 1;
        }
    }

    let ack_a = thread_a.join().expect("thread a panicked")?;
    let ack_b = thread_b.join().expect("thread b panicked")?;
    assert_eq!(ack_a.pid, a);
    assert_eq!(ack_b.pid, b);
    Ok(())
}

#[test]
fn test_dropped_endpoint_reports_exit() -> Result<()> {
    let mut manager = MemoryManager::new(tiny_memory_config(2, 4))?;
    let mut transport = LocalTransport::new();
    let pid = manager.admit_process()?;
    drop(transport.register(pid));

    assert_eq!(reap(&mut manager, &mut transport)?, vec![pid]);
    assert!(!manager.is_live(pid));
    assert!(!transport.is_routed(pid));
    Ok(())
}

#[test]
fn test_stale_requests_do_not_reach_new_occupant() -> Result<()> {
    let mut manager = MemoryManager::new(tiny_memory_config(2, 4))?;
    let mut transport = LocalTransport::new();

    let pid = manager.admit_process()?;
    let old = transport.register(pid);
    let unanswered = old.access_timeout(0, true, Duration::from_millis(10));
    assert_eq!(unanswered, Err(TransportError::Timeout));
    old.terminate()?;

    // The slot is recycled before the old process's messages are read
    manager.terminate_process(pid)?;
    transport.close_route(pid);
    let reused = manager.admit_process()?;
    assert_eq!(reused, pid);
    let _new = transport.register(reused);

    assert_eq!(transport.try_receive()?, None);
    assert_eq!(transport.poll_terminated(), None);
    // Only the access counts; the late terminate is a routine exit
    assert_eq!(transport.discarded(), 1);
    assert!(manager.is_live(reused));
    Ok(())
}

#[test]
fn test_routine_exit_is_not_counted_as_discarded() -> Result<()> {
    let mut manager = MemoryManager::new(tiny_memory_config(2, 4))?;
    let mut transport = LocalTransport::new();
    let pid = manager.admit_process()?;

    // The exit notice is reaped before the terminate request is read
    transport.register(pid).terminate()?;
    assert_eq!(reap(&mut manager, &mut transport)?, vec![pid]);

    assert_eq!(transport.try_receive()?, None);
    assert_eq!(transport.discarded(), 0);
    Ok(())
}

#[test]
fn test_ack_without_route_fails() {
    let mut transport = LocalTransport::new();
    let result = transport.send_ack(3, pagesim::Ack::hit(3));
    assert_eq!(result, Err(TransportError::NoRoute(3)));
}

#[test]
fn test_endpoint_sees_disconnect_when_transport_drops() {
    let mut transport = LocalTransport::new();
    let endpoint = transport.register(0);
    drop(transport);
    assert_eq!(endpoint.access(0, false), Err(TransportError::Disconnected));
}

#[test]
fn test_request_carries_sender_pid() -> Result<()> {
    let mut transport = LocalTransport::new();
    let endpoint = transport.register(2);
    let waiter =
        thread::spawn(move || endpoint.access_timeout(77, true, Duration::from_millis(200)));

    let mut request = transport.try_receive()?;
    while request.is_none() {
        thread::yield_now();
        request = transport.try_receive()?;
    }
    assert_eq!(request, Some(Request::Access { pid: 2, address: 77, is_write: true }));

    // Never acknowledged
    assert_eq!(waiter.join().expect("waiter panicked"), Err(TransportError::Timeout));
    Ok(())
}
