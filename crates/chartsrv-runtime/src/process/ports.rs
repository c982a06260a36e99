//! Port allocation for the chart server.

use std::net::TcpListener;
use std::ops::RangeInclusive;

use tracing::debug;

/// Check if a port is free by binding a throwaway loopback listener.
///
/// The listener is dropped before returning, so the port is released again.
pub fn is_port_available(port: u16) -> bool {
    match TcpListener::bind(("127.0.0.1", port)) {
        Ok(listener) => listener.local_addr().is_ok(),
        Err(_) => false,
    }
}

/// First free port in `[preferred, max]`, scanning upwards.
///
/// `None` when every port is busy or the range is empty. No retries.
pub fn find_available_port(preferred: u16, max: u16) -> Option<u16> {
    let found = (preferred..=max).find(|&port| is_port_available(port));
    match found {
        Some(port) => debug!(port = %port, "Found available port"),
        None => debug!(preferred = %preferred, max = %max, "No available port in range"),
    }
    found
}

/// First free port across several ranges, tried in order.
pub fn find_port_in_candidates(candidates: &[RangeInclusive<u16>]) -> Option<u16> {
    candidates
        .iter()
        .find_map(|range| find_available_port(*range.start(), *range.end()))
}

/// Reserve `count` consecutive ports by holding listeners on them.
#[cfg(test)]
pub(crate) fn hold_consecutive(count: u16) -> (u16, Vec<TcpListener>) {
    for _ in 0..50 {
        let first = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = first.local_addr().unwrap().port();
        if base.checked_add(count).is_none() {
            continue;
        }
        let mut held = vec![first];
        let all_bound = (1..count).all(|offset| {
            TcpListener::bind(("127.0.0.1", base + offset))
                .map(|l| held.push(l))
                .is_ok()
        });
        if all_bound {
            return (base, held);
        }
    }
    panic!("could not reserve {count} consecutive ports");
}
