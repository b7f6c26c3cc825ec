//! IPC-ISR example suite.
//!
//! The firmware exercises the interrupt-based inter-processor call mechanism
//! on a dual-core Xtensa part: core 0 reads the other core's PS register and
//! runs three small assembly callbacks on it, printing each result. The suite
//! asserts the full boot-to-end transcript, in order.

use super::{Suite, Target};

/// Expected console transcript of one boot of the ipc_isr example.
pub static MARKERS: &[&str] = &[
    "example: Start",
    "example: PS_INTLEVEL = 0x5",
    "example: PS_EXCM = 0x0",
    "example: PS_UM = 0x1",
    "example: in[0] = 0x1",
    "example: in[1] = 0x2",
    "example: in[2] = 0x3",
    "example: out[0] = (in[0] | in[1] | in[2]) = 0x3",
    "example: out[1] = (in[0] + in[1] + in[2]) = 0x6",
    "example: out[2] = in[2] = 0x3",
    "example: out[3] = PS of other cpu = 0x25",
    "example: End",
];

pub static SUITE: Suite = Suite {
    name: "ipc_isr",
    targets: &[Target::Esp32, Target::Esp32s3],
    markers: MARKERS,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_sequence_shape() {
        assert_eq!(MARKERS.len(), 12);
        assert_eq!(MARKERS[0], "example: Start");
        assert_eq!(MARKERS[11], "example: End");
        // Every marker is a console line from the example itself.
        assert!(MARKERS.iter().all(|m| m.starts_with("example: ")));
    }
}
