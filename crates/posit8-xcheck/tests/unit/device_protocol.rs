//! Device implementations against the protocol.

use std::time::Duration;

use posit8_core::{Operation, Posit8, kernel};
use posit8_xcheck::{CommandDevice, Device, Error, KernelDevice};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn real_posit() -> impl Strategy<Value = Posit8> {
    any::<u8>()
        .prop_filter("real", |b| *b != 0x80)
        .prop_map(Posit8::from_bits)
}

fn operand(p: Posit8) -> String {
    format!("{:.6}", p.to_f64())
}

proptest! {
    #[test]
    fn kernel_device_matches_kernels(a in real_posit(), b in real_posit()) {
        let rt = runtime();
        for (op, expected) in [
            (Operation::Add, kernel::add(a, b)),
            (Operation::Sub, kernel::sub(a, b)),
            (Operation::Mul, kernel::mul(a, b)),
            (Operation::Div, kernel::div(a, b)),
        ] {
            let got = rt
                .block_on(KernelDevice.evaluate(op, &operand(a), Some(&operand(b))))
                .unwrap();
            let want = kernel::to_f64(expected);
            prop_assert_eq!(got, want, "{}", op);
        }
    }
}

#[tokio::test]
async fn test_kernel_device_missing_second_operand_is_zero() {
    let value = KernelDevice
        .evaluate(Operation::Add, "1.5", None)
        .await
        .unwrap();
    assert_eq!(value, 1.5);
}

#[tokio::test]
async fn test_kernel_device_short_bits() {
    let err = KernelDevice
        .evaluate(Operation::Decode, "1010", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Core(_)));
}

#[cfg(unix)]
mod scripted {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    fn script(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("device.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_command_device_reads_stdout() {
        let dir = tempfile::TempDir::new().unwrap();
        let device = CommandDevice::new(script(&dir, "printf '%s' 2.500000"));
        let value = device
            .evaluate(Operation::Add, "2", Some("0.5"))
            .await
            .unwrap();
        assert_eq!(value, 2.5);
    }

    #[tokio::test]
    async fn test_command_device_passes_mode_and_operands() {
        let dir = tempfile::TempDir::new().unwrap();
        // Echo back the mode so the caller sees which code was sent.
        let device = CommandDevice::new(script(&dir, "printf '%s' \"$1\""));
        let value = device
            .evaluate(Operation::Div, "1", Some("3"))
            .await
            .unwrap();
        assert_eq!(value, 3.0);
    }

    #[tokio::test]
    async fn test_command_device_nan_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let device = CommandDevice::new(script(&dir, "echo -nan"));
        let value = device
            .evaluate(Operation::Mul, "1", Some("1"))
            .await
            .unwrap();
        assert!(value.is_nan());
    }

    #[tokio::test]
    async fn test_command_device_nonzero_exit() {
        let dir = tempfile::TempDir::new().unwrap();
        let device = CommandDevice::new(script(&dir, "echo 'bad mode' >&2\nexit 3"));
        let err = device
            .evaluate(Operation::Add, "1", Some("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Device { .. }));
        assert!(err.to_string().contains("bad mode"));
    }

    #[tokio::test]
    async fn test_command_device_garbage_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let device = CommandDevice::new(script(&dir, "echo hello"));
        let err = device
            .evaluate(Operation::Add, "1", Some("1"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unparseable output"));
    }

    #[tokio::test]
    async fn test_command_device_timeout() {
        let dir = tempfile::TempDir::new().unwrap();
        let device = CommandDevice::new(script(&dir, "sleep 5"))
            .with_timeout(Duration::from_millis(200));
        let err = device
            .evaluate(Operation::Add, "1", Some("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { millis: 200 }));
        assert_eq!(err.to_string(), "Device timed out after 200ms");
    }
}
