// Integration tests for the complete compute pass
//
// The pass uploads the input into a storage buffer, runs the doubling kernel
// once over every element, and reads the buffer back. The CPU runner is the
// reference; the GLES tests need a real EGL device and are ignored by default.

use gles_headless_compute::{
    config::{ComputeConfig, ContextVersion},
    error::ComputeError,
    report, verify_against_reference, ComputeRunner, CpuRunner, GlesRunner, DOUBLE_SHADER_GLSL,
};
use rand::Rng;

fn random_input(len: usize) -> Vec<u32> {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen()).collect()
}

#[test]
fn cpu_pass_matches_default_run_output() {
    let config = ComputeConfig::default();
    let input = config.input_values();
    let mut output = input.clone();

    CpuRunner.double(&mut output).unwrap();

    let mut stdout = Vec::new();
    report::write_input_output(&mut stdout, &input, &output).unwrap();
    assert_eq!(
        String::from_utf8(stdout).unwrap(),
        "Input  :\n 0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17 18 19\n\
         Output :\n 0 2 4 6 8 10 12 14 16 18 20 22 24 26 28 30 32 34 36 38\n"
    );
}

#[test]
fn cpu_pass_on_random_input_verifies() {
    for len in [1, 63, 64, 65, 10_000] {
        let input = random_input(len);
        let mut output = input.clone();
        CpuRunner.double(&mut output).unwrap();
        verify_against_reference(&input, &output).unwrap();
        assert!(input
            .iter()
            .zip(&output)
            .all(|(i, o)| *o == i.wrapping_mul(2)));
    }
}

#[test]
fn untouched_output_fails_verification() {
    let input = vec![3u32, 5, 8];
    assert!(matches!(
        verify_against_reference(&input, &input),
        Err(ComputeError::OutputMismatch { index: 0, .. })
    ));
}

#[test]
#[ignore = "requires an EGL device with OpenGL ES 3.1"]
fn gles_pass_matches_cpu_reference() {
    let runner = GlesRunner::new(ContextVersion::COMPUTE, DOUBLE_SHADER_GLSL).unwrap();
    for len in [1, 20, 64, 65, 4096] {
        let input = random_input(len);
        let mut output = input.clone();
        runner.double(&mut output).unwrap();
        verify_against_reference(&input, &output).unwrap();
    }
}

#[test]
#[ignore = "requires an EGL device with OpenGL ES 3.1"]
fn gles_backend_reports_embedded_context() {
    let runner = GlesRunner::new(ContextVersion::COMPUTE, DOUBLE_SHADER_GLSL).unwrap();
    let version = runner.context().gl_version();
    assert!(version.is_embedded);
    assert!((version.major, version.minor) >= (3, 1));

    let info = runner.backend_info();
    assert_eq!(info.name, "gles");
    assert!(info.device.is_some());
}
