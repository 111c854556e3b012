use std::fs;

use image::{codecs::gif::GifDecoder, AnimationDecoder};
use julia_render::{
    render::animation_frame, render_animation, render_animation_with, AnimationEncoder,
    AnimationParams, EscapeMatrix, RenderError, RenderParams,
};
use num_complex::Complex64;

/// Keeps every frame it is given.
#[derive(Default)]
struct Recorder<'a> {
    frames: Vec<EscapeMatrix>,
    finished: Option<&'a mut Vec<EscapeMatrix>>,
}

impl AnimationEncoder for Recorder<'_> {
    fn push_frame(&mut self, frame: &EscapeMatrix) -> Result<(), RenderError> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(self) -> Result<(), RenderError> {
        if let Some(out) = self.finished {
            *out = self.frames;
        }
        Ok(())
    }
}

/// Rejects the frame at `fail_at`.
struct Failing {
    fail_at: usize,
    pushed: usize,
}

impl AnimationEncoder for Failing {
    fn push_frame(&mut self, _frame: &EscapeMatrix) -> Result<(), RenderError> {
        if self.pushed == self.fail_at {
            return Err(RenderError::RenderIo {
                path: "failing.gif".into(),
                source: image::ImageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )),
            });
        }
        self.pushed += 1;
        Ok(())
    }

    fn finish(self) -> Result<(), RenderError> {
        panic!("finish must not be called after a failed frame");
    }
}

fn params() -> RenderParams {
    RenderParams::new(20, 12, Complex64::new(-0.8, 0.156))
}

fn record(params: &RenderParams, animation: &AnimationParams) -> Vec<EscapeMatrix> {
    let mut frames = Vec::new();
    let recorder = Recorder {
        finished: Some(&mut frames),
        ..Recorder::default()
    };
    let pushed = render_animation_with(params, animation, recorder).unwrap();
    assert_eq!(pushed as usize, frames.len());
    frames
}

#[test]
fn one_transposed_frame_per_phase_in_order() {
    let params = params();
    let animation = AnimationParams {
        frames: 9,
        frames_in_flight: Some(4),
        ..AnimationParams::default()
    };

    let frames = record(&params, &animation);

    assert_eq!(frames.len(), 9);
    for (index, frame) in frames.iter().enumerate() {
        assert_eq!(
            frame,
            &animation_frame(&params, index as u32, 9).transposed(),
            "frame {index}"
        );
        assert_eq!(frame.density(), 12);
    }
}

#[test]
fn frames_in_flight_does_not_change_the_output() {
    let params = params();
    let serial = record(
        &params,
        &AnimationParams {
            frames: 7,
            frames_in_flight: Some(1),
            ..AnimationParams::default()
        },
    );
    let wide = record(
        &params,
        &AnimationParams {
            frames: 7,
            frames_in_flight: Some(64),
            ..AnimationParams::default()
        },
    );
    assert_eq!(serial, wide);
}

#[test]
fn frames_differ_as_the_constant_turns() {
    let frames = record(
        &params(),
        &AnimationParams {
            frames: 4,
            ..AnimationParams::default()
        },
    );
    assert_ne!(frames[0], frames[2]);
}

#[test]
fn failed_frame_stops_the_loop() {
    let encoder = Failing {
        fail_at: 3,
        pushed: 0,
    };
    let animation = AnimationParams {
        frames: 10,
        frames_in_flight: Some(2),
        ..AnimationParams::default()
    };
    let err = render_animation_with(&params(), &animation, encoder).unwrap_err();
    assert!(matches!(err, RenderError::RenderIo { .. }));
}

#[test]
fn invalid_animation_parameters_push_nothing() {
    let animation = AnimationParams {
        frames: 0,
        ..AnimationParams::default()
    };
    let encoder = Failing {
        fail_at: 0,
        pushed: 0,
    };
    let err = render_animation_with(&params(), &animation, encoder).unwrap_err();
    assert!(matches!(
        err,
        RenderError::InvalidParameter { name: "frames", .. }
    ));
}

#[test]
fn writes_a_looping_gif() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("julia_set.gif");
    let animation = AnimationParams {
        frames: 5,
        interval_ms: 60,
        frame_size: Some(24),
        frames_in_flight: Some(2),
    };

    let written = render_animation(&params().with_colour_map("plasma"), &animation, &path).unwrap();
    assert_eq!(written, path);

    let decoder = GifDecoder::new(fs::File::open(&path).unwrap()).unwrap();
    let frames = decoder.into_frames().collect_frames().unwrap();
    assert_eq!(frames.len(), 5);
    for frame in &frames {
        assert_eq!(frame.buffer().dimensions(), (24, 24));
        let (numer, denom) = frame.delay().numer_denom_ms();
        assert_eq!(numer / denom, 60);
    }
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn sub_centisecond_interval_is_rejected_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fast.gif");
    let animation = AnimationParams {
        frames: 2,
        interval_ms: 5,
        ..AnimationParams::default()
    };

    let err = render_animation(&params(), &animation, &path).unwrap_err();
    assert!(matches!(
        err,
        RenderError::InvalidParameter {
            name: "interval",
            ..
        }
    ));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn frames_default_to_the_grid_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.gif");
    let animation = AnimationParams {
        frames: 2,
        ..AnimationParams::default()
    };

    render_animation(&params(), &animation, &path).unwrap();

    let decoder = GifDecoder::new(fs::File::open(&path).unwrap()).unwrap();
    let frames = decoder.into_frames().collect_frames().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].buffer().dimensions(), (12, 12));
}

#[test]
fn bad_output_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    let animation = AnimationParams {
        frames: 2,
        ..AnimationParams::default()
    };

    let err = render_animation(&params(), &animation, dir.path().join("missing/a.gif")).unwrap_err();
    assert!(matches!(err, RenderError::RenderIo { .. }), "{err}");

    let err = render_animation(&params(), &animation, dir.path().join("a.png")).unwrap_err();
    assert!(matches!(err, RenderError::InvalidParameter { .. }), "{err}");

    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
