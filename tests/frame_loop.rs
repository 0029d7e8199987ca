mod common;

use common::{FakeDetector, MemorySink, ScriptedDisplay, VecSource};
use image::Rgb;
use yolo_annotate::config::PALETTE;
use yolo_annotate::{BoundingBox, Detection, FrameLoop, LoopState, Resolution, RunConfig};

fn config() -> RunConfig {
    RunConfig::new("model.onnx", "video.mp4")
}

fn person_box() -> Detection {
    Detection::new(BoundingBox::new(10.0, 10.0, 50.0, 50.0), 0, 0.9)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_frames_one_detection_each() -> Result<(), Box<dyn std::error::Error>> {
        let mut frame_loop = FrameLoop::new(
            config(),
            FakeDetector::new(vec![person_box()]),
            VecSource::blank(10, 64, 64),
            ScriptedDisplay::new(),
            None::<MemorySink>,
        );

        let summary = frame_loop.run()?;

        assert_eq!(summary.frames, 10);
        assert_eq!(summary.objects, 10);
        assert!(summary.average_fps.unwrap() >= 0.0);
        assert_eq!(frame_loop.state(), LoopState::Terminated);

        let shown = &frame_loop.display().shown;
        assert_eq!(shown.len(), 10);
        for frame in shown {
            // 左边框上的像素为类别0的颜色，框内保持原样
            assert_eq!(*frame.get_pixel(10, 30), Rgb(PALETTE[0]));
            assert_eq!(*frame.get_pixel(30, 30), Rgb([0, 0, 0]));
        }
        Ok(())
    }

    #[test]
    fn each_frame_counts_one_object() -> Result<(), Box<dyn std::error::Error>> {
        let mut frame_loop = FrameLoop::new(
            config(),
            FakeDetector::new(vec![person_box()]),
            VecSource::blank(10, 64, 64),
            ScriptedDisplay::new(),
            None::<MemorySink>,
        );

        for expected in 1..=10 {
            frame_loop.step()?;
            assert_eq!(frame_loop.summary().objects, expected);
        }
        frame_loop.step()?;
        assert_eq!(frame_loop.state(), LoopState::Terminated);
        Ok(())
    }

    #[test]
    fn only_detections_at_or_above_threshold_are_counted() -> Result<(), Box<dyn std::error::Error>> {
        let detections = vec![
            Detection::new(BoundingBox::new(20.0, 60.0, 60.0, 100.0), 0, 0.2),
            Detection::new(BoundingBox::new(80.0, 60.0, 120.0, 100.0), 1, 0.5),
            Detection::new(BoundingBox::new(20.0, 110.0, 60.0, 150.0), 2, 0.7),
            Detection::new(BoundingBox::new(80.0, 110.0, 120.0, 150.0), 3, 0.49),
        ];
        let mut frame_loop = FrameLoop::new(
            config().with_confidence_threshold(0.5),
            FakeDetector::new(detections),
            VecSource::blank(1, 200, 160),
            ScriptedDisplay::new(),
            None::<MemorySink>,
        );

        let summary = frame_loop.run()?;
        assert_eq!(summary.objects, 2);

        let frame = &frame_loop.display().shown[0];
        assert_eq!(*frame.get_pixel(80, 80), Rgb(PALETTE[1]));
        assert_eq!(*frame.get_pixel(20, 130), Rgb(PALETTE[2]));
        // 低于阈值的框没有画出来
        assert_eq!(*frame.get_pixel(20, 80), Rgb([0, 0, 0]));
        assert_eq!(*frame.get_pixel(80, 130), Rgb([0, 0, 0]));
        Ok(())
    }

    #[test]
    fn resolution_applies_to_inference_display_and_recording() -> Result<(), Box<dyn std::error::Error>> {
        let config = config()
            .with_resolution(Resolution::new(64, 48))
            .with_record(true);
        let mut frame_loop = FrameLoop::new(
            config,
            FakeDetector::new(vec![person_box()]),
            VecSource::blank(4, 100, 80),
            ScriptedDisplay::new(),
            Some(MemorySink::default()),
        );

        frame_loop.run()?;

        assert_eq!(frame_loop.detector().seen, vec![(64, 48); 4]);
        assert!(frame_loop.display().shown.iter().all(|f| f.dimensions() == (64, 48)));
        let recorder = frame_loop.recorder().expect("recorder");
        assert_eq!(recorder.frames, vec![(64, 48); 4]);
        assert_eq!(recorder.released.get(), 1);
        Ok(())
    }

    #[test]
    fn quit_key_stops_early() -> Result<(), Box<dyn std::error::Error>> {
        let mut frame_loop = FrameLoop::new(
            config(),
            FakeDetector::new(Vec::new()),
            VecSource::blank(10, 32, 32),
            ScriptedDisplay::new().press(2, 'Q'),
            None::<MemorySink>,
        );

        let summary = frame_loop.run()?;

        assert_eq!(summary.frames, 3);
        assert_eq!(frame_loop.source().remaining(), 7);
        assert_eq!(frame_loop.source().released.get(), 1);
        assert_eq!(frame_loop.display().closed.get(), 1);
        Ok(())
    }

    #[test]
    fn pause_blocks_for_one_key_then_resumes() -> Result<(), Box<dyn std::error::Error>> {
        let mut frame_loop = FrameLoop::new(
            config(),
            FakeDetector::new(Vec::new()),
            VecSource::blank(3, 32, 32),
            ScriptedDisplay::new().press(0, 's'),
            None::<MemorySink>,
        );

        frame_loop.step()?;
        assert_eq!(frame_loop.state(), LoopState::Paused);

        let summary = frame_loop.run()?;
        assert_eq!(summary.frames, 3);
        assert_eq!(frame_loop.display().waits, 1);
        Ok(())
    }

    #[test]
    fn snapshot_key_saves_the_annotated_frame() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let snapshot = dir.path().join("capture.png");
        let mut frame_loop = FrameLoop::new(
            config().with_snapshot_path(&snapshot),
            FakeDetector::new(vec![person_box()]),
            VecSource::tinted(6, 64, 64),
            ScriptedDisplay::new().press(4, 'p'),
            None::<MemorySink>,
        );

        let summary = frame_loop.run()?;
        assert_eq!(summary.snapshots, 1);
        assert_eq!(summary.frames, 6);

        let saved = image::open(&snapshot)?.to_rgb8();
        let shown = &frame_loop.display().shown;
        assert_eq!(saved, shown[4]);
        assert_ne!(saved, shown[3]);
        Ok(())
    }

    #[test]
    fn average_fps_is_mean_of_samples() -> Result<(), Box<dyn std::error::Error>> {
        let mut frame_loop = FrameLoop::new(
            config(),
            FakeDetector::new(vec![person_box()]),
            VecSource::blank(5, 32, 32),
            ScriptedDisplay::new(),
            None::<MemorySink>,
        );

        let summary = frame_loop.run()?;

        let samples = frame_loop.fps().as_slice();
        assert_eq!(samples.len(), 5);
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        assert_eq!(summary.average_fps, Some(mean));
        Ok(())
    }

    #[test]
    fn empty_source_reports_no_average() -> Result<(), Box<dyn std::error::Error>> {
        let mut frame_loop = FrameLoop::new(
            config(),
            FakeDetector::new(Vec::new()),
            VecSource::blank(0, 32, 32),
            ScriptedDisplay::new(),
            None::<MemorySink>,
        );

        let summary = frame_loop.run()?;

        assert_eq!(summary.frames, 0);
        assert_eq!(summary.average_fps, None);
        assert_eq!(
            summary.fps_line(),
            "Average FPS: not computed (no frames processed)"
        );
        Ok(())
    }

    #[test]
    fn resources_are_released_when_the_loop_fails() {
        let source = VecSource::blank(3, 32, 32);
        let source_released = source.released.clone();
        let display = ScriptedDisplay::new();
        let display_closed = display.closed.clone();
        let sink = MemorySink::default();
        let sink_released = sink.released.clone();

        let mut frame_loop = FrameLoop::new(
            config(),
            FakeDetector::failing(),
            source,
            display,
            Some(sink),
        );
        assert!(frame_loop.run().is_err());
        drop(frame_loop);

        assert_eq!(source_released.get(), 1);
        assert_eq!(display_closed.get(), 1);
        assert_eq!(sink_released.get(), 1);
    }
}
