//! ffmpeg argument construction
//!
//! Builds the argument list that reads a local file at native rate,
//! re-encodes it with low-latency x264 settings and publishes it to an
//! RTSP server over TCP.

use std::path::Path;

use crate::models::StreamSettings;

/// Default encoder binary
pub const FFMPEG: &str = "ffmpeg";

/// Fixed encoding and transport tuning appended before the destination
const TUNING: &[&str] = &[
    "-c:v",
    "libx264",
    "-preset",
    "veryfast",
    "-tune",
    "zerolatency",
    "-an",
    "-f",
    "rtsp",
    "-rtsp_transport",
    "tcp",
];

/// Build ffmpeg arguments (without the program name)
pub fn build_args(input: &Path, settings: &StreamSettings, destination: &str) -> Vec<String> {
    let mut args = Vec::new();

    if settings.loop_video {
        args.push("-stream_loop".to_string());
        args.push("-1".to_string());
    }

    // Read input at its native frame rate
    args.push("-re".to_string());
    args.push("-i".to_string());
    args.push(input.to_string_lossy().into_owned());

    if let Some(fps) = settings.fps.filter(|f| *f > 0.0) {
        args.push("-r".to_string());
        args.push(format_fps(fps));
    }

    if let Some(resolution) = settings.resolution.as_deref().filter(|r| !r.is_empty()) {
        args.push("-s".to_string());
        args.push(resolution.to_string());
    }

    if let Some(bitrate) = settings.bitrate.as_deref().filter(|b| !b.is_empty()) {
        args.push("-b:v".to_string());
        args.push(bitrate.to_string());
    }

    args.extend(TUNING.iter().map(|s| s.to_string()));
    args.push(destination.to_string());
    args
}

/// Largest whole number an f64 holds exactly
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Format a frame rate without a trailing ".0" for whole numbers
fn format_fps(fps: f64) -> String {
    if fps.fract() == 0.0 && fps.abs() < MAX_EXACT_INT {
        format!("{}", fps as u64)
    } else {
        fps.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEST: &str = "rtsp://localhost:8554/stream0";

    #[test]
    fn test_minimal_args() {
        let args = build_args(Path::new("videos/a.mp4"), &StreamSettings::default(), DEST);
        assert_eq!(
            args,
            vec![
                "-re",
                "-i",
                "videos/a.mp4",
                "-c:v",
                "libx264",
                "-preset",
                "veryfast",
                "-tune",
                "zerolatency",
                "-an",
                "-f",
                "rtsp",
                "-rtsp_transport",
                "tcp",
                DEST,
            ]
        );
    }

    #[test]
    fn test_full_args_order() {
        let settings = StreamSettings {
            fps: Some(30.0),
            resolution: Some("1280x720".to_string()),
            bitrate: Some("2M".to_string()),
            loop_video: true,
        };
        let args = build_args(Path::new("videos/a.mp4"), &settings, DEST);
        assert_eq!(
            &args[..11],
            &[
                "-stream_loop",
                "-1",
                "-re",
                "-i",
                "videos/a.mp4",
                "-r",
                "30",
                "-s",
                "1280x720",
                "-b:v",
                "2M",
            ]
        );
        assert_eq!(args.last().map(String::as_str), Some(DEST));
    }

    #[test]
    fn test_zero_fps_and_empty_strings_are_skipped() {
        let settings = StreamSettings {
            fps: Some(0.0),
            resolution: Some(String::new()),
            bitrate: Some(String::new()),
            loop_video: false,
        };
        let args = build_args(Path::new("v.mp4"), &settings, DEST);
        assert!(!args.iter().any(|a| a == "-r" || a == "-s" || a == "-b:v"));
    }

    #[test]
    fn test_fractional_fps() {
        assert_eq!(format_fps(29.97), "29.97");
        assert_eq!(format_fps(25.0), "25");
    }

    #[test]
    fn test_huge_fps_is_not_truncated() {
        assert_eq!(format_fps(1e20), "100000000000000000000");

        let settings = StreamSettings {
            fps: Some(1e20),
            ..Default::default()
        };
        let args = build_args(Path::new("videos/a.mp4"), &settings, DEST);
        let r = args.iter().position(|a| a == "-r").unwrap();
        assert_ne!(args[r + 1], u64::MAX.to_string());
    }
}
