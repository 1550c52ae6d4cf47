//! CLI Command Tests
//!
//! Argument parsing, validation, JSON output format and exit codes.

// =============================================================================
// CLI Argument Parsing Tests
// =============================================================================

mod cli_parsing {
    use clap::Parser;
    use rtsp_streamer::cli::{Cli, Command};

    #[test]
    fn test_list_command() {
        let cli = Cli::parse_from(["rtsp-streamer", "list"]);
        assert!(matches!(cli.command, Command::List(_)));

        let cli = Cli::parse_from(["rtsp-streamer", "ls"]);
        assert!(matches!(cli.command, Command::List(_)));
    }

    #[test]
    fn test_download_command() {
        let cli = Cli::parse_from([
            "rtsp-streamer",
            "download",
            "--url",
            "https://example.com/big_buck_bunny.mp4",
            "--name",
            "bunny",
        ]);
        match cli.command {
            Command::Download(cmd) => {
                assert_eq!(cmd.url, "https://example.com/big_buck_bunny.mp4");
                assert_eq!(cmd.name, "bunny");
            }
            _ => panic!("Expected Download command"),
        }
    }

    #[test]
    fn test_download_requires_url_and_name() {
        assert!(Cli::try_parse_from(["rtsp-streamer", "download", "--name", "x"]).is_err());
        assert!(Cli::try_parse_from(["rtsp-streamer", "download", "--url", "http://x"]).is_err());
    }

    #[test]
    fn test_stream_command_defaults() {
        let cli = Cli::parse_from(["rtsp-streamer", "stream", "--video", "bunny"]);
        match cli.command {
            Command::Stream(cmd) => {
                assert_eq!(cmd.video, "bunny");
                assert!(cmd.fps.is_none());
                assert!(cmd.resolution.is_none());
                assert!(cmd.bitrate.is_none());
                assert!(!cmd.loop_video);
            }
            _ => panic!("Expected Stream command"),
        }
    }

    #[test]
    fn test_stream_command_all_options() {
        let cli = Cli::parse_from([
            "rtsp-streamer",
            "stream",
            "--video",
            "bunny",
            "--fps",
            "29.97",
            "--resolution",
            "1920x1080",
            "--bitrate",
            "4M",
            "--loop",
        ]);
        match cli.command {
            Command::Stream(cmd) => {
                assert_eq!(cmd.fps, Some(29.97));
                assert_eq!(cmd.resolution.as_deref(), Some("1920x1080"));
                assert_eq!(cmd.bitrate.as_deref(), Some("4M"));
                assert!(cmd.loop_video);
                assert!(cmd.validate().is_ok());
            }
            _ => panic!("Expected Stream command"),
        }
    }

    #[test]
    fn test_stream_requires_video() {
        assert!(Cli::try_parse_from(["rtsp-streamer", "stream", "--fps", "30"]).is_err());
    }

    #[test]
    fn test_stream_invalid_options_fail_validation() {
        let cli = Cli::parse_from([
            "rtsp-streamer",
            "stream",
            "--video",
            "bunny",
            "--resolution",
            "hd",
        ]);
        match cli.command {
            Command::Stream(cmd) => assert!(cmd.validate().is_err()),
            _ => panic!("Expected Stream command"),
        }

        let cli = Cli::parse_from(["rtsp-streamer", "stream", "--video", "bunny", "--fps", "0"]);
        match cli.command {
            Command::Stream(cmd) => assert!(cmd.validate().is_err()),
            _ => panic!("Expected Stream command"),
        }
    }

    #[test]
    fn test_stop_status_doctor() {
        let cli = Cli::parse_from(["rtsp-streamer", "stop"]);
        assert!(matches!(cli.command, Command::Stop(_)));

        let cli = Cli::parse_from(["rtsp-streamer", "status"]);
        assert!(matches!(cli.command, Command::Status(_)));

        let cli = Cli::parse_from(["rtsp-streamer", "doctor"]);
        assert!(matches!(cli.command, Command::Doctor(_)));
    }

    #[test]
    fn test_init_force() {
        let cli = Cli::parse_from(["rtsp-streamer", "init", "--force"]);
        match cli.command {
            Command::Init(cmd) => assert!(cmd.force),
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["rtsp-streamer", "list", "-j", "-v", "-c", "alt.yaml"]);
        assert!(cli.json);
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("alt.yaml")));
    }
}

// =============================================================================
// JSON Output Tests
// =============================================================================

mod json_output {
    use rtsp_streamer::cli::{ExitCode, JsonOutput};
    use rtsp_streamer::models::StreamState;

    #[test]
    fn test_json_output_success() {
        let output = JsonOutput::success("test data");
        let json = serde_json::to_string(&output).unwrap();

        assert!(json.contains("\"data\":\"test data\""));
        assert!(!json.contains("error"));
        assert!(!json.contains("exit_code")); // Should be omitted when 0
    }

    #[test]
    fn test_json_output_error() {
        let output = JsonOutput::<()>::error_msg("No stream is running.", ExitCode::NotRunning);
        let json = serde_json::to_string(&output).unwrap();

        assert!(json.contains("\"error\":\"No stream is running.\""));
        assert!(json.contains("\"exit_code\":5"));
        assert!(!json.contains("\"data\""));
    }

    #[test]
    fn test_stream_state_wrapped() {
        let output = JsonOutput::success(StreamState::Stale(99));
        let json = serde_json::to_string(&output).unwrap();
        assert_eq!(json, r#"{"data":{"state":"stale","pid":99}}"#);
    }
}

// =============================================================================
// Output Helper Tests
// =============================================================================

mod output_helpers {
    use rtsp_streamer::cli::{ExitCode, Output};

    #[test]
    fn test_error_returns_code() {
        let output = Output {
            json: false,
            quiet: true,
        };
        assert_eq!(
            output.error("Video demo.mp4 does not exist.", ExitCode::NotFound),
            ExitCode::NotFound
        );
    }

    #[test]
    fn test_print_json_and_text() {
        let json = Output {
            json: true,
            quiet: false,
        };
        assert!(json.print(&vec![1, 2, 3], "ignored").is_ok());

        let text = Output {
            json: false,
            quiet: false,
        };
        assert!(text.print(&(), "Stream stopped.").is_ok());
    }
}
